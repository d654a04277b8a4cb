//! Navigation and addressing engine.
//!
//! Turns raw address-bar text into a navigation or a search
//! ([`AddressClassifier`]), builds the autocomplete list
//! ([`SuggestionList`]), and tracks back/forward history for a browsing
//! context ([`HistoryStack`]). Everything here is synchronous and owned by
//! the UI context.

pub mod address;
pub mod history;
pub mod search;
pub mod suggest;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use address::{AddressClassifier, Classification, ensure_scheme, is_local_or_private};
pub use history::{HistoryChangeKind, HistoryChanged, HistoryStack, MAX_HISTORY_SIZE};
pub use search::SearchEngine;
pub use suggest::{MAX_SUGGESTIONS, Suggestion, SuggestionKind, SuggestionList};
