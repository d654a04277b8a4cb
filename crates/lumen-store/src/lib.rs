//! Persistence for settings, bookmarks and history.
//!
//! Each collection is one JSON document in the data directory. Loads are
//! synchronous and never fail (bad documents fall back to defaults). Saves
//! replace the document atomically and can run on background workers, with
//! completion reported through a [`SaveHandle`] and a [`StoreEvent`] queue
//! that the owning context drains on its own turn.

mod document;
pub mod store;
pub mod worker;

pub use store::PersistenceStore;
pub use worker::{SaveHandle, StoreEvent};
