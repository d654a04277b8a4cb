//! Address-bar autocomplete.

use crate::address::{AddressClassifier, is_direct_url, is_likely_domain, prefix_https};
use crate::history::HistoryStack;

/// Most suggestions shown at once.
pub const MAX_SUGGESTIONS: usize = 8;

/// Minimum input length (in characters, exclusive) before a search
/// suggestion is offered.
const SEARCH_MIN_CHARS: usize = 2;

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Search,
    Url,
    History,
}

impl SuggestionKind {
    /// Glyph shown before the suggestion title.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Search => "🔍",
            Self::Url => "🌐",
            Self::History => "🕐",
        }
    }

    /// Accent color for the glyph, as `#rrggbb`.
    pub fn accent(self) -> &'static str {
        match self {
            Self::Search => "#4285f4",
            Self::Url => "#34a853",
            Self::History => "#fbbc05",
        }
    }
}

/// One autocomplete row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub url: String,
}

impl Suggestion {
    /// Two-line row text: glyph and title, then the target URL.
    pub fn display_text(&self) -> String {
        format!("{} {}\n{}", self.kind.glyph(), self.title, self.url)
    }
}

/// Build suggestions for `input`: a search row once the input is longer
/// than two characters, a URL row (`https://` added unless the input starts
/// with `http`) when the input is an absolute URL or looks like a domain,
/// then matching history (newest first, one row per
/// URL). At most [`MAX_SUGGESTIONS`] rows.
pub fn suggest(
    input: &str,
    classifier: &AddressClassifier,
    history: Option<&HistoryStack>,
) -> Vec<Suggestion> {
    let input = input.trim();
    if input.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    if input.chars().count() > SEARCH_MIN_CHARS {
        rows.push(Suggestion {
            kind: SuggestionKind::Search,
            title: format!("Search \"{input}\""),
            url: classifier.engine().search_url(input),
        });
    }

    if is_direct_url(input) || is_likely_domain(input) {
        rows.push(Suggestion {
            kind: SuggestionKind::Url,
            title: input.to_string(),
            url: prefix_https(input),
        });
    }

    if let Some(history) = history {
        for entry in history.search(input).into_iter().rev() {
            if rows.len() >= MAX_SUGGESTIONS {
                break;
            }
            if rows.iter().any(|row| row.url == entry.url) {
                continue;
            }
            rows.push(Suggestion {
                kind: SuggestionKind::History,
                title: entry.title,
                url: entry.url,
            });
        }
    }

    rows.truncate(MAX_SUGGESTIONS);
    rows
}

/// The visible suggestion rows plus keyboard selection.
///
/// Selection wraps: moving down past the last row lands on the first, and
/// moving up from the first (or from no selection) lands on the last.
#[derive(Debug, Default)]
pub struct SuggestionList {
    items: Vec<Suggestion>,
    selected: Option<usize>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerate rows for new input. Selection is reset.
    pub fn update(
        &mut self,
        input: &str,
        classifier: &AddressClassifier,
        history: Option<&HistoryStack>,
    ) {
        self.items = suggest(input, classifier, history);
        self.selected = None;
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Suggestion> {
        self.selected.and_then(|i| self.items.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn select_next(&mut self) -> Option<&Suggestion> {
        if self.items.is_empty() {
            return None;
        }
        let next = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(next);
        self.items.get(next)
    }

    pub fn select_previous(&mut self) -> Option<&Suggestion> {
        let last = self.items.len().checked_sub(1)?;
        let prev = match self.selected {
            Some(i) if i > 0 => i - 1,
            _ => last,
        };
        self.selected = Some(prev);
        self.items.get(prev)
    }
}
