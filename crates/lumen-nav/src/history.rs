//! Back/forward history for one browsing context.
//!
//! A single ordered list with a cursor, rather than separate back and
//! forward stacks, so the whole list can be persisted and searched.

use lumen_types::models::HistoryEntry;

/// Upper bound on entries kept by [`HistoryStack::add`].
pub const MAX_HISTORY_SIZE: usize = 100;

/// What happened to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryChangeKind {
    Added,
    Removed,
    Cleared,
}

/// Change notification queued by every mutation. The owner drains these
/// with [`HistoryStack::drain_events`] on its own turn.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryChanged {
    /// The affected entry; `None` for [`HistoryChangeKind::Cleared`].
    pub entry: Option<HistoryEntry>,
    pub kind: HistoryChangeKind,
}

/// Ordered, size-bounded navigation history with a current-position cursor.
///
/// `cursor` is `None` exactly when `entries` is empty, and otherwise
/// indexes a valid entry.
#[derive(Debug, Default)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    events: Vec<HistoryChanged>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a stack from persisted entries, cursor on the last one.
    ///
    /// Entries are taken as-is: a document longer than
    /// [`MAX_HISTORY_SIZE`] is not trimmed here.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let cursor = entries.len().checked_sub(1);
        Self {
            entries,
            cursor,
            events: Vec::new(),
        }
    }

    /// Record a completed navigation.
    ///
    /// Entries after the cursor are discarded first, so navigating from the
    /// middle of the history drops the forward branch. When the append
    /// overflows [`MAX_HISTORY_SIZE`] the oldest entry is evicted and the
    /// cursor index is left where it was; otherwise it moves to the new
    /// entry.
    pub fn add(&mut self, url: &str, title: &str) -> HistoryEntry {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }

        let entry = HistoryEntry::new(url, title);
        self.entries.push(entry.clone());

        if self.entries.len() > MAX_HISTORY_SIZE {
            self.entries.remove(0);
        } else {
            self.cursor = Some(self.cursor.map_or(0, |c| c + 1));
        }

        self.events.push(HistoryChanged {
            entry: Some(entry.clone()),
            kind: HistoryChangeKind::Added,
        });
        entry
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Step back one entry. Returns `None`, leaving the cursor alone, when
    /// already at the oldest entry.
    pub fn go_back(&mut self) -> Option<HistoryEntry> {
        if !self.can_go_back() {
            return None;
        }
        let cursor = self.cursor? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor).cloned()
    }

    /// Step forward one entry. Returns `None`, leaving the cursor alone,
    /// when already at the newest entry.
    pub fn go_forward(&mut self) -> Option<HistoryEntry> {
        if !self.can_go_forward() {
            return None;
        }
        let cursor = self.cursor? + 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor).cloned()
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove the entry with `id`. A cursor at or after the removed index
    /// moves back by one (staying on the first entry while any remain).
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let removed = self.entries.remove(index);

        self.cursor = match self.cursor {
            _ if self.entries.is_empty() => None,
            Some(c) if c >= index => Some(c.saturating_sub(1)),
            other => other,
        };

        self.events.push(HistoryChanged {
            entry: Some(removed),
            kind: HistoryChangeKind::Removed,
        });
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.events.push(HistoryChanged {
            entry: None,
            kind: HistoryChangeKind::Cleared,
        });
    }

    /// Case-insensitive substring match over url and title, oldest first.
    pub fn search(&self, query: &str) -> Vec<HistoryEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.url.to_lowercase().contains(&query) || e.title.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    /// Take the change notifications queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<HistoryChanged> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(stack: &HistoryStack) -> Vec<&str> {
        stack.entries().iter().map(|e| e.url.as_str()).collect()
    }

    #[test]
    fn empty_stack_has_no_cursor() {
        let mut stack = HistoryStack::new();
        assert_eq!(stack.cursor(), None);
        assert!(stack.current().is_none());
        assert!(!stack.can_go_back());
        assert!(!stack.can_go_forward());
        assert!(stack.go_back().is_none());
        assert!(stack.go_forward().is_none());
    }

    #[test]
    fn add_moves_cursor_to_new_entry() {
        let mut stack = HistoryStack::new();
        stack.add("https://a.com", "A");
        stack.add("https://b.com", "B");

        assert_eq!(stack.cursor(), Some(1));
        assert_eq!(stack.current().unwrap().url, "https://b.com");
        assert!(stack.can_go_back());
        assert!(!stack.can_go_forward());
    }

    #[test]
    fn add_uses_url_when_title_empty() {
        let mut stack = HistoryStack::new();
        let entry = stack.add("https://a.com", "");
        assert_eq!(entry.title, "https://a.com");
    }

    #[test]
    fn go_back_restores_previous_entry() {
        let mut stack = HistoryStack::new();
        stack.add("https://a.com", "A");
        stack.add("https://b.com", "B");

        let entry = stack.go_back().unwrap();
        assert_eq!(entry.url, "https://a.com");
        assert_eq!(entry.title, "A");
        assert_eq!(stack.cursor(), Some(0));
        assert!(stack.go_back().is_none());
        assert_eq!(stack.cursor(), Some(0));
    }

    #[test]
    fn go_forward_after_go_back() {
        let mut stack = HistoryStack::new();
        stack.add("https://a.com", "A");
        stack.add("https://b.com", "B");
        stack.go_back();

        assert!(stack.can_go_forward());
        let entry = stack.go_forward().unwrap();
        assert_eq!(entry.url, "https://b.com");
        assert!(stack.go_forward().is_none());
    }

    #[test]
    fn add_after_back_discards_forward_branch() {
        let mut stack = HistoryStack::new();
        stack.add("A", "");
        stack.add("B", "");
        stack.go_back();
        stack.add("C", "");

        assert_eq!(urls(&stack), ["A", "C"]);
        assert_eq!(stack.current().unwrap().url, "C");
        assert!(!stack.can_go_forward());
    }

    #[test]
    fn overflow_evicts_oldest_and_keeps_cursor_index() {
        let mut stack = HistoryStack::new();
        for i in 0..MAX_HISTORY_SIZE {
            stack.add(&format!("https://site{i}.com"), "");
        }
        assert_eq!(stack.cursor(), Some(MAX_HISTORY_SIZE - 1));

        stack.add("https://overflow.com", "");
        assert_eq!(stack.len(), MAX_HISTORY_SIZE);
        assert_eq!(stack.entries()[0].url, "https://site1.com");
        assert_eq!(stack.cursor(), Some(MAX_HISTORY_SIZE - 1));
        assert_eq!(stack.current().unwrap().url, "https://overflow.com");
    }

    #[test]
    fn revisit_appends_instead_of_counting() {
        // visit_count is never incremented; a revisit is a new entry.
        let mut stack = HistoryStack::new();
        let first = stack.add("https://a.com", "A");
        let second = stack.add("https://a.com", "A");

        assert_eq!(stack.len(), 2);
        assert_ne!(first.id, second.id);
        assert!(stack.entries().iter().all(|e| e.visit_count == 1));
    }

    #[test]
    fn remove_before_cursor_shifts_cursor_back() {
        let mut stack = HistoryStack::new();
        let a = stack.add("A", "");
        stack.add("B", "");
        stack.add("C", "");

        assert!(stack.remove(&a.id));
        assert_eq!(urls(&stack), ["B", "C"]);
        assert_eq!(stack.cursor(), Some(1));
        assert_eq!(stack.current().unwrap().url, "C");
    }

    #[test]
    fn remove_after_cursor_keeps_cursor() {
        let mut stack = HistoryStack::new();
        stack.add("A", "");
        let b = stack.add("B", "");
        stack.go_back();

        assert!(stack.remove(&b.id));
        assert_eq!(stack.cursor(), Some(0));
        assert_eq!(stack.current().unwrap().url, "A");
    }

    #[test]
    fn remove_first_entry_under_cursor_stays_valid() {
        let mut stack = HistoryStack::new();
        let a = stack.add("A", "");
        stack.add("B", "");
        stack.go_back();

        assert!(stack.remove(&a.id));
        assert_eq!(stack.cursor(), Some(0));
        assert_eq!(stack.current().unwrap().url, "B");
    }

    #[test]
    fn remove_last_entry_empties_cursor() {
        let mut stack = HistoryStack::new();
        let a = stack.add("A", "");
        assert!(stack.remove(&a.id));
        assert!(stack.is_empty());
        assert_eq!(stack.cursor(), None);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut stack = HistoryStack::new();
        stack.add("A", "");
        stack.drain_events();
        assert!(!stack.remove("missing"));
        assert_eq!(stack.len(), 1);
        assert!(stack.drain_events().is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let mut stack = HistoryStack::new();
        stack.add("A", "");
        stack.add("B", "");
        stack.clear();

        assert!(stack.is_empty());
        assert_eq!(stack.cursor(), None);
        assert!(!stack.can_go_back());
    }

    #[test]
    fn search_matches_url_and_title_case_insensitively() {
        let mut stack = HistoryStack::new();
        stack.add("https://docs.rs/serde", "Serde Docs");
        stack.add("https://example.com", "Example Domain");
        stack.add("https://crates.io", "Rust Package Registry");

        let hits: Vec<_> = stack.search("RUST").into_iter().map(|e| e.url).collect();
        assert_eq!(hits, ["https://crates.io"]);

        let hits: Vec<_> = stack.search("s").into_iter().map(|e| e.url).collect();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0], "https://docs.rs/serde");
    }

    #[test]
    fn events_record_each_mutation() {
        let mut stack = HistoryStack::new();
        let a = stack.add("A", "");
        stack.remove(&a.id);
        stack.clear();

        let kinds: Vec<_> = stack.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                HistoryChangeKind::Added,
                HistoryChangeKind::Removed,
                HistoryChangeKind::Cleared
            ]
        );
        assert!(stack.drain_events().is_empty());
    }

    #[test]
    fn from_entries_keeps_oversized_documents() {
        let entries: Vec<_> = (0..MAX_HISTORY_SIZE + 20)
            .map(|i| HistoryEntry::new(&format!("https://site{i}.com"), ""))
            .collect();
        let mut stack = HistoryStack::from_entries(entries);
        assert_eq!(stack.len(), MAX_HISTORY_SIZE + 20);
        assert_eq!(stack.cursor(), Some(MAX_HISTORY_SIZE + 19));

        // The next add evicts one and leaves the cursor on the new entry.
        stack.add("https://next.com", "");
        assert_eq!(stack.len(), MAX_HISTORY_SIZE + 20);
        assert_eq!(stack.current().unwrap().url, "https://next.com");
    }

    #[test]
    fn from_empty_entries_has_no_cursor() {
        let stack = HistoryStack::from_entries(Vec::new());
        assert_eq!(stack.cursor(), None);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_url() -> impl Strategy<Value = String> {
            "[a-z]{3,10}".prop_map(|s| format!("https://{s}.com"))
        }

        fn arb_urls(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
            proptest::collection::vec(arb_url(), min..max)
        }

        proptest! {
            #[test]
            fn back_available_iff_more_than_one(urls in arb_urls(0, MAX_HISTORY_SIZE + 1)) {
                let mut stack = HistoryStack::new();
                for url in &urls {
                    stack.add(url, "");
                }
                prop_assert_eq!(stack.can_go_back(), urls.len() > 1);
            }

            #[test]
            fn length_is_bounded(extra in 1usize..50) {
                let mut stack = HistoryStack::new();
                for i in 0..MAX_HISTORY_SIZE + extra {
                    stack.add(&format!("https://site{i}.com"), "");
                    prop_assert!(stack.len() <= MAX_HISTORY_SIZE);
                }
                prop_assert_eq!(stack.len(), MAX_HISTORY_SIZE);
            }

            #[test]
            fn back_then_forward_returns_to_same(urls in arb_urls(2, 20)) {
                let mut stack = HistoryStack::new();
                for url in &urls {
                    stack.add(url, "");
                }
                let before_cursor = stack.cursor();
                let before = stack.current().cloned();
                stack.go_back().unwrap();
                let after = stack.go_forward();
                prop_assert_eq!(stack.cursor(), before_cursor);
                prop_assert_eq!(after, before);
            }

            #[test]
            fn cursor_always_valid(ops in proptest::collection::vec(0u8..4, 1..60)) {
                let mut stack = HistoryStack::new();
                for (i, op) in ops.iter().enumerate() {
                    match op {
                        0 => { stack.add(&format!("https://p{i}.com"), ""); },
                        1 => { stack.go_back(); },
                        2 => { stack.go_forward(); },
                        _ => {
                            if let Some(id) = stack.entries().first().map(|e| e.id.clone()) {
                                stack.remove(&id);
                            }
                        },
                    }
                    match stack.cursor() {
                        None => prop_assert!(stack.is_empty()),
                        Some(c) => prop_assert!(c < stack.len()),
                    }
                }
            }

            #[test]
            fn can_go_back_all_the_way(urls in arb_urls(1, 20)) {
                let mut stack = HistoryStack::new();
                for url in &urls {
                    stack.add(url, "");
                }
                let mut back_count = 0;
                while stack.go_back().is_some() {
                    back_count += 1;
                }
                prop_assert_eq!(back_count, urls.len() - 1);
                prop_assert_eq!(stack.current().unwrap().url.as_str(), urls[0].as_str());
            }
        }
    }
}
