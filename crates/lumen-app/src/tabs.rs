//! Tab bookkeeping.
//!
//! Tabs only track what the chrome displays: URL, title and load state.
//! Each tab's back/forward list is kept by the shell, keyed by [`TabId`].

use std::fmt;

/// Title shown until the engine reports one.
pub const DEFAULT_TAB_TITLE: &str = "New Tab";

/// Stable tab identifier, never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub loading: bool,
    /// Load progress, 0-100.
    pub progress: u8,
}

/// Ordered tabs plus the selected one.
///
/// `selected` is `None` exactly when there are no tabs.
#[derive(Debug, Default)]
pub struct TabStrip {
    tabs: Vec<Tab>,
    selected: Option<usize>,
    next_id: u64,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tab for `url` and select it.
    pub fn open(&mut self, url: &str) -> TabId {
        self.next_id += 1;
        let id = TabId(self.next_id);
        self.tabs.push(Tab {
            id,
            url: url.to_string(),
            title: DEFAULT_TAB_TITLE.to_string(),
            loading: false,
            progress: 0,
        });
        self.selected = Some(self.tabs.len() - 1);
        id
    }

    /// Close `id`. If it was selected, the tab to its right takes over,
    /// or the one to its left when it was last.
    pub fn close(&mut self, id: TabId) -> Option<Tab> {
        let index = self.index_of(id)?;
        let tab = self.tabs.remove(index);
        self.selected = match self.selected {
            _ if self.tabs.is_empty() => None,
            Some(sel) if sel > index => Some(sel - 1),
            Some(sel) if sel == index => Some(index.min(self.tabs.len() - 1)),
            other => other,
        };
        Some(tab)
    }

    /// Close every tab except `id`, which becomes selected. Unknown ids
    /// close nothing.
    pub fn close_others(&mut self, id: TabId) -> Vec<Tab> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        let keep = self.tabs.remove(index);
        let closed = std::mem::replace(&mut self.tabs, vec![keep]);
        self.selected = Some(0);
        closed
    }

    pub fn close_all(&mut self) -> Vec<Tab> {
        self.selected = None;
        std::mem::take(&mut self.tabs)
    }

    pub fn select(&mut self, id: TabId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.selected = Some(index);
                true
            },
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&Tab> {
        self.selected.and_then(|i| self.tabs.get(i))
    }

    pub fn selected_id(&self) -> Option<TabId> {
        self.selected().map(|tab| tab.id)
    }

    #[cfg(test)]
    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }
}
