//! The shell's top-level owner.
//!
//! [`ShellContext`] holds every piece of window state (settings, bookmarks,
//! history, tabs, suggestions) plus the engine and the store. All mutation
//! happens here, on one thread; the engine and the save workers only report
//! back through queues that [`ShellContext::pump`] drains.
//!
//! History is kept twice. Each tab has its own [`HistoryStack`] that drives
//! back/forward. The window keeps one more that records every navigation
//! from every tab; that one is persisted and feeds suggestions.

use std::collections::{HashMap, VecDeque};

use lumen_nav::{
    AddressClassifier, HistoryStack, SearchEngine, Suggestion, SuggestionList, ensure_scheme,
};
use lumen_store::{PersistenceStore, SaveHandle, StoreEvent};
use lumen_types::error::Result;
use lumen_types::models::{Bookmark, Settings};

use crate::engine::{EngineEvent, WebEngine};
use crate::tabs::{DEFAULT_TAB_TITLE, Tab, TabId, TabStrip};

/// Back/forward state of one tab.
#[derive(Debug, Default)]
struct TabSession {
    history: HistoryStack,
    /// URLs of back/forward loads not yet reported, oldest first. Their
    /// `UrlChanged` moves no history because the cursor already moved.
    traversals: VecDeque<String>,
}

impl TabSession {
    /// True when `url` is a pending traversal. Traversals queued before it
    /// were superseded and are dropped with it.
    fn settle_traversal(&mut self, url: &str) -> bool {
        match self.traversals.iter().position(|pending| pending == url) {
            Some(index) => {
                self.traversals.drain(..=index);
                true
            },
            None => {
                self.traversals.clear();
                false
            },
        }
    }
}

pub struct ShellContext<E: WebEngine> {
    settings: Settings,
    classifier: AddressClassifier,
    /// Every navigation in the window, newest last.
    history: HistoryStack,
    sessions: HashMap<TabId, TabSession>,
    bookmarks: Vec<Bookmark>,
    suggestions: SuggestionList,
    tabs: TabStrip,
    engine: E,
    store: PersistenceStore,
    /// Saves still running; dropped once they report.
    pending_saves: Vec<SaveHandle>,
    status: String,
}

impl<E: WebEngine> ShellContext<E> {
    /// Load persisted state from `store` and wire it to `engine`.
    pub fn new(store: PersistenceStore, engine: E) -> Self {
        let settings = store.load_settings();
        let bookmarks = store.load_bookmarks();
        let history = HistoryStack::from_entries(store.load_history());
        log::info!(
            "Loaded {} bookmarks, {} history entries",
            bookmarks.len(),
            history.len()
        );

        Self {
            classifier: AddressClassifier::new(SearchEngine::from_name(&settings.search_engine)),
            settings,
            history,
            sessions: HashMap::new(),
            bookmarks,
            suggestions: SuggestionList::new(),
            tabs: TabStrip::new(),
            engine,
            store,
            pending_saves: Vec::new(),
            status: String::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Window-wide record of visited pages.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Back/forward list of `tab`, once it has loaded a page.
    pub fn tab_history(&self, tab: TabId) -> Option<&HistoryStack> {
        self.sessions.get(&tab).map(|session| &session.history)
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    #[cfg(test)]
    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    /// Status-bar text.
    pub fn status(&self) -> &str {
        &self.status
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // -- Tabs ---------------------------------------------------------------

    /// Open a tab on `address` (classified like address-bar text), or on
    /// the home page when `None` or blank.
    pub fn open_tab(&mut self, address: Option<&str>) -> TabId {
        let url = address
            .and_then(|text| self.resolve(text))
            .unwrap_or_else(|| self.home_url());
        let tab = self.tabs.open(&url);
        log::info!("Opened tab {tab} on {url}");
        self.engine.navigate(tab, &url);
        tab
    }

    pub fn select_tab(&mut self, tab: TabId) -> bool {
        self.tabs.select(tab)
    }

    /// Close `tab` and save bookmarks and history in the background.
    pub fn close_tab(&mut self, tab: TabId) -> bool {
        let Some(closed) = self.tabs.close(tab) else {
            return false;
        };
        log::info!("Closed tab {tab}");
        self.discard_tabs(vec![closed]);
        true
    }

    /// Close every tab but `tab`. Returns how many were closed.
    pub fn close_other_tabs(&mut self, tab: TabId) -> usize {
        let closed = self.tabs.close_others(tab);
        self.discard_tabs(closed)
    }

    pub fn close_all_tabs(&mut self) -> usize {
        let closed = self.tabs.close_all();
        self.discard_tabs(closed)
    }

    /// Forget tabs already removed from the strip. Saves once if any were.
    fn discard_tabs(&mut self, closed: Vec<Tab>) -> usize {
        for tab in &closed {
            self.sessions.remove(&tab.id);
            self.engine.close(tab.id);
        }
        if !closed.is_empty() {
            self.save_browsing_data();
        }
        closed.len()
    }

    pub fn close_selected_tab(&mut self) -> bool {
        match self.tabs.selected_id() {
            Some(tab) => self.close_tab(tab),
            None => false,
        }
    }

    fn save_browsing_data(&mut self) {
        let bookmarks = self.store.save_bookmarks_async(self.bookmarks.clone());
        let history = self.store.save_history_async(self.history.entries().to_vec());
        self.pending_saves.extend([bookmarks, history]);
    }

    // -- Address bar --------------------------------------------------------

    fn resolve(&self, text: &str) -> Option<String> {
        self.classifier.classify(text).navigation_url()
    }

    fn home_url(&self) -> String {
        ensure_scheme(&self.settings.home_page)
    }

    /// Navigate the selected tab (opening one if needed) to whatever `text`
    /// resolves to. Blank text does nothing and returns `None`.
    pub fn submit_address(&mut self, text: &str) -> Option<String> {
        let url = self.resolve(text)?;
        self.suggestions.clear();
        self.navigate_selected(&url);
        Some(url)
    }

    /// Start a fresh navigation. Back/forward loads still in flight in the
    /// tab no longer count as traversals.
    fn navigate_selected(&mut self, url: &str) -> TabId {
        let tab = self.load_in_selected(url);
        if let Some(session) = self.sessions.get_mut(&tab) {
            session.traversals.clear();
        }
        tab
    }

    fn load_in_selected(&mut self, url: &str) -> TabId {
        let tab = match self.tabs.selected_id() {
            Some(tab) => tab,
            None => self.tabs.open(url),
        };
        log::info!("Navigating tab {tab} to {url}");
        self.engine.navigate(tab, url);
        tab
    }

    /// Recompute the suggestion rows for partially typed `text`.
    pub fn update_suggestions(&mut self, text: &str) -> &SuggestionList {
        self.suggestions
            .update(text, &self.classifier, Some(&self.history));
        &self.suggestions
    }

    pub fn select_next_suggestion(&mut self) -> Option<&Suggestion> {
        self.suggestions.select_next()
    }

    pub fn select_previous_suggestion(&mut self) -> Option<&Suggestion> {
        self.suggestions.select_previous()
    }

    /// Navigate to the highlighted suggestion.
    pub fn accept_suggestion(&mut self) -> Option<String> {
        let url = self.suggestions.selected()?.url.clone();
        self.suggestions.clear();
        self.navigate_selected(&url);
        Some(url)
    }

    // -- Navigation ---------------------------------------------------------

    /// Step the selected tab back in its own history.
    pub fn go_back(&mut self) -> Option<String> {
        let tab = self.tabs.selected_id()?;
        let entry = self.sessions.get_mut(&tab)?.history.go_back()?;
        Some(self.traverse_to(tab, entry.url))
    }

    pub fn go_forward(&mut self) -> Option<String> {
        let tab = self.tabs.selected_id()?;
        let entry = self.sessions.get_mut(&tab)?.history.go_forward()?;
        Some(self.traverse_to(tab, entry.url))
    }

    fn traverse_to(&mut self, tab: TabId, url: String) -> String {
        log::info!("Traversing tab {tab} to {url}");
        self.engine.navigate(tab, &url);
        if let Some(session) = self.sessions.get_mut(&tab) {
            session.traversals.push_back(url.clone());
        }
        url
    }

    pub fn go_home(&mut self) -> String {
        let url = self.home_url();
        self.navigate_selected(&url);
        url
    }

    pub fn reload(&mut self) -> bool {
        match self.tabs.selected_id() {
            Some(tab) => {
                self.engine.reload(tab);
                true
            },
            None => false,
        }
    }

    // -- Bookmarks ----------------------------------------------------------

    /// Bookmark the selected tab's page. `None` when there is no page or
    /// its URL is already bookmarked.
    pub fn bookmark_current(&mut self) -> Option<&Bookmark> {
        let tab = self.tabs.selected()?;
        if tab.url.is_empty() || self.bookmarks.iter().any(|b| b.url == tab.url) {
            return None;
        }
        let bookmark = Bookmark::new(&tab.title, &tab.url, None);
        log::info!("Bookmarked {}", bookmark.url);
        self.bookmarks.push(bookmark);
        self.bookmarks.last()
    }

    pub fn remove_bookmark(&mut self, id: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != id);
        self.bookmarks.len() != before
    }

    // -- History ------------------------------------------------------------

    /// Clear the window record and every tab's back/forward list.
    pub fn clear_history(&mut self) {
        self.history.clear();
        for session in self.sessions.values_mut() {
            session.history.clear();
            session.traversals.clear();
        }
        self.pending_saves
            .push(self.store.save_history_async(Vec::new()));
    }

    // -- Event pump ---------------------------------------------------------

    /// Apply everything the engine, the history stack and the save workers
    /// reported since the last call.
    pub fn pump(&mut self) {
        for (tab, event) in self.engine.poll_events() {
            self.handle_engine_event(tab, event);
        }
        for change in self.history.drain_events() {
            log::debug!(
                "History {:?}: {}",
                change.kind,
                change.entry.map(|e| e.url).unwrap_or_default()
            );
        }
        for (tab, session) in &mut self.sessions {
            for change in session.history.drain_events() {
                log::trace!("Tab {tab} history {:?}", change.kind);
            }
        }
        self.pump_store_events();
    }

    pub fn handle_engine_event(&mut self, tab_id: TabId, event: EngineEvent) {
        let selected = self.tabs.selected_id() == Some(tab_id);
        let Some(tab) = self.tabs.get_mut(tab_id) else {
            log::debug!("Dropping {event:?} for closed tab {tab_id}");
            return;
        };

        match event {
            EngineEvent::LoadStarted => {
                tab.loading = true;
                tab.progress = 0;
                if selected {
                    self.status = "Loading...".to_string();
                }
            },
            EngineEvent::LoadProgress(percent) => {
                tab.progress = percent.min(100);
                if selected {
                    self.status = format!("Loading... {}%", tab.progress);
                }
            },
            EngineEvent::LoadFinished(ok) => {
                tab.loading = false;
                tab.progress = 100;
                if !ok {
                    log::warn!("Load failed in tab {tab_id}: {}", tab.url);
                }
                if selected {
                    self.status = if ok { "Done" } else { "Load failed" }.to_string();
                }
            },
            EngineEvent::TitleChanged(title) => tab.title = title,
            EngineEvent::UrlChanged(url) => {
                tab.url = url.clone();
                let title = if tab.title == DEFAULT_TAB_TITLE {
                    String::new()
                } else {
                    tab.title.clone()
                };
                let session = self.sessions.entry(tab_id).or_default();
                if !session.settle_traversal(&url) {
                    session.history.add(&url, &title);
                    self.history.add(&url, &title);
                }
            },
        }
    }

    fn pump_store_events(&mut self) {
        for event in self.store.drain_events() {
            match event {
                StoreEvent::Saved(kind) => {
                    log::debug!("Saved {kind}");
                    self.status.clear();
                },
                StoreEvent::SaveFailed { kind, message } => {
                    log::warn!("Saving {kind} failed: {message}");
                },
            }
        }
        self.pending_saves
            .retain(|handle| handle.try_outcome().is_none());
    }

    // -- Shutdown -----------------------------------------------------------

    /// Save all three collections and wait for every outstanding save.
    /// Returns the first failure among the final saves.
    pub fn shutdown(mut self) -> Result<()> {
        log::info!("Saving settings, bookmarks and history");
        for handle in self.pending_saves.drain(..) {
            if let Err(e) = handle.wait() {
                log::warn!("{e}");
            }
        }

        let handles = [
            self.store.save_settings_async(self.settings.clone()),
            self.store.save_bookmarks_async(self.bookmarks.clone()),
            self.store.save_history_async(self.history.entries().to_vec()),
        ];
        let mut first_err = None;
        for handle in handles {
            if let Err(e) = handle.wait() {
                log::warn!("{e}");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
