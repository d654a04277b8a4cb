//! The seam to the rendering engine.
//!
//! The shell never renders pages itself. It asks a [`WebEngine`] to load a
//! URL in a tab and later polls what happened, so engine callbacks never
//! re-enter shell state.

use std::collections::{HashMap, VecDeque};

use crate::tabs::TabId;

/// Something the engine reports about a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    LoadStarted,
    /// Percent complete, 0-100.
    LoadProgress(u8),
    /// `true` when the page loaded.
    LoadFinished(bool),
    TitleChanged(String),
    UrlChanged(String),
}

/// A page-rendering engine driven by the shell.
pub trait WebEngine {
    fn navigate(&mut self, tab: TabId, url: &str);
    fn reload(&mut self, tab: TabId);
    /// The tab is gone: drop its page and any events not yet polled.
    fn close(&mut self, tab: TabId);
    /// Events since the last poll, oldest first.
    fn poll_events(&mut self) -> Vec<(TabId, EngineEvent)>;
}

/// Engine without a renderer. Every navigation succeeds immediately and
/// produces the event sequence of a real load; page titles are the URL's
/// host.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    pending: VecDeque<(TabId, EngineEvent)>,
    loaded: HashMap<TabId, String>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL most recently loaded into `tab`.
    pub fn loaded_url(&self, tab: TabId) -> Option<&str> {
        self.loaded.get(&tab).map(String::as_str)
    }

    fn push(&mut self, tab: TabId, event: EngineEvent) {
        self.pending.push_back((tab, event));
    }
}

impl WebEngine for HeadlessEngine {
    fn navigate(&mut self, tab: TabId, url: &str) {
        log::debug!("headless: load {url} in tab {tab}");
        self.push(tab, EngineEvent::LoadStarted);
        self.push(tab, EngineEvent::LoadProgress(50));
        self.push(tab, EngineEvent::TitleChanged(page_title(url)));
        self.push(tab, EngineEvent::UrlChanged(url.to_string()));
        self.push(tab, EngineEvent::LoadProgress(100));
        self.push(tab, EngineEvent::LoadFinished(true));
        self.loaded.insert(tab, url.to_string());
    }

    fn reload(&mut self, tab: TabId) {
        if self.loaded_url(tab).is_none() {
            return;
        }
        self.push(tab, EngineEvent::LoadStarted);
        self.push(tab, EngineEvent::LoadProgress(100));
        self.push(tab, EngineEvent::LoadFinished(true));
    }

    fn close(&mut self, tab: TabId) {
        self.loaded.remove(&tab);
        self.pending.retain(|(id, _)| *id != tab);
    }

    fn poll_events(&mut self) -> Vec<(TabId, EngineEvent)> {
        self.pending.drain(..).collect()
    }
}

/// Host of `url`, or the URL itself when it has none (`about:blank`).
fn page_title(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
