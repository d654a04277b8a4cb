//! Shared test utilities for the shell.
//!
//! Provides a [`RecordingEngine`] that records every request the shell makes
//! and only reports the events a test scripts for it.

use crate::engine::{EngineEvent, WebEngine};
use crate::tabs::TabId;

/// A recorded engine request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Navigate { tab: TabId, url: String },
    Reload { tab: TabId },
    Close { tab: TabId },
}

/// An engine that records calls for test assertions.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<EngineCall>,
    scripted: Vec<(TabId, EngineEvent)>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` for the next poll.
    pub fn emit(&mut self, tab: TabId, event: EngineEvent) {
        self.scripted.push((tab, event));
    }

    /// Queue the events of a successful load of `url` titled `title`.
    pub fn complete_load(&mut self, tab: TabId, url: &str, title: &str) {
        self.emit(tab, EngineEvent::LoadStarted);
        self.emit(tab, EngineEvent::TitleChanged(title.to_string()));
        self.emit(tab, EngineEvent::UrlChanged(url.to_string()));
        self.emit(tab, EngineEvent::LoadFinished(true));
    }

    /// URLs passed to `navigate`, in order.
    pub fn navigated_urls(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::Navigate { url, .. } => Some(url.as_str()),
                EngineCall::Reload { .. } | EngineCall::Close { .. } => None,
            })
            .collect()
    }

    /// Most recent `navigate` target.
    pub fn last_url(&self) -> Option<&str> {
        self.navigated_urls().last().copied()
    }

    pub fn reload_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Reload { .. }))
            .count()
    }

    /// Tabs the shell told the engine to discard, in order.
    pub fn closed_tabs(&self) -> Vec<TabId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::Close { tab } => Some(*tab),
                _ => None,
            })
            .collect()
    }
}

impl WebEngine for RecordingEngine {
    fn navigate(&mut self, tab: TabId, url: &str) {
        self.calls.push(EngineCall::Navigate {
            tab,
            url: url.to_string(),
        });
    }

    fn reload(&mut self, tab: TabId) {
        self.calls.push(EngineCall::Reload { tab });
    }

    fn close(&mut self, tab: TabId) {
        self.calls.push(EngineCall::Close { tab });
        self.scripted.retain(|(id, _)| *id != tab);
    }

    fn poll_events(&mut self) -> Vec<(TabId, EngineEvent)> {
        std::mem::take(&mut self.scripted)
    }
}
