//! The persistence store: one JSON document per collection.

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender};
use lumen_types::error::Result;
use lumen_types::models::{Bookmark, CollectionKind, HistoryEntry, Settings, default_bookmarks};
use serde::Serialize;

use crate::document::{read_array, read_object, write_atomic};
use crate::worker::{SaveHandle, SaveWorkers, StoreEvent};

/// Reads and writes `settings.json`, `bookmarks.json` and `history.json`
/// under a data directory.
///
/// Loads never fail: a missing, unreadable or malformed document yields the
/// collection's default. Saves are atomic, either inline (`save_*`) or on the
/// worker pool (`save_*_async`).
pub struct PersistenceStore {
    // Dropped first: joining the workers flushes pending saves while the
    // event queue is still alive.
    workers: SaveWorkers,
    data_dir: PathBuf,
    events_tx: Sender<StoreEvent>,
    events_rx: Receiver<StoreEvent>,
}

impl PersistenceStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed,
    /// with `workers` background save threads.
    pub fn open(data_dir: impl Into<PathBuf>, workers: usize) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        log::info!("Persistence store at {}", data_dir.display());
        Ok(Self {
            workers: SaveWorkers::spawn(workers)?,
            data_dir,
            events_tx,
            events_rx,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Absolute path of the document backing `kind`.
    pub fn path_for(&self, kind: CollectionKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    // -- Loads --------------------------------------------------------------

    pub fn load_settings(&self) -> Settings {
        read_object(&self.path_for(CollectionKind::Settings)).unwrap_or_else(|| {
            log::debug!("Using default settings");
            Settings::default()
        })
    }

    /// Stored bookmarks, or the seed set when there is no usable document.
    /// An existing empty array loads as no bookmarks.
    pub fn load_bookmarks(&self) -> Vec<Bookmark> {
        read_array(&self.path_for(CollectionKind::Bookmarks)).unwrap_or_else(|| {
            log::debug!("Using default bookmarks");
            default_bookmarks()
        })
    }

    pub fn load_history(&self) -> Vec<HistoryEntry> {
        read_array(&self.path_for(CollectionKind::History)).unwrap_or_default()
    }

    // -- Synchronous saves --------------------------------------------------

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.save_now(CollectionKind::Settings, settings)
    }

    pub fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<()> {
        self.save_now(CollectionKind::Bookmarks, bookmarks)
    }

    pub fn save_history(&self, history: &[HistoryEntry]) -> Result<()> {
        self.save_now(CollectionKind::History, history)
    }

    fn save_now<T: Serialize + ?Sized>(&self, kind: CollectionKind, value: &T) -> Result<()> {
        let result = write_atomic(&self.path_for(kind), value, kind);
        match &result {
            Ok(()) => log::debug!("Saved {kind}"),
            Err(e) => log::warn!("{e}"),
        }
        result
    }

    // -- Asynchronous saves -------------------------------------------------

    /// Save a settings snapshot in the background.
    pub fn save_settings_async(&self, settings: Settings) -> SaveHandle {
        self.dispatch(CollectionKind::Settings, settings)
    }

    /// Save a bookmarks snapshot in the background.
    pub fn save_bookmarks_async(&self, bookmarks: Vec<Bookmark>) -> SaveHandle {
        self.dispatch(CollectionKind::Bookmarks, bookmarks)
    }

    /// Save a history snapshot in the background.
    pub fn save_history_async(&self, history: Vec<HistoryEntry>) -> SaveHandle {
        self.dispatch(CollectionKind::History, history)
    }

    fn dispatch<T>(&self, kind: CollectionKind, snapshot: T) -> SaveHandle
    where
        T: Serialize + Send + 'static,
    {
        let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(1);
        let path = self.path_for(kind);
        let events = self.events_tx.clone();

        let job = Box::new(move || {
            let outcome = write_atomic(&path, &snapshot, kind);
            let event = match &outcome {
                Ok(()) => {
                    log::debug!("Saved {kind} in background");
                    StoreEvent::Saved(kind)
                },
                Err(e) => {
                    log::warn!("{e}");
                    StoreEvent::SaveFailed {
                        kind,
                        message: e.to_string(),
                    }
                },
            };
            let _ = events.send(event);
            let _ = outcome_tx.send(outcome);
        });

        if !self.workers.submit(job) {
            log::error!("Save workers are gone; {kind} was not saved");
        }
        SaveHandle::new(kind, outcome_rx)
    }

    // -- Events -------------------------------------------------------------

    /// Take every completion notice that has arrived so far.
    pub fn drain_events(&self) -> Vec<StoreEvent> {
        self.events_rx.try_iter().collect()
    }

    /// The completion queue, for owners that want to `select!` on it.
    pub fn events(&self) -> &Receiver<StoreEvent> {
        &self.events_rx
    }
}
