//! Background save workers.
//!
//! A fixed set of named threads pulls jobs from a shared queue. Each job
//! writes one snapshot and reports back twice: once on the one-shot channel
//! behind its [`SaveHandle`], once on the store-wide event queue. Nothing
//! here touches the owner's state, so the owner sees completions only when
//! it polls.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use lumen_types::error::{LumenError, Result};
use lumen_types::models::CollectionKind;

/// Completion notice for an asynchronous save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Saved(CollectionKind),
    SaveFailed {
        kind: CollectionKind,
        message: String,
    },
}

impl StoreEvent {
    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::Saved(kind) | Self::SaveFailed { kind, .. } => *kind,
        }
    }
}

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// Fixed pool of save threads. Dropping the pool closes the queue and joins
/// every thread, so all accepted jobs run to completion first.
pub(crate) struct SaveWorkers {
    jobs: Option<Sender<Job>>,
    threads: Vec<JoinHandle<()>>,
}

impl SaveWorkers {
    pub(crate) fn spawn(count: usize) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let mut threads = Vec::with_capacity(count.max(1));
        for i in 0..count.max(1) {
            let rx = rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("lumen-save-{i}"))
                .spawn(move || {
                    for job in rx.iter() {
                        job();
                    }
                })?;
            threads.push(handle);
        }
        log::debug!("Started {} save workers", threads.len());
        Ok(Self {
            jobs: Some(tx),
            threads,
        })
    }

    /// Queue a job. Returns `false` if the pool is already shut down; the
    /// job is dropped in that case.
    pub(crate) fn submit(&self, job: Job) -> bool {
        match &self.jobs {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        }
    }
}

impl Drop for SaveWorkers {
    fn drop(&mut self) {
        self.jobs.take();
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                log::error!("A save worker panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SaveHandle
// ---------------------------------------------------------------------------

/// Caller's view of one asynchronous save.
#[derive(Debug)]
pub struct SaveHandle {
    kind: CollectionKind,
    outcome: Receiver<Result<()>>,
}

impl SaveHandle {
    pub(crate) fn new(kind: CollectionKind, outcome: Receiver<Result<()>>) -> Self {
        Self { kind, outcome }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Block until the save finishes.
    pub fn wait(self) -> Result<()> {
        self.outcome.recv().map_err(|_| LumenError::WorkerGone)?
    }

    /// Non-blocking check. `None` while the save is still running. The
    /// outcome is delivered once; later calls report [`LumenError::WorkerGone`].
    pub fn try_outcome(&self) -> Option<Result<()>> {
        match self.outcome.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LumenError::WorkerGone)),
        }
    }
}
