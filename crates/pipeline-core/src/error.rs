//! Error taxonomy for the queue and stage layers.

use thiserror::Error;

/// Errors surfaced by [`crate::queue::BoundedQueue`].
///
/// Nothing here is retried internally — the queue is a pure synchronization
/// object and leaves recovery decisions to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A non-positive or overflowing capacity was requested.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The ring buffer's backing allocation could not be sized or obtained.
    #[error("allocation failed: {0}")]
    AllocationFailure(&'static str),
    /// `put` was called after the queue transitioned to finished.
    #[error("queue is finished")]
    QueueFinished,
}

impl QueueError {
    /// `true` for errors where retrying the same `put` later could succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// `true` once the queue can never accept another record.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::QueueFinished)
    }
}

/// Errors surfaced by [`crate::stage::Stage`].
#[derive(Debug, Error)]
pub enum StageError {
    /// Propagated verbatim from the stage's queue.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawnFailure(#[from] std::io::Error),
    /// An operation was invoked on a stage that was never initialized, or
    /// whose `fini` has already run.
    #[error("stage not initialized")]
    NotInitialized,
    /// A caller-supplied argument violated the stage's contract (e.g.
    /// `attach` called after ingestion had already begun).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl StageError {
    /// `true` once the stage can never make forward progress again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NotInitialized) || matches!(self, Self::Queue(e) if e.is_terminal())
    }
}
