//! Error type shared by every part of the runtime.
//!
//! Errors travel through the same channel as values: a rejected
//! [`Deferred`](crate::Deferred) carries an [`Error`], a coroutine that lets
//! an error escape rejects its completion with that same [`Error`], and the
//! scheduler returns it from its fallible entry points.
//!
//! The type is `Clone` because one rejection is delivered to every
//! subscriber of the rejected future.

use crate::future::FutureId;
use crate::runtime::coroutine::CoroutineId;

use std::time::Duration;

/// Convenience alias for results produced by the runtime.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can reject a future or fail a scheduler operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An application-level rejection reason.
    #[error("{0}")]
    Rejected(String),

    /// A future was asked to adopt a future that (transitively) adopts it.
    #[error("future {0} would adopt itself through its adoption chain")]
    CyclicAdoption(FutureId),

    /// A [`timeout`](crate::time::timeout) elapsed before its future settled.
    #[error("timed out after {0:?} of virtual time")]
    Timeout(Duration),

    /// A coroutine suspended on something that is not a runtime future.
    ///
    /// Nothing would ever resume it, so it fails instead of hanging.
    #[error("coroutine {0} suspended on a future the runtime cannot resume")]
    ForeignSuspension(CoroutineId),

    /// The scheduler went idle while the coroutine was still suspended.
    #[error("coroutine {0} was still suspended when the scheduler went idle")]
    Stalled(CoroutineId),

    /// A gate or sequencer slot index outside of its capacity.
    #[error("slot {index} is out of range for capacity {capacity}")]
    SlotOutOfRange { index: usize, capacity: usize },

    /// A single microtask drain ran more microtasks than the configured budget.
    #[error("microtask budget of {0} exhausted in a single drain")]
    MicrotaskBudgetExceeded(usize),

    /// The scheduler loop was entered from inside one of its own tasks.
    #[error("the scheduler is already running")]
    Reentrant,

    /// The scheduler has been disposed and no longer runs work.
    #[error("the scheduler has been disposed")]
    Disposed,
}

impl Error {
    /// Creates an application rejection from any message.
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Rejected(message.into())
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::msg(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Rejected(message)
    }
}
