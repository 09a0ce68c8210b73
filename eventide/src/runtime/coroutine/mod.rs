//! Coroutine driver.
//!
//! A coroutine is an `async` body whose suspension points are awaits on
//! [`Deferred`](crate::Deferred) values. The driver steps it on the
//! scheduler: the first step runs as a microtask, and every later step is
//! triggered by the settlement of the deferred it is parked on.
//!
//! The body's `Ok` value fulfills the coroutine's completion future; an
//! error that escapes it (typically through `?`) rejects it.

mod core;
mod handle;
mod state;

pub(crate) use self::core::Resume;

pub use self::core::run;
pub use handle::Coroutine;
pub use state::CoroutineState;

use std::fmt;

/// Identifier of a coroutine, unique within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoroutineId(pub(crate) u64);

impl CoroutineId {
    /// Raw numeric value of the identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CoroutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
