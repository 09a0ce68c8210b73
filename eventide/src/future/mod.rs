//! Deferred values.
//!
//! A [`Deferred`] is a placeholder for a value produced later. It starts
//! pending and settles exactly once, either fulfilled with a value or
//! rejected with an [`Error`](crate::Error). Everything that wants the
//! outcome subscribes; subscribers always run as microtasks on the owning
//! scheduler, never synchronously inside the call that settled the future.
//!
//! A `Deferred` can also be awaited from inside a coroutine body, which is
//! how coroutines suspend (see [`Suspend`]).

mod deferred;
mod resolution;
mod state;
mod suspend;

pub use deferred::Deferred;
pub use resolution::{Resolution, Resolve};
pub use state::State;
pub use suspend::Suspend;

use std::fmt;

/// Identifier of a [`Deferred`], unique within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FutureId(pub(crate) u64);

impl FutureId {
    /// Raw numeric value of the identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
