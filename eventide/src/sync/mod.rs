//! Coordination primitives.
//!
//! These resolve races between independently completing operations
//! deterministically. They are built from deferred values only and own no
//! scheduler internals:
//!
//! - [`join_all`] / [`zip`]: wait for every input, keep input order.
//! - [`race`]: the first settlement wins.
//! - [`Gate`]: fire a callback once `n` slots are filled.
//! - [`Latch`]: run an action at most once.
//! - [`Sequencer`]: reassemble results that arrive out of order.

mod gate;
mod join;
mod latch;
mod race;
mod sequencer;

pub use gate::Gate;
pub use join::{join_all, zip};
pub use latch::Latch;
pub use race::race;
pub use sequencer::Sequencer;
