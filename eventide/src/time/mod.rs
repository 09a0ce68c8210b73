//! Virtual-time utilities.
//!
//! Everything here runs on the scheduler's virtual clock: sleeping for an
//! hour costs nothing but a macrotask, and elapsed durations are exact.
//!
//! It includes:
//! - [`sleep`] and [`delay`] for scheduling timers,
//! - [`timeout`] for bounding how long a future may stay pending,
//! - [`instrumented`] for measuring virtual time to completion.

mod instrumented;
mod sleep;
mod timeout;

#[doc(inline)]
pub use instrumented::instrumented;

#[doc(inline)]
pub use sleep::{delay, sleep};

#[doc(inline)]
pub use timeout::timeout;
