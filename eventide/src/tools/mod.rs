//! Retry utilities for eventual operations.
//!
//! The main entry point is [`retry`], which re-runs an operation produced
//! by a factory closure until it fulfills or the retry limit is reached,
//! optionally waiting a virtual-time interval between attempts.

mod retry;

#[doc(inline)]
pub use retry::{Retry, retry};
