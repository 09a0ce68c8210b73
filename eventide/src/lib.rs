//! # Eventide
//!
//! **Eventide** is a single-threaded cooperative runtime driven by a
//! virtual clock, designed as the deterministic event-loop layer for the
//! **Nebula** ecosystem.
//!
//! Unlike general-purpose runtimes, Eventide never blocks and never reads
//! the wall clock. Work is deferred through two ordered queues and time only
//! advances when the next timer fires, which makes every run reproducible.
//! It provides:
//!
//! - **Deferred values** ([`Deferred`]) that settle once and notify their
//!   subscribers as microtasks, with adoption of other deferred values
//! - A **two-queue scheduler** ([`Scheduler`]): a FIFO microtask queue drained
//!   to exhaustion before each macrotask, and a timer queue ordered by
//!   virtual fire time
//! - A **coroutine driver** ([`coroutine::run`]) that steps `async` bodies,
//!   suspending them on deferred values and injecting errors at the await
//! - **Coordination primitives** in [`sync`]: `join_all`, `race`, gates,
//!   latches and sequencers
//! - **Time utilities** in [`time`] and a [`tools::retry`] helper
//! - **Macros** like `#[eventide::main]`, `#[eventide::test]`, `join!` and
//!   `select!`
//!
//! ## Quick Start
//!
//! ```rust
//! use eventide::time::{delay, sleep};
//! use eventide::{Error, RuntimeBuilder};
//! use std::time::Duration;
//!
//! let runtime = RuntimeBuilder::new().build();
//! let s = runtime.scheduler();
//!
//! let total = runtime.block_on(async move {
//!     sleep(&s, Duration::from_millis(100)).await?;
//!     let a = delay(&s, Duration::from_millis(50), 20).await?;
//!     let b = delay(&s, Duration::from_millis(50), 22).await?;
//!     Ok::<_, Error>(a + b)
//! });
//!
//! assert_eq!(total, Ok(42));
//! assert_eq!(runtime.scheduler().now().as_millis(), 200);
//! ```
//!
//! ## Modules
//!
//! - [`coroutine`]: Coroutine driver and handles
//! - [`sync`]: Join, race, gate, latch and sequencer primitives
//! - [`time`]: Sleep, delay, timeout and instrumentation on virtual time
//! - [`tools`]: Utilities like retry mechanisms

mod error;
mod future;
mod runtime;
mod scheduler;

pub mod sync;
pub mod time;
pub mod tools;

pub use error::{Error, Result};
pub use future::{Deferred, FutureId, Resolution, Resolve, State, Suspend};
pub use runtime::builder::RuntimeBuilder;
pub use runtime::coroutine::{self, Coroutine, CoroutineId, CoroutineState};
pub use runtime::yield_now::yield_now;
pub use runtime::Runtime;
pub use scheduler::{
    Diagnostics, Scheduler, TimerHandle, TimerStatus, UnhandledRejection, VirtualTime,
};

pub use eventide_macros::*;
