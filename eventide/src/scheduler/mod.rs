//! Two-queue scheduler and virtual clock.
//!
//! The scheduler is the only source of progress in the runtime. It keeps:
//! - a FIFO **microtask** queue, drained to exhaustion before anything else,
//! - a **macrotask** queue ordered by fire time, then enqueue order,
//! - a **virtual clock**, moved to a macrotask's fire time just before it
//!   runs.
//!
//! Nothing here touches the wall clock or blocks the thread: running the
//! scheduler simply consumes queued work until both queues are empty.

mod clock;
mod core;
mod diagnostics;
mod timer;

pub use clock::VirtualTime;
pub use self::core::Scheduler;
pub use diagnostics::{Diagnostics, UnhandledRejection};
pub use timer::{TimerHandle, TimerStatus};
