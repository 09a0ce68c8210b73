use crate::future::{Deferred, Suspend};
use crate::scheduler::Scheduler;

/// Yields execution back to the scheduler.
///
/// This allows queued microtasks to make progress before the current
/// coroutine continues. The coroutine resumes in a later microtask of the
/// same drain; virtual time does not move.
///
/// # Examples
///
/// ```rust,ignore
/// yield_now(&scheduler).await?;
/// ```
pub fn yield_now(scheduler: &Scheduler) -> Suspend<()> {
    Suspend::new(Deferred::of(scheduler, ()))
}
