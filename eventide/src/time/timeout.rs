use crate::error::Error;
use crate::future::Deferred;
use crate::scheduler::Scheduler;

use std::time::Duration;

/// Bounds how long a future may stay pending.
///
/// The result settles with `future`'s outcome if it settles within
/// `duration` of virtual time, and rejects with [`Error::Timeout`]
/// otherwise. The timer is cancelled as soon as `future` settles, so a
/// fast future leaves nothing behind in the macrotask queue.
///
/// `future` itself keeps running after a timeout; only interest in it is
/// dropped.
///
/// # Examples
///
/// ```rust
/// use eventide::time::{delay, timeout};
/// use eventide::{Error, Scheduler, State};
/// use std::time::Duration;
///
/// let scheduler = Scheduler::new();
/// let slow = delay(&scheduler, Duration::from_millis(500), 1);
/// let bounded = timeout(&scheduler, Duration::from_millis(100), slow);
///
/// scheduler.run_until_idle().unwrap();
/// assert_eq!(
///     bounded.state(),
///     State::Rejected(Error::Timeout(Duration::from_millis(100)))
/// );
/// ```
pub fn timeout<T>(scheduler: &Scheduler, duration: Duration, future: Deferred<T>) -> Deferred<T>
where
    T: Clone + 'static,
{
    let output = Deferred::new(scheduler);

    let expired = output.clone();
    let timer = scheduler.schedule_at(duration, move || {
        if expired.is_pending() {
            log::debug!("future {} timed out after {duration:?}", expired.id());
            expired.reject(Error::Timeout(duration));
        }
    });

    let settled = output.clone();
    let scheduler = scheduler.clone();
    future.subscribe_with(move |outcome| {
        scheduler.cancel(&timer);

        if settled.is_pending() {
            settled.resolve(outcome);
        }
    });

    output
}
