use crate::future::Deferred;
use crate::scheduler::Scheduler;

use std::time::Duration;

/// Creates a future that fulfills after the given virtual duration.
///
/// The timer is a macrotask: it fires once the scheduler's clock reaches
/// `now + duration`, after every microtask queued before it.
///
/// # Examples
///
/// ```rust
/// use eventide::time::sleep;
/// use eventide::{Scheduler, VirtualTime};
/// use std::time::Duration;
///
/// let scheduler = Scheduler::new();
/// let nap = sleep(&scheduler, Duration::from_millis(10));
///
/// scheduler.run_until_idle().unwrap();
/// assert!(!nap.is_pending());
/// assert_eq!(scheduler.now(), VirtualTime::from_millis(10));
/// ```
pub fn sleep(scheduler: &Scheduler, duration: Duration) -> Deferred<()> {
    delay(scheduler, duration, ())
}

/// Creates a future that fulfills with `value` after `duration`.
pub fn delay<T: Clone + 'static>(scheduler: &Scheduler, duration: Duration, value: T) -> Deferred<T> {
    let deferred = Deferred::new(scheduler);
    let target = deferred.clone();

    scheduler.schedule_at(duration, move || {
        target.fulfill(value);
    });

    deferred
}
