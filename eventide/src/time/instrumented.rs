use crate::future::Deferred;

use std::time::Duration;

/// Measures how long a future takes to fulfill.
///
/// The returned future fulfills with the value and the virtual time
/// elapsed between this call and the fulfillment. Rejections pass through.
///
/// # Examples
///
/// ```rust
/// use eventide::time::{delay, instrumented};
/// use eventide::{Scheduler, State};
/// use std::time::Duration;
///
/// let scheduler = Scheduler::new();
/// let measured = instrumented(&delay(&scheduler, Duration::from_millis(25), 'x'));
///
/// scheduler.run_until_idle().unwrap();
/// assert_eq!(
///     measured.state(),
///     State::Fulfilled(('x', Duration::from_millis(25)))
/// );
/// ```
pub fn instrumented<T: Clone + 'static>(future: &Deferred<T>) -> Deferred<(T, Duration)> {
    let scheduler = future.scheduler().clone();
    let start = scheduler.now();

    future.map(move |value| {
        let elapsed = scheduler.now().saturating_duration_since(start);
        (value, elapsed)
    })
}
