use crate::future::Deferred;
use crate::scheduler::Scheduler;

/// Settles with the outcome of whichever future settles first.
///
/// Fulfillment and rejection both count. Later settlements are observed
/// and discarded, so losing rejections are never reported as unhandled.
/// With no input the result stays pending forever.
///
/// # Examples
///
/// ```rust
/// use eventide::sync::race;
/// use eventide::time::delay;
/// use eventide::{Scheduler, State};
/// use std::time::Duration;
///
/// let scheduler = Scheduler::new();
/// let winner = race(
///     &scheduler,
///     [
///         delay(&scheduler, Duration::from_millis(200), "slow"),
///         delay(&scheduler, Duration::from_millis(100), "fast"),
///     ],
/// );
///
/// scheduler.run_until_idle().unwrap();
/// assert_eq!(winner.state(), State::Fulfilled("fast"));
/// ```
pub fn race<T, I>(scheduler: &Scheduler, futures: I) -> Deferred<T>
where
    T: Clone + 'static,
    I: IntoIterator<Item = Deferred<T>>,
{
    let winner = Deferred::new(scheduler);

    for future in futures {
        let winner = winner.clone();

        future.subscribe_with(move |outcome| {
            if winner.is_pending() {
                winner.resolve(outcome);
            } else {
                log::trace!("race {} already settled; outcome discarded", winner.id());
            }
        });
    }

    winner
}
