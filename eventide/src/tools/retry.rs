use crate::future::{Deferred, Suspend};
use crate::runtime::coroutine;
use crate::scheduler::Scheduler;
use crate::time::sleep;

use std::future::IntoFuture;
use std::time::Duration;

/// Retries an eventual operation until it fulfills.
///
/// `factory` is called once for the first attempt and once more for each
/// of the up to `times` retries. The result fulfills with the first
/// successful attempt, or rejects with the last error once every retry is
/// used up.
///
/// # Examples
///
/// ```rust,ignore
/// let value = retry(&scheduler, 3, move || fetch(&s))
///     .set_interval(Duration::from_millis(50))
///     .await?;
/// ```
pub fn retry<G, T>(scheduler: &Scheduler, times: usize, factory: G) -> Retry<G>
where
    G: FnMut() -> Deferred<T> + 'static,
    T: Clone + 'static,
{
    Retry {
        scheduler: scheduler.clone(),
        factory,
        times,
        interval: Duration::ZERO,
    }
}

/// Builder returned by [`retry`].
///
/// Nothing runs until [`start`](Retry::start) is called or the builder is
/// awaited.
pub struct Retry<G> {
    scheduler: Scheduler,
    factory: G,
    times: usize,
    interval: Duration,
}

impl<G, T> Retry<G>
where
    G: FnMut() -> Deferred<T> + 'static,
    T: Clone + 'static,
{
    /// Waits `interval` of virtual time between a failure and the next
    /// attempt.
    pub fn set_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Starts the attempts as a coroutine and returns its completion.
    pub fn start(self) -> Deferred<T> {
        let Retry {
            scheduler,
            mut factory,
            times,
            interval,
        } = self;

        let timer = scheduler.clone();

        coroutine::run(&scheduler, async move {
            let mut remaining = times;

            loop {
                match factory().await {
                    Ok(value) => return Ok(value),
                    Err(error) if remaining == 0 => return Err(error),
                    Err(error) => {
                        remaining -= 1;
                        log::debug!("attempt failed: {error}; {remaining} retries left");

                        if !interval.is_zero() {
                            sleep(&timer, interval).await?;
                        }
                    }
                }
            }
        })
    }
}

impl<G, T> IntoFuture for Retry<G>
where
    G: FnMut() -> Deferred<T> + 'static,
    T: Clone + 'static,
{
    type Output = crate::error::Result<T>;
    type IntoFuture = Suspend<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.start().into_future()
    }
}
