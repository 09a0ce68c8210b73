use super::Deferred;
use crate::error::Result;
use crate::scheduler::Scheduler;

use std::cell::RefCell;
use std::future::{Future, IntoFuture};
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Future returned when a [`Deferred`] is awaited.
///
/// The first poll parks the coroutine currently being stepped and
/// subscribes to the deferred. When the deferred settles, the subscription
/// (running as a microtask) stores the outcome and resumes the coroutine,
/// whose next poll yields `Ok(value)` or `Err(error)`.
///
/// Awaiting an already-settled deferred still suspends once, so the code
/// after the `.await` always runs in a later microtask.
///
/// Outside of a coroutine, the task waker from the polling context is
/// woken instead.
#[must_use = "futures do nothing unless awaited"]
pub struct Suspend<T> {
    stage: Stage<T>,
}

enum Stage<T> {
    /// Not polled yet.
    Idle(Deferred<T>),

    /// Subscribed. Only the outcome slot is kept: the subscription holds
    /// the coroutine, so holding the source too would make the coroutine
    /// own itself through the deferred.
    Waiting {
        scheduler: Scheduler,
        outcome: Rc<RefCell<Option<Result<T>>>>,
    },

    Done,
}

impl<T> Suspend<T> {
    pub(crate) fn new(source: Deferred<T>) -> Self {
        Self {
            stage: Stage::Idle(source),
        }
    }
}

impl<T: Clone + 'static> Future for Suspend<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match mem::replace(&mut this.stage, Stage::Done) {
            Stage::Idle(source) => {
                let scheduler = source.scheduler().clone();
                let resumer = scheduler.current_coroutine();
                let outcome = Rc::new(RefCell::new(None));
                let waker = cx.waker().clone();

                if let Some(coroutine) = &resumer {
                    coroutine.park();
                }

                let store = outcome.clone();
                source.subscribe_with(move |settled| {
                    *store.borrow_mut() = Some(settled);

                    match resumer {
                        Some(coroutine) => coroutine.resume(),
                        None => waker.wake(),
                    }
                });

                this.stage = Stage::Waiting { scheduler, outcome };
                Poll::Pending
            }
            Stage::Waiting { scheduler, outcome } => {
                let settled = outcome.borrow_mut().take();
                if let Some(settled) = settled {
                    return Poll::Ready(settled);
                }

                if let Some(coroutine) = scheduler.current_coroutine() {
                    coroutine.park();
                }

                this.stage = Stage::Waiting { scheduler, outcome };
                Poll::Pending
            }
            Stage::Done => panic!("`Suspend` polled after completion"),
        }
    }
}

impl<T: Clone + 'static> IntoFuture for Deferred<T> {
    type Output = Result<T>;
    type IntoFuture = Suspend<T>;

    fn into_future(self) -> Self::IntoFuture {
        Suspend::new(self)
    }
}

impl<T: Clone + 'static> IntoFuture for &Deferred<T> {
    type Output = Result<T>;
    type IntoFuture = Suspend<T>;

    fn into_future(self) -> Self::IntoFuture {
        Suspend::new(self.clone())
    }
}
