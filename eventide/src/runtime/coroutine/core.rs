use super::handle::Coroutine;
use super::state::CoroutineState;
use super::CoroutineId;
use crate::error::{Error, Result};
use crate::future::Deferred;
use crate::scheduler::Scheduler;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

type Body<T> = Pin<Box<dyn Future<Output = Result<T>>>>;

/// A suspended computation that a settled deferred can wake up.
///
/// The scheduler only knows coroutines through this trait, which lets
/// coroutines of any output type share one context slot.
pub(crate) trait Resume {
    /// Records that the coroutine is waiting on a runtime deferred.
    ///
    /// Called by an awaited deferred during a step.
    fn park(&self);

    /// Runs the next step of the coroutine.
    fn resume(self: Rc<Self>);

    /// Drops the body of a coroutine that will never be resumed.
    fn abandon(&self);
}

/// A coroutine body together with its lifecycle state and completion.
pub(crate) struct Task<T> {
    pub(crate) id: CoroutineId,
    pub(crate) state: Cell<CoroutineState>,

    /// The body, taken out while it is being polled.
    body: RefCell<Option<Body<T>>>,

    /// Set when the current step suspended on a runtime deferred.
    parked: Cell<bool>,

    pub(crate) completion: Deferred<T>,
    scheduler: Scheduler,
}

impl<T: Clone + 'static> Task<T> {
    /// Creates a task and queues its first step as a microtask.
    pub(crate) fn spawn<F>(scheduler: &Scheduler, body: F) -> Rc<Self>
    where
        F: Future<Output = Result<T>> + 'static,
    {
        let task = Rc::new(Self {
            id: scheduler.next_coroutine_id(),
            state: Cell::new(CoroutineState::Created),
            body: RefCell::new(Some(Box::pin(body))),
            parked: Cell::new(false),
            completion: Deferred::new(scheduler),
            scheduler: scheduler.clone(),
        });

        log::trace!("coroutine {} created", task.id);

        let registered: Rc<dyn Resume> = task.clone();
        scheduler.register_coroutine(task.id, Rc::downgrade(&registered));

        let first = task.clone();
        scheduler.schedule_microtask(move || first.step());

        task
    }

    /// Polls the body once.
    ///
    /// Only a created or suspended coroutine can step; anything else is a
    /// stale wake-up and is ignored.
    pub(crate) fn step(self: &Rc<Self>) {
        match self.state.get() {
            CoroutineState::Created | CoroutineState::Suspended => {}
            state => {
                log::trace!("coroutine {} ignored a resume while {state:?}", self.id);
                return;
            }
        }

        let Some(mut body) = self.body.borrow_mut().take() else {
            return;
        };

        self.state.set(CoroutineState::Running);
        self.parked.set(false);

        let current: Rc<dyn Resume> = self.clone();
        let mut cx = Context::from_waker(Waker::noop());

        let poll = self
            .scheduler
            .context()
            .enter(current, || body.as_mut().poll(&mut cx));

        match poll {
            Poll::Pending if self.scheduler.is_disposed() => {
                drop(body);
                self.fail(Error::Disposed);
            }
            Poll::Pending if self.parked.get() => {
                *self.body.borrow_mut() = Some(body);
                self.state.set(CoroutineState::Suspended);

                log::trace!("coroutine {} suspended", self.id);
            }
            Poll::Pending => {
                drop(body);
                self.fail(Error::ForeignSuspension(self.id));
            }
            Poll::Ready(Ok(value)) => {
                drop(body);
                self.state.set(CoroutineState::Completed);
                self.scheduler.unregister_coroutine(self.id);

                log::trace!("coroutine {} completed", self.id);
                self.completion.fulfill(value);
            }
            Poll::Ready(Err(error)) => {
                drop(body);
                self.fail(error);
            }
        }
    }

    fn fail(&self, error: Error) {
        self.state.set(CoroutineState::Failed);
        self.scheduler.unregister_coroutine(self.id);

        log::debug!("coroutine {} failed: {error}", self.id);
        self.completion.reject(error);
    }
}

impl<T: Clone + 'static> Resume for Task<T> {
    fn park(&self) {
        self.parked.set(true);
    }

    fn resume(self: Rc<Self>) {
        self.step();
    }

    fn abandon(&self) {
        // A running step finds the scheduler disposed when its poll returns.
        if self.state.get().is_finished() || self.state.get() == CoroutineState::Running {
            return;
        }

        let body = self.body.borrow_mut().take();
        drop(body);

        log::debug!("coroutine {} abandoned while {:?}", self.id, self.state.get());
        self.fail(Error::Disposed);
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        self.scheduler.unregister_coroutine(self.id);
    }
}

/// Drives `body` as a coroutine and returns its completion.
///
/// The body does not start synchronously: its first step is queued as a
/// microtask. Each `.await` on a [`Deferred`] inside the body suspends
/// the coroutine until that deferred settles; the await evaluates to
/// `Ok(value)` or `Err(error)`, so errors can be handled in place or
/// propagated with `?`.
///
/// Awaiting a nested `async fn` needs no special treatment: its own
/// suspension points suspend the outer coroutine.
///
/// # Examples
///
/// ```rust
/// use eventide::{coroutine, Deferred, Error, Scheduler, State};
///
/// let scheduler = Scheduler::new();
/// let s = scheduler.clone();
///
/// let done = coroutine::run(&scheduler, async move {
///     let x = Deferred::of(&s, 6).await?;
///     let y = Deferred::of(&s, 7).await?;
///     Ok::<_, Error>(x * y)
/// });
///
/// scheduler.run_until_idle().unwrap();
/// assert_eq!(done.state(), State::Fulfilled(42));
/// ```
pub fn run<T, F>(scheduler: &Scheduler, body: F) -> Deferred<T>
where
    T: Clone + 'static,
    F: Future<Output = Result<T>> + 'static,
{
    Coroutine::spawn(scheduler, body).completion()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::future::State;

    #[test]
    fn first_step_waits_for_a_microtask() {
        let scheduler = Scheduler::new();
        let task = Task::spawn(&scheduler, async { Ok::<_, Error>(1) });

        assert_eq!(task.state.get(), CoroutineState::Created);

        scheduler.run_until_idle().unwrap();

        assert_eq!(task.state.get(), CoroutineState::Completed);
        assert_eq!(task.completion.state(), State::Fulfilled(1));
    }

    #[test]
    fn foreign_pending_fails_the_coroutine() {
        let scheduler = Scheduler::new();
        let task = Task::spawn(&scheduler, async {
            std::future::pending::<()>().await;
            Ok::<_, Error>(())
        });
        task.completion.mark_handled();

        scheduler.run_until_idle().unwrap();

        assert_eq!(task.state.get(), CoroutineState::Failed);
        assert_eq!(
            task.completion.state(),
            State::Rejected(Error::ForeignSuspension(task.id))
        );
    }
}
