use super::core::Task;
use super::state::CoroutineState;
use super::CoroutineId;
use crate::error::Result;
use crate::future::{Deferred, Suspend};
use crate::scheduler::Scheduler;

use std::fmt;
use std::future::{Future, IntoFuture};
use std::rc::Rc;

/// Handle to a spawned coroutine.
///
/// Dropping the handle does not stop the coroutine: it keeps running as
/// long as the deferred values it waits on are alive.
///
/// Awaiting the handle (from another coroutine) waits for its completion.
pub struct Coroutine<T> {
    task: Rc<Task<T>>,
}

impl<T: Clone + 'static> Coroutine<T> {
    /// Spawns `body` on `scheduler`.
    ///
    /// The first step runs in the next microtask drain.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventide::{Coroutine, CoroutineState, Error, Scheduler};
    ///
    /// let scheduler = Scheduler::new();
    /// let coroutine = Coroutine::spawn(&scheduler, async { Ok::<_, Error>("done") });
    ///
    /// assert_eq!(coroutine.state(), CoroutineState::Created);
    /// scheduler.run_until_idle().unwrap();
    /// assert_eq!(coroutine.state(), CoroutineState::Completed);
    /// ```
    pub fn spawn<F>(scheduler: &Scheduler, body: F) -> Self
    where
        F: Future<Output = Result<T>> + 'static,
    {
        Self {
            task: Task::spawn(scheduler, body),
        }
    }

    pub fn id(&self) -> CoroutineId {
        self.task.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CoroutineState {
        self.task.state.get()
    }

    /// The future settled with the coroutine's result.
    pub fn completion(&self) -> Deferred<T> {
        self.task.completion.clone()
    }
}

impl<T> Clone for Coroutine<T> {
    fn clone(&self) -> Self {
        Self {
            task: self.task.clone(),
        }
    }
}

impl<T: Clone + 'static> IntoFuture for Coroutine<T> {
    type Output = Result<T>;
    type IntoFuture = Suspend<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.completion().into_future()
    }
}

impl<T: Clone + 'static> fmt::Debug for Coroutine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coroutine")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}
