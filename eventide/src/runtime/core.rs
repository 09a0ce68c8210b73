use super::coroutine::Coroutine;
use crate::error::{Error, Result};
use crate::future::{Deferred, State};
use crate::scheduler::{Diagnostics, Scheduler, UnhandledRejection};

use std::future::Future;

/// The main runtime handle.
///
/// `Runtime` owns a [`Scheduler`] and is responsible for:
/// - spawning coroutines,
/// - driving them to completion via [`block_on`](Self::block_on),
/// - exposing the scheduler diagnostics.
///
/// Dropping the runtime disposes the scheduler, releasing any work still
/// queued.
pub struct Runtime {
    scheduler: Scheduler,
}

impl Runtime {
    /// Wraps an existing scheduler.
    ///
    /// [`RuntimeBuilder`](crate::RuntimeBuilder) is the usual way to get one.
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Returns a handle to the runtime's scheduler.
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Spawns a coroutine onto the runtime.
    ///
    /// It starts on the next microtask drain, i.e. the next time the
    /// runtime is run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventide::{Error, RuntimeBuilder};
    ///
    /// let runtime = RuntimeBuilder::new().build();
    /// let done = runtime.spawn(async { Ok::<_, Error>(()) }).completion();
    ///
    /// runtime.run_until_idle().unwrap();
    /// assert!(!done.is_pending());
    /// ```
    pub fn spawn<T, F>(&self, body: F) -> Coroutine<T>
    where
        T: Clone + 'static,
        F: Future<Output = Result<T>> + 'static,
    {
        Coroutine::spawn(&self.scheduler, body)
    }

    /// Runs a coroutine to completion.
    ///
    /// This is the synchronous entry point of the runtime (e.g. in `main`
    /// or tests). The body is spawned and the scheduler runs until idle;
    /// virtual time makes this instantaneous however long the body sleeps.
    ///
    /// # Errors
    ///
    /// - the body's own error,
    /// - [`Error::Stalled`] if the scheduler went idle while the body was
    ///   still suspended (it awaited something that never settles),
    /// - any error from [`Scheduler::run_until_idle`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventide::{Deferred, Error, RuntimeBuilder};
    ///
    /// let runtime = RuntimeBuilder::new().build();
    /// let s = runtime.scheduler();
    ///
    /// let result = runtime.block_on(async move {
    ///     let answer = Deferred::of(&s, 42).await?;
    ///     Ok::<_, Error>(answer)
    /// });
    /// assert_eq!(result, Ok(42));
    /// ```
    pub fn block_on<T, F>(&self, body: F) -> Result<T>
    where
        T: Clone + 'static,
        F: Future<Output = Result<T>> + 'static,
    {
        let coroutine = self.spawn(body);
        let completion: Deferred<T> = coroutine.completion();
        completion.mark_handled();

        self.scheduler.run_until_idle()?;

        match completion.state() {
            State::Fulfilled(value) => Ok(value),
            State::Rejected(error) => Err(error),
            State::Pending => {
                log::debug!("coroutine {} stalled at idle", coroutine.id());
                Err(Error::Stalled(coroutine.id()))
            }
        }
    }

    /// Runs the scheduler until both queues are empty.
    pub fn run_until_idle(&self) -> Result<()> {
        self.scheduler.run_until_idle()
    }

    /// Snapshot of the scheduler diagnostics.
    pub fn diagnostics(&self) -> Diagnostics {
        self.scheduler.diagnostics()
    }

    /// Removes and returns the unhandled rejections reported so far.
    pub fn unhandled_rejections(&self) -> Vec<UnhandledRejection> {
        self.scheduler.take_unhandled_rejections()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Scheduler::new())
    }
}

impl Drop for Runtime {
    /// Disposes the scheduler, dropping every queued task.
    fn drop(&mut self) {
        self.scheduler.dispose();
    }
}
