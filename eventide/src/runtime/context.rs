use super::coroutine::Resume;

use std::cell::RefCell;
use std::rc::Rc;

/// Tracks the coroutine a scheduler is currently polling.
///
/// A coroutine installs itself here for the duration of one step, which
/// lets a [`Deferred`](crate::Deferred) awaited inside the body find out
/// who to wake once it settles. Each scheduler owns its own context, so
/// independent schedulers on the same thread never see each other's
/// coroutines.
pub(crate) struct CoroutineContext {
    current: RefCell<Option<Rc<dyn Resume>>>,
}

impl CoroutineContext {
    pub(crate) fn new() -> Self {
        Self {
            current: RefCell::new(None),
        }
    }

    /// Returns the coroutine currently being stepped, if any.
    pub(crate) fn current(&self) -> Option<Rc<dyn Resume>> {
        self.current.borrow().clone()
    }

    /// Runs `f` with `coroutine` installed as the current coroutine.
    ///
    /// The previous value is restored afterwards, so nested steps (a
    /// coroutine starting another one synchronously) unwind correctly.
    ///
    /// # Arguments
    ///
    /// * `coroutine` - The coroutine being stepped.
    /// * `f` - Closure executed inside the coroutine context.
    pub(crate) fn enter<R>(&self, coroutine: Rc<dyn Resume>, f: impl FnOnce() -> R) -> R {
        let previous = self.current.replace(Some(coroutine));
        let out = f();
        self.current.replace(previous);

        out
    }
}
