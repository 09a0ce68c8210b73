use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Runs an action at most once.
///
/// Only the first [`invoke`](Latch::invoke) runs the action; every later
/// call is a no-op, including calls made from inside the action itself and
/// calls made from separately scheduled callbacks through clones of the
/// latch.
///
/// # Examples
///
/// ```rust
/// use eventide::sync::Latch;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = Rc::new(Cell::new(0));
/// let c = count.clone();
/// let latch = Latch::new(move || c.set(c.get() + 1));
///
/// assert!(latch.invoke());
/// assert!(!latch.invoke());
/// assert_eq!(count.get(), 1);
/// ```
#[derive(Clone)]
pub struct Latch {
    action: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
    fired: Rc<Cell<bool>>,
}

impl Latch {
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: Rc::new(RefCell::new(Some(Box::new(action)))),
            fired: Rc::new(Cell::new(false)),
        }
    }

    /// Runs the action if this is the first invocation.
    ///
    /// Returns `true` if the action ran.
    pub fn invoke(&self) -> bool {
        if self.fired.replace(true) {
            return false;
        }

        let action = self.action.borrow_mut().take();

        match action {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }
}

impl fmt::Debug for Latch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Latch")
            .field("fired", &self.fired.get())
            .finish()
    }
}
