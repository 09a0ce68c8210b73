use crate::error::{Error, Result};
use crate::future::Deferred;
use crate::scheduler::Scheduler;

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

type OnReady<V> = Box<dyn FnOnce(Vec<V>)>;

/// Collects `n` values and fires a callback once all of them are in.
///
/// Each input is written to an explicit slot, so inputs may arrive in any
/// order. The callback receives the values in slot order, runs exactly once
/// and runs synchronously inside the `fill` that completes the last slot.
/// Refilling a slot before that overwrites it; fills after the gate fired
/// are ignored. A new gate is needed to collect again.
///
/// Clones share the same slots.
///
/// # Examples
///
/// ```rust
/// use eventide::sync::Gate;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(None));
/// let out = seen.clone();
/// let gate = Gate::new(2, move |values: Vec<&str>| *out.borrow_mut() = Some(values));
///
/// gate.fill(1, "world").unwrap();
/// gate.fill(0, "hello").unwrap();
///
/// assert_eq!(*seen.borrow(), Some(vec!["hello", "world"]));
/// ```
pub struct Gate<V> {
    inner: Rc<RefCell<Inner<V>>>,
}

struct Inner<V> {
    capacity: usize,
    slots: Vec<Option<V>>,
    filled: usize,
    on_ready: Option<OnReady<V>>,
    fired: bool,
}

impl<V: 'static> Gate<V> {
    /// Creates a gate with `capacity` slots.
    ///
    /// A gate with no slots fires immediately, inside this call.
    pub fn new(capacity: usize, on_ready: impl FnOnce(Vec<V>) + 'static) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        let gate = Self {
            inner: Rc::new(RefCell::new(Inner {
                capacity,
                slots,
                filled: 0,
                on_ready: Some(Box::new(on_ready)),
                fired: false,
            })),
        };

        if capacity == 0 {
            gate.fire_if_complete();
        }

        gate
    }

    /// Creates a gate whose values fulfill a deferred once complete.
    ///
    /// The deferred is only fulfilled if it is still pending, so callers
    /// may reject it early (as [`join_all`](super::join_all) does on the
    /// first failure).
    pub fn deferred(scheduler: &Scheduler, capacity: usize) -> (Self, Deferred<Vec<V>>)
    where
        V: Clone,
    {
        let output = Deferred::new(scheduler);
        let target = output.clone();

        let gate = Self::new(capacity, move |values| {
            if target.is_pending() {
                target.fulfill(values);
            }
        });

        (gate, output)
    }

    /// Writes `value` into slot `index`.
    ///
    /// Returns `Ok(true)` if this fill completed the gate and fired the
    /// callback, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotOutOfRange`] if `index >= capacity`.
    pub fn fill(&self, index: usize, value: V) -> Result<bool> {
        {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;

            if index >= inner.capacity {
                return Err(Error::SlotOutOfRange {
                    index,
                    capacity: inner.capacity,
                });
            }

            if inner.fired {
                log::trace!("gate already fired; fill of slot {index} ignored");
                return Ok(false);
            }

            if inner.slots[index].replace(value).is_none() {
                inner.filled += 1;
            }
        }

        Ok(self.fire_if_complete())
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Number of distinct slots filled so far.
    pub fn filled(&self) -> usize {
        self.inner.borrow().filled
    }

    /// `true` once the callback has run.
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().fired
    }

    fn fire_if_complete(&self) -> bool {
        let ready = {
            let mut inner = self.inner.borrow_mut();

            if inner.fired || inner.filled < inner.capacity {
                return false;
            }

            inner.fired = true;
            let values: Vec<V> = mem::take(&mut inner.slots).into_iter().flatten().collect();
            inner.on_ready.take().map(|on_ready| (on_ready, values))
        };

        // The callback may touch this gate again.
        if let Some((on_ready, values)) = ready {
            on_ready(values);
        }

        true
    }
}

impl<V> Clone for Gate<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> fmt::Debug for Gate<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();

        f.debug_struct("Gate")
            .field("filled", &inner.filled)
            .field("fired", &inner.fired)
            .finish()
    }
}
