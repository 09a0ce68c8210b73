use super::resolution::{Resolution, Resolve};
use super::state::State;
use super::FutureId;
use crate::error::{Error, Result};
use crate::scheduler::Scheduler;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

type Subscriber<T> = Box<dyn FnOnce(Result<T>)>;

/// A value that becomes available later.
///
/// A `Deferred` starts pending and settles at most once. The first
/// `fulfill`, `reject` or `resolve` wins; every later attempt is ignored
/// and counted as a settlement conflict in the scheduler diagnostics.
///
/// Clones share the same underlying state, so one clone can be handed to
/// the producer while others are subscribed to or awaited.
///
/// # Examples
///
/// ```rust
/// use eventide::{Deferred, Scheduler, State};
///
/// let scheduler = Scheduler::new();
/// let price = Deferred::new(&scheduler);
///
/// let doubled = price.map(|v: u32| v * 2);
/// price.fulfill(21);
///
/// scheduler.run_until_idle().unwrap();
/// assert_eq!(doubled.state(), State::Fulfilled(42));
/// ```
pub struct Deferred<T> {
    shared: Rc<RefCell<Shared<T>>>,
    scheduler: Scheduler,
}

struct Shared<T> {
    id: FutureId,
    slot: Slot<T>,

    /// Continuations waiting for settlement, in subscription order.
    subscribers: Vec<Subscriber<T>>,

    /// Set as soon as anything subscribes. Shared with the scheduler's
    /// rejection tracker.
    handled: Rc<Cell<bool>>,
}

enum Slot<T> {
    Pending,

    /// Following another future. Counts as resolved.
    Adopting(Weak<RefCell<Shared<T>>>),

    Settled(Result<T>),
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: Clone + 'static> Deferred<T> {
    /// Creates a pending future bound to `scheduler`.
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                id: scheduler.next_future_id(),
                slot: Slot::Pending,
                subscribers: Vec::new(),
                handled: Rc::new(Cell::new(false)),
            })),
            scheduler: scheduler.clone(),
        }
    }

    /// Creates a future that is already fulfilled with `value`.
    ///
    /// Subscribers still run as microtasks.
    pub fn of(scheduler: &Scheduler, value: T) -> Self {
        let deferred = Self::new(scheduler);
        deferred.fulfill(value);
        deferred
    }

    /// Creates a future that is already rejected with `error`.
    pub fn rejected(scheduler: &Scheduler, error: impl Into<Error>) -> Self {
        let deferred = Self::new(scheduler);
        deferred.reject(error);
        deferred
    }

    /// Turns anything resolvable into a future.
    ///
    /// A `Deferred` is returned unchanged (same identity), so normalizing
    /// twice never adds a layer.
    pub fn normalize(scheduler: &Scheduler, value: impl Resolve<T>) -> Self {
        match value.into_resolution() {
            Resolution::Fulfill(value) => Self::of(scheduler, value),
            Resolution::Reject(error) => Self::rejected(scheduler, error),
            Resolution::Adopt(deferred) => deferred,
        }
    }

    pub fn id(&self) -> FutureId {
        self.shared.borrow().id
    }

    /// The scheduler this future delivers its continuations on.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State<T> {
        match &self.shared.borrow().slot {
            Slot::Settled(outcome) => State::from(outcome.clone()),
            Slot::Pending | Slot::Adopting(_) => State::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self.shared.borrow().slot, Slot::Settled(_))
    }

    /// Returns `true` if both handles share the same state.
    pub fn ptr_eq(&self, other: &Deferred<T>) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Fulfills the future with `value`.
    ///
    /// Returns `false` (and records a settlement conflict) if the future
    /// was already settled or adopting.
    pub fn fulfill(&self, value: T) -> bool {
        self.settle(Ok(value), false)
    }

    /// Rejects the future with `error`.
    ///
    /// Returns `false` (and records a settlement conflict) if the future
    /// was already settled or adopting.
    pub fn reject(&self, error: impl Into<Error>) -> bool {
        self.settle(Err(error.into()), false)
    }

    /// Settles the future from any [`Resolve`] value.
    ///
    /// Resolving with another `Deferred` adopts it: this future stays
    /// pending until the other one settles, then takes its outcome.
    /// Adopting a future whose adoption chain leads back here rejects with
    /// [`Error::CyclicAdoption`].
    pub fn resolve(&self, value: impl Resolve<T>) -> bool {
        match value.into_resolution() {
            Resolution::Fulfill(value) => self.fulfill(value),
            Resolution::Reject(error) => self.reject(error),
            Resolution::Adopt(source) => self.adopt(source),
        }
    }

    /// Registers a continuation.
    ///
    /// Exactly one of the handlers runs, as a microtask, once this future
    /// settles (or on the next drain if it already has). The returned
    /// future is resolved with whatever the handler returns: a `Result`
    /// fulfills or rejects it, a `Deferred` is adopted.
    ///
    /// # Arguments
    ///
    /// * `on_fulfilled` - Called with the value on fulfillment.
    /// * `on_rejected` - Called with the error on rejection.
    pub fn subscribe<U, F, R, G, S>(&self, on_fulfilled: F, on_rejected: G) -> Deferred<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> R + 'static,
        R: Resolve<U>,
        G: FnOnce(Error) -> S + 'static,
        S: Resolve<U>,
    {
        let next = Deferred::new(&self.scheduler);
        let target = next.clone();

        self.subscribe_with(move |outcome| {
            let resolution = match outcome {
                Ok(value) => on_fulfilled(value).into_resolution(),
                Err(error) => on_rejected(error).into_resolution(),
            };

            target.resolve(resolution);
        });

        next
    }

    /// Continues with the value; rejections pass through unchanged.
    pub fn then<U, F, R>(&self, on_fulfilled: F) -> Deferred<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> R + 'static,
        R: Resolve<U>,
    {
        self.subscribe(on_fulfilled, Resolution::<U>::Reject)
    }

    /// Recovers from a rejection; values pass through unchanged.
    pub fn catch<F, R>(&self, on_rejected: F) -> Deferred<T>
    where
        F: FnOnce(Error) -> R + 'static,
        R: Resolve<T>,
    {
        self.subscribe(Resolution::<T>::Fulfill, on_rejected)
    }

    /// Transforms the value with an infallible function.
    pub fn map<U, F>(&self, f: F) -> Deferred<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.then(move |value| Resolution::<U>::Fulfill(f(value)))
    }

    /// Marks the future as observed without subscribing to it.
    ///
    /// A rejection of a handled future is never reported as unhandled.
    pub fn mark_handled(&self) {
        self.shared.borrow().handled.set(true);
    }

    /// Low-level subscription used by every combinator.
    ///
    /// The callback receives the outcome as a microtask. Subscribing marks
    /// the future as handled.
    pub(crate) fn subscribe_with(&self, subscriber: impl FnOnce(Result<T>) + 'static) {
        let mut shared = self.shared.borrow_mut();
        shared.handled.set(true);

        if let Slot::Settled(outcome) = &shared.slot {
            let outcome = outcome.clone();
            drop(shared);

            self.scheduler.schedule_microtask(move || subscriber(outcome));
        } else {
            shared.subscribers.push(Box::new(subscriber));
        }
    }

    fn adopt(&self, source: Deferred<T>) -> bool {
        let id = {
            let shared = self.shared.borrow();
            if !matches!(shared.slot, Slot::Pending) {
                let id = shared.id;
                drop(shared);
                self.scheduler.record_settlement_conflict(id);
                return false;
            }
            shared.id
        };

        if self.adoption_reaches(&source) {
            log::debug!("future {id} rejected: cyclic adoption of {}", source.id());
            return self.settle(Err(Error::CyclicAdoption(id)), false);
        }

        log::trace!("future {id} adopts {}", source.id());
        self.shared.borrow_mut().slot = Slot::Adopting(Rc::downgrade(&source.shared));

        let target = self.clone();
        source.subscribe_with(move |outcome| {
            target.settle(outcome, true);
        });

        true
    }

    /// Walks `source`'s adoption chain looking for `self`.
    fn adoption_reaches(&self, source: &Deferred<T>) -> bool {
        let mut cursor = Some(source.shared.clone());

        while let Some(node) = cursor {
            if Rc::ptr_eq(&node, &self.shared) {
                return true;
            }

            cursor = match &node.borrow().slot {
                Slot::Adopting(next) => next.upgrade(),
                _ => None,
            };
        }

        false
    }

    /// Moves the future to its final state and schedules subscribers.
    ///
    /// An adopting future only accepts the outcome forwarded from the
    /// future it follows.
    fn settle(&self, outcome: Result<T>, forwarded: bool) -> bool {
        let (id, subscribers, handled) = {
            let mut shared = self.shared.borrow_mut();

            let accepts = match shared.slot {
                Slot::Pending => !forwarded,
                Slot::Adopting(_) => forwarded,
                Slot::Settled(_) => false,
            };

            if !accepts {
                let id = shared.id;
                drop(shared);
                self.scheduler.record_settlement_conflict(id);
                return false;
            }

            shared.slot = Slot::Settled(outcome.clone());
            (
                shared.id,
                mem::take(&mut shared.subscribers),
                shared.handled.clone(),
            )
        };

        match &outcome {
            Ok(_) => log::trace!("future {id} fulfilled"),
            Err(error) => {
                log::trace!("future {id} rejected: {error}");

                if !handled.get() {
                    self.scheduler.track_rejection(id, error.clone(), handled);
                }
            }
        }

        for subscriber in subscribers {
            let outcome = outcome.clone();
            self.scheduler.schedule_microtask(move || subscriber(outcome));
        }

        true
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        let state = match &shared.slot {
            Slot::Pending => "pending",
            Slot::Adopting(_) => "adopting",
            Slot::Settled(Ok(_)) => "fulfilled",
            Slot::Settled(Err(_)) => "rejected",
        };

        f.debug_struct("Deferred")
            .field("id", &shared.id)
            .field("state", &state)
            .field("subscribers", &shared.subscribers.len())
            .finish()
    }
}
