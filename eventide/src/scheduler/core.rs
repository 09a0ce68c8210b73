use super::clock::VirtualTime;
use super::diagnostics::{Diagnostics, PendingRejection, UnhandledRejection};
use super::timer::{Action, ScheduledItem, TimerHandle, TimerStatus};
use crate::error::{Error, Result};
use crate::future::{Deferred, FutureId};
use crate::runtime::builder::Config;
use crate::runtime::context::CoroutineContext;
use crate::runtime::coroutine::{CoroutineId, Resume};

use std::cell::{Cell, RefCell};
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Handle to a single-threaded two-queue scheduler.
///
/// The scheduler owns:
/// - a FIFO **microtask** queue, used for continuation delivery,
/// - a **macrotask** queue ordered by `(fire_time, sequence)`,
/// - a **virtual clock** that advances only as macrotasks fire.
///
/// `Scheduler` is a cheap reference-counted handle: every
/// [`Deferred`] and coroutine keeps a clone so it can schedule its own
/// continuations. Separate schedulers share nothing, so several isolated
/// runtimes can coexist on one thread.
///
/// # Examples
///
/// ```rust
/// use eventide::Scheduler;
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// let scheduler = Scheduler::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let l = log.clone();
/// scheduler.schedule_at(Duration::ZERO, move || l.borrow_mut().push("timer"));
/// let l = log.clone();
/// scheduler.schedule_microtask(move || l.borrow_mut().push("microtask"));
///
/// scheduler.run_until_idle().unwrap();
/// assert_eq!(*log.borrow(), ["microtask", "timer"]);
/// ```
#[derive(Clone)]
pub struct Scheduler {
    core: Rc<Core>,
}

struct Core {
    config: Config,

    /// Current virtual time.
    now: Cell<VirtualTime>,

    /// Next macrotask sequence number.
    next_sequence: Cell<u64>,

    next_future_id: Cell<u64>,
    next_coroutine_id: Cell<u64>,

    microtasks: RefCell<VecDeque<Action>>,
    macrotasks: RefCell<BinaryHeap<ScheduledItem>>,

    /// Rejections to examine at the next idle point.
    rejections: RefCell<Vec<PendingRejection>>,
    diagnostics: RefCell<Diagnostics>,

    /// The coroutine currently being polled, if any.
    context: CoroutineContext,

    /// Unfinished coroutines, so disposal can release their bodies.
    coroutines: RefCell<HashMap<CoroutineId, Weak<dyn Resume>>>,

    running: Cell<bool>,
    disposed: Cell<bool>,
}

/// Clears the `running` flag when a scheduler loop exits, even by `?`.
struct RunGuard<'a> {
    running: &'a Cell<bool>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.set(false);
    }
}

impl Scheduler {
    /// Creates a scheduler with the default configuration.
    ///
    /// Use [`RuntimeBuilder`](crate::RuntimeBuilder) to configure the start
    /// time, the microtask budget or unhandled-rejection reporting.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub(crate) fn with_config(config: Config) -> Self {
        let now = config.start_time;

        Self {
            core: Rc::new(Core {
                config,
                now: Cell::new(now),
                next_sequence: Cell::new(0),
                next_future_id: Cell::new(0),
                next_coroutine_id: Cell::new(0),
                microtasks: RefCell::new(VecDeque::new()),
                macrotasks: RefCell::new(BinaryHeap::new()),
                rejections: RefCell::new(Vec::new()),
                diagnostics: RefCell::new(Diagnostics::default()),
                context: CoroutineContext::new(),
                coroutines: RefCell::new(HashMap::new()),
                running: Cell::new(false),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> VirtualTime {
        self.core.now.get()
    }

    /// Creates a pending [`Deferred`] bound to this scheduler.
    pub fn deferred<T: Clone + 'static>(&self) -> Deferred<T> {
        Deferred::new(self)
    }

    /// Schedules `action` to run `delay` after the current virtual time.
    ///
    /// Items with the same fire time run in the order they were scheduled.
    /// A zero delay still waits for the current microtask drain to finish.
    pub fn schedule_at(&self, delay: Duration, action: impl FnOnce() + 'static) -> TimerHandle {
        let sequence = self.core.next_sequence.get();
        self.core.next_sequence.set(sequence + 1);

        let fire_time = self.now() + delay;
        let status = Rc::new(Cell::new(TimerStatus::Scheduled));

        let handle = TimerHandle {
            sequence,
            fire_time,
            status: status.clone(),
        };

        if self.core.disposed.get() {
            log::warn!("macrotask #{sequence} dropped: scheduler is disposed");
            status.set(TimerStatus::Cancelled);
            return handle;
        }

        log::trace!("macrotask #{sequence} scheduled for {fire_time}");

        self.core.macrotasks.borrow_mut().push(ScheduledItem {
            fire_time,
            sequence,
            action: Box::new(action),
            status,
        });

        handle
    }

    /// Appends `action` to the microtask queue.
    pub fn schedule_microtask(&self, action: impl FnOnce() + 'static) {
        if self.core.disposed.get() {
            log::warn!("microtask dropped: scheduler is disposed");
            return;
        }

        self.core.microtasks.borrow_mut().push_back(Box::new(action));
    }

    /// Cancels a macrotask that has not fired yet.
    ///
    /// Returns `true` if the task was removed, `false` if it had already
    /// fired or been cancelled, or if `handle` belongs to another scheduler.
    pub fn cancel(&self, handle: &TimerHandle) -> bool {
        if !handle.is_scheduled() {
            return false;
        }

        let removed = {
            let mut heap = self.core.macrotasks.borrow_mut();
            let mut kept = Vec::with_capacity(heap.len());
            let mut removed = None;

            for item in mem::take(&mut *heap) {
                if Rc::ptr_eq(&item.status, &handle.status) {
                    removed = Some(item);
                } else {
                    kept.push(item);
                }
            }

            *heap = BinaryHeap::from(kept);
            removed
        };

        let Some(removed) = removed else {
            log::debug!("macrotask #{} is not queued on this scheduler", handle.sequence);
            return false;
        };

        removed.status.set(TimerStatus::Cancelled);
        log::trace!("macrotask #{} cancelled", handle.sequence);

        // The action may own futures; drop it once the queue is released.
        drop(removed);
        true
    }

    /// Runs queued work until both queues are empty.
    ///
    /// Each iteration drains the microtask queue to exhaustion (including
    /// microtasks enqueued while draining), then pops the earliest
    /// macrotask, moves the clock to its fire time and runs it.
    ///
    /// Once idle, rejections that never got a subscriber are reported.
    ///
    /// # Errors
    ///
    /// - [`Error::Reentrant`] if called from inside a running task,
    /// - [`Error::Disposed`] after [`dispose`](Self::dispose),
    /// - [`Error::MicrotaskBudgetExceeded`] if a drain exceeds the
    ///   configured budget.
    pub fn run_until_idle(&self) -> Result<()> {
        let _guard = self.enter_loop()?;

        loop {
            self.drain_microtasks()?;

            match self.pop_due(None) {
                Some(item) => self.fire(item),
                None => break,
            }
        }

        self.report_unhandled_rejections();
        Ok(())
    }

    /// Runs every macrotask due at or before `deadline`, then moves the
    /// clock to `deadline`.
    ///
    /// Unlike [`run_until_idle`](Self::run_until_idle) this does not report
    /// unhandled rejections: work may still be pending, so they wait for
    /// the next idle point. Rejections that got handled meanwhile are
    /// forgotten here.
    pub fn advance_to(&self, deadline: VirtualTime) -> Result<()> {
        let _guard = self.enter_loop()?;

        loop {
            self.drain_microtasks()?;

            match self.pop_due(Some(deadline)) {
                Some(item) => self.fire(item),
                None => break,
            }
        }

        if deadline > self.now() {
            self.core.now.set(deadline);
        }

        self.prune_handled_rejections();
        Ok(())
    }

    /// Shorthand for `advance_to(now + delay)`.
    pub fn advance_by(&self, delay: Duration) -> Result<()> {
        self.advance_to(self.now() + delay)
    }

    /// Number of queued microtasks.
    pub fn pending_microtasks(&self) -> usize {
        self.core.microtasks.borrow().len()
    }

    /// Number of macrotasks that have neither fired nor been cancelled.
    pub fn pending_macrotasks(&self) -> usize {
        self.core.macrotasks.borrow().len()
    }

    /// `true` when both queues are empty.
    pub fn is_idle(&self) -> bool {
        self.pending_microtasks() == 0 && self.pending_macrotasks() == 0
    }

    /// `true` once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.core.disposed.get()
    }

    /// Snapshot of the scheduler's diagnostics.
    pub fn diagnostics(&self) -> Diagnostics {
        self.core.diagnostics.borrow().clone()
    }

    /// Removes and returns the unhandled rejections reported so far.
    pub fn take_unhandled_rejections(&self) -> Vec<UnhandledRejection> {
        mem::take(&mut self.core.diagnostics.borrow_mut().unhandled_rejections)
    }

    /// Drops all queued work and stops the scheduler.
    ///
    /// Pending timers are marked cancelled and unfinished coroutines are
    /// abandoned: their bodies are dropped and their completions reject
    /// with [`Error::Disposed`]. Later scheduling calls are ignored and the
    /// run loops return [`Error::Disposed`].
    pub fn dispose(&self) {
        if self.core.disposed.replace(true) {
            return;
        }

        let microtasks = mem::take(&mut *self.core.microtasks.borrow_mut());
        let macrotasks = mem::take(&mut *self.core.macrotasks.borrow_mut());
        let rejections = mem::take(&mut *self.core.rejections.borrow_mut());
        let coroutines = mem::take(&mut *self.core.coroutines.borrow_mut());

        log::debug!(
            "scheduler disposed with {} microtasks and {} macrotasks pending",
            microtasks.len(),
            macrotasks.len()
        );

        for item in &macrotasks {
            item.status.set(TimerStatus::Cancelled);
        }

        // Queued closures may own futures holding this scheduler; release
        // them only after every borrow above has ended.
        drop(microtasks);
        drop(macrotasks);
        drop(rejections);

        // A suspended body may own the very futures its coroutine waits on.
        for coroutine in coroutines.into_values().filter_map(|weak| weak.upgrade()) {
            coroutine.abandon();
        }
    }

    /// Returns `true` if both handles refer to the same scheduler.
    pub fn ptr_eq(&self, other: &Scheduler) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    pub(crate) fn next_future_id(&self) -> FutureId {
        let id = self.core.next_future_id.get();
        self.core.next_future_id.set(id + 1);
        FutureId(id)
    }

    pub(crate) fn next_coroutine_id(&self) -> CoroutineId {
        let id = self.core.next_coroutine_id.get();
        self.core.next_coroutine_id.set(id + 1);
        CoroutineId(id)
    }

    pub(crate) fn record_settlement_conflict(&self, future: FutureId) {
        log::debug!("future {future} is already resolved; settlement ignored");
        self.core.diagnostics.borrow_mut().settlement_conflicts += 1;
    }

    /// Remembers a rejection so it can be reported at idle time if nothing
    /// subscribes to it first.
    pub(crate) fn track_rejection(&self, future: FutureId, error: Error, handled: Rc<Cell<bool>>) {
        if !self.core.config.report_unhandled_rejections || self.core.disposed.get() {
            return;
        }

        self.core.rejections.borrow_mut().push(PendingRejection {
            future,
            error,
            handled,
        });
    }

    pub(crate) fn register_coroutine(&self, id: CoroutineId, coroutine: Weak<dyn Resume>) {
        if self.core.disposed.get() {
            return;
        }

        self.core.coroutines.borrow_mut().insert(id, coroutine);
    }

    pub(crate) fn unregister_coroutine(&self, id: CoroutineId) {
        self.core.coroutines.borrow_mut().remove(&id);
    }

    pub(crate) fn context(&self) -> &CoroutineContext {
        &self.core.context
    }

    /// The coroutine currently being polled on this scheduler.
    pub(crate) fn current_coroutine(&self) -> Option<Rc<dyn Resume>> {
        self.core.context.current()
    }

    fn enter_loop(&self) -> Result<RunGuard<'_>> {
        if self.core.disposed.get() {
            return Err(Error::Disposed);
        }

        if self.core.running.replace(true) {
            return Err(Error::Reentrant);
        }

        Ok(RunGuard {
            running: &self.core.running,
        })
    }

    fn drain_microtasks(&self) -> Result<()> {
        let mut ran = 0usize;

        loop {
            let next = self.core.microtasks.borrow_mut().pop_front();
            let Some(task) = next else {
                return Ok(());
            };

            if let Some(budget) = self.core.config.microtask_budget {
                if ran >= budget {
                    self.core.microtasks.borrow_mut().push_front(task);
                    log::warn!("microtask budget of {budget} exhausted");
                    return Err(Error::MicrotaskBudgetExceeded(budget));
                }
            }

            ran += 1;
            self.core.diagnostics.borrow_mut().microtasks_run += 1;

            task();
        }
    }

    /// Pops the earliest macrotask, optionally only if it is due by `limit`.
    fn pop_due(&self, limit: Option<VirtualTime>) -> Option<ScheduledItem> {
        let mut heap = self.core.macrotasks.borrow_mut();

        match (heap.peek(), limit) {
            (None, _) => None,
            (Some(top), Some(limit)) if top.fire_time > limit => None,
            _ => heap.pop(),
        }
    }

    fn fire(&self, item: ScheduledItem) {
        if item.status.get() == TimerStatus::Cancelled {
            return;
        }

        if item.fire_time > self.now() {
            self.core.now.set(item.fire_time);
        }

        item.status.set(TimerStatus::Fired);
        self.core.diagnostics.borrow_mut().macrotasks_run += 1;

        log::trace!("macrotask #{} fired at {}", item.sequence, self.now());

        (item.action)();
    }

    fn prune_handled_rejections(&self) {
        self.core
            .rejections
            .borrow_mut()
            .retain(|rejection| !rejection.handled.get());
    }

    fn report_unhandled_rejections(&self) {
        let pending = mem::take(&mut *self.core.rejections.borrow_mut());

        for rejection in pending {
            if let Some(report) = rejection.into_report() {
                log::warn!(
                    "unhandled rejection of future {}: {}",
                    report.future,
                    report.error
                );

                self.core
                    .diagnostics
                    .borrow_mut()
                    .unhandled_rejections
                    .push(report);
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now())
            .field("microtasks", &self.pending_microtasks())
            .field("macrotasks", &self.pending_macrotasks())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::builder::RuntimeBuilder;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let push = move |label: &str| -> Box<dyn FnOnce()> {
            let sink = sink.clone();
            let label = label.to_string();
            Box::new(move || sink.borrow_mut().push(label))
        };
        (log, push)
    }

    #[test]
    fn delayed_actions_fire_in_time_order() {
        let scheduler = Scheduler::new();
        let (log, push) = recorder();

        scheduler.schedule_at(Duration::from_millis(100), push("100"));
        scheduler.schedule_at(Duration::from_millis(0), push("0"));
        scheduler.schedule_at(Duration::from_millis(50), push("50"));

        scheduler.run_until_idle().unwrap();

        assert_eq!(*log.borrow(), ["0", "50", "100"]);
        assert_eq!(scheduler.now(), VirtualTime::from_millis(100));
    }

    #[test]
    fn microtasks_preempt_zero_delay_macrotasks() {
        let scheduler = Scheduler::new();
        let (log, push) = recorder();

        scheduler.schedule_at(Duration::ZERO, push("timer"));

        let s = scheduler.clone();
        let nested = push("microtask 2");
        let first = push("microtask 1");
        scheduler.schedule_microtask(move || {
            first();
            s.schedule_microtask(nested);
        });

        scheduler.run_until_idle().unwrap();

        assert_eq!(*log.borrow(), ["microtask 1", "microtask 2", "timer"]);
    }

    #[test]
    fn cancel_removes_pending_items_only() {
        let scheduler = Scheduler::new();
        let (log, push) = recorder();

        let keep = scheduler.schedule_at(Duration::from_millis(10), push("kept"));
        let drop = scheduler.schedule_at(Duration::from_millis(20), push("dropped"));

        assert!(scheduler.cancel(&drop));
        assert!(!scheduler.cancel(&drop));
        assert_eq!(scheduler.pending_macrotasks(), 1);

        scheduler.run_until_idle().unwrap();

        assert!(!scheduler.cancel(&keep));
        assert_eq!(keep.status(), TimerStatus::Fired);
        assert_eq!(drop.status(), TimerStatus::Cancelled);
        assert_eq!(*log.borrow(), ["kept"]);
        assert_eq!(scheduler.now(), VirtualTime::from_millis(10));
    }

    #[test]
    fn reentrant_run_is_rejected() {
        let scheduler = Scheduler::new();
        let seen = Rc::new(RefCell::new(None));

        let s = scheduler.clone();
        let out = seen.clone();
        scheduler.schedule_microtask(move || {
            *out.borrow_mut() = Some(s.run_until_idle());
        });

        scheduler.run_until_idle().unwrap();

        assert_eq!(*seen.borrow(), Some(Err(Error::Reentrant)));
    }

    #[test]
    fn microtask_budget_stops_runaway_chains() {
        let scheduler = RuntimeBuilder::new().microtask_budget(8).build_scheduler();

        fn forever(s: Scheduler) {
            let next = s.clone();
            s.schedule_microtask(move || forever(next));
        }
        forever(scheduler.clone());

        assert_eq!(
            scheduler.run_until_idle(),
            Err(Error::MicrotaskBudgetExceeded(8))
        );
        assert_eq!(scheduler.pending_microtasks(), 1);
    }

    #[test]
    fn advance_to_stops_at_deadline() {
        let scheduler = Scheduler::new();
        let (log, push) = recorder();

        scheduler.schedule_at(Duration::from_millis(30), push("early"));
        scheduler.schedule_at(Duration::from_millis(90), push("late"));

        scheduler.advance_to(VirtualTime::from_millis(50)).unwrap();
        assert_eq!(*log.borrow(), ["early"]);
        assert_eq!(scheduler.now(), VirtualTime::from_millis(50));

        scheduler.advance_by(Duration::from_millis(40)).unwrap();
        assert_eq!(*log.borrow(), ["early", "late"]);
    }

    #[test]
    fn advancing_forgets_handled_rejections() {
        let scheduler = Scheduler::new();

        let handled: Deferred<i32> = scheduler.deferred();
        let orphan: Deferred<i32> = scheduler.deferred();
        handled.reject("caught");
        orphan.reject("lost");
        handled.catch(|_| Ok::<_, Error>(0));

        scheduler.advance_by(Duration::from_millis(5)).unwrap();
        assert_eq!(scheduler.core.rejections.borrow().len(), 1);

        scheduler.run_until_idle().unwrap();

        let reports = scheduler.take_unhandled_rejections();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].future, orphan.id());
        assert!(scheduler.core.rejections.borrow().is_empty());
    }

    #[test]
    fn disposed_scheduler_drops_work() {
        let scheduler = Scheduler::new();
        let (log, push) = recorder();

        let timer = scheduler.schedule_at(Duration::from_millis(5), push("never"));
        scheduler.dispose();

        scheduler.schedule_microtask(push("ignored"));

        assert_eq!(timer.status(), TimerStatus::Cancelled);
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.run_until_idle(), Err(Error::Disposed));
        assert!(log.borrow().is_empty());
    }
}
