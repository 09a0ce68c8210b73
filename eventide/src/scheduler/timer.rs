use super::clock::VirtualTime;

use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

/// A deferred unit of work.
pub(crate) type Action = Box<dyn FnOnce()>;

/// Lifecycle of a scheduled macrotask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Waiting in the macrotask queue.
    Scheduled,
    /// Popped and executed.
    Fired,
    /// Removed before it fired.
    Cancelled,
}

/// An entry in the macrotask queue.
///
/// `ScheduledItem` represents an action due at a specific virtual
/// time. It is stored inside a binary heap ordered by
/// `(fire_time, sequence)`.
pub(crate) struct ScheduledItem {
    /// The virtual time at which the action should run.
    pub(crate) fire_time: VirtualTime,

    /// Enqueue order, used to keep equal fire times FIFO.
    pub(crate) sequence: u64,

    /// The work itself.
    pub(crate) action: Action,

    /// Status shared with the [`TimerHandle`] returned to the caller.
    pub(crate) status: Rc<Cell<TimerStatus>>,
}

impl Eq for ScheduledItem {}

impl PartialEq for ScheduledItem {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.sequence == other.sequence
    }
}

impl Ord for ScheduledItem {
    /// Orders items by fire time, then by sequence number.
    ///
    /// The comparison is **reversed** so that a
    /// `BinaryHeap<ScheduledItem>` behaves as a min-heap,
    /// where the earliest item is popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for ScheduledItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Handle to a macrotask returned by
/// [`Scheduler::schedule_at`](crate::Scheduler::schedule_at).
///
/// The handle is only used to observe or cancel the task; dropping it
/// has no effect on the task.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    pub(crate) sequence: u64,
    pub(crate) fire_time: VirtualTime,
    pub(crate) status: Rc<Cell<TimerStatus>>,
}

impl TimerHandle {
    /// The virtual time at which the task is (or was) due.
    pub fn fire_time(&self) -> VirtualTime {
        self.fire_time
    }

    /// The task's enqueue sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Current status of the task.
    pub fn status(&self) -> TimerStatus {
        self.status.get()
    }

    /// `true` while the task has neither fired nor been cancelled.
    pub fn is_scheduled(&self) -> bool {
        self.status.get() == TimerStatus::Scheduled
    }
}
