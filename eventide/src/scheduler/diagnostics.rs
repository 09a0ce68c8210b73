use crate::error::Error;
use crate::future::FutureId;

use std::cell::Cell;
use std::rc::Rc;

/// Counters and reports collected by a scheduler.
///
/// Obtained as a snapshot through
/// [`Scheduler::diagnostics`](crate::Scheduler::diagnostics). None of these
/// are errors; they exist so tests can observe behavior the runtime
/// otherwise absorbs silently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Settlement attempts on futures that were already settled or adopting.
    pub settlement_conflicts: u64,

    /// Microtasks executed so far.
    pub microtasks_run: u64,

    /// Macrotasks executed so far (cancelled ones are not counted).
    pub macrotasks_run: u64,

    /// Rejections reported at idle time because nothing ever subscribed.
    pub unhandled_rejections: Vec<UnhandledRejection>,
}

/// A future that was rejected without any subscriber by the time the
/// scheduler went idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledRejection {
    /// The rejected future.
    pub future: FutureId,

    /// Its rejection reason.
    pub error: Error,
}

/// A rejection waiting for the next idle point.
///
/// `handled` is shared with the future and flips as soon as anything
/// subscribes to it.
pub(crate) struct PendingRejection {
    pub(crate) future: FutureId,
    pub(crate) error: Error,
    pub(crate) handled: Rc<Cell<bool>>,
}

impl PendingRejection {
    /// Converts into a report if the rejection is still unhandled.
    pub(crate) fn into_report(self) -> Option<UnhandledRejection> {
        if self.handled.get() {
            return None;
        }

        Some(UnhandledRejection {
            future: self.future,
            error: self.error,
        })
    }
}
