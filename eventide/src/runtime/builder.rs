use super::Runtime;
use crate::scheduler::{Scheduler, VirtualTime};

/// Settings consumed by a [`Scheduler`].
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Virtual time the clock starts at.
    pub(crate) start_time: VirtualTime,

    /// Maximum number of microtasks a single drain may run.
    pub(crate) microtask_budget: Option<usize>,

    /// Whether rejections nobody subscribed to are reported at idle time.
    pub(crate) report_unhandled_rejections: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_time: VirtualTime::ZERO,
            microtask_budget: None,
            report_unhandled_rejections: true,
        }
    }
}

/// Builder for configuring and creating a runtime.
///
/// `RuntimeBuilder` allows customizing the scheduler before constructing
/// the runtime.
///
/// # Examples
///
/// ```rust
/// use eventide::{RuntimeBuilder, VirtualTime};
///
/// let runtime = RuntimeBuilder::new()
///     .start_time(VirtualTime::from_millis(1_000))
///     .microtask_budget(10_000)
///     .build();
///
/// assert_eq!(runtime.scheduler().now(), VirtualTime::from_millis(1_000));
/// ```
pub struct RuntimeBuilder {
    config: Config,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    ///
    /// By default the clock starts at zero, microtask drains are unbounded
    /// and unhandled rejections are reported.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Sets the virtual time the clock starts at.
    pub fn start_time(mut self, start: VirtualTime) -> Self {
        self.config.start_time = start;
        self
    }

    /// Caps the number of microtasks a single drain may run.
    ///
    /// A drain that exceeds the budget makes the run loop return
    /// [`Error::MicrotaskBudgetExceeded`](crate::Error::MicrotaskBudgetExceeded)
    /// instead of spinning forever on a self-rescheduling chain.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn microtask_budget(mut self, n: usize) -> Self {
        assert!(n > 0, "microtask_budget must be > 0");

        self.config.microtask_budget = Some(n);
        self
    }

    /// Enables or disables unhandled-rejection reporting.
    pub fn report_unhandled_rejections(mut self, enabled: bool) -> Self {
        self.config.report_unhandled_rejections = enabled;
        self
    }

    /// Builds a bare scheduler with the configured options.
    pub fn build_scheduler(self) -> Scheduler {
        Scheduler::with_config(self.config)
    }

    /// Builds the runtime with the configured options.
    pub fn build(self) -> Runtime {
        Runtime::new(self.build_scheduler())
    }
}

impl Default for RuntimeBuilder {
    /// Creates a default `RuntimeBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
