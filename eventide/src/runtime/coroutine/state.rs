/// Lifecycle of a coroutine.
///
/// ```text
/// Created -> Running -> Suspended -> Running -> ... -> Completed | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroutineState {
    /// Spawned; the first step is queued as a microtask.
    Created,

    /// Being polled right now.
    Running,

    /// Parked on a deferred value.
    Suspended,

    /// The body returned `Ok`.
    Completed,

    /// The body returned `Err`, or suspended on something the runtime
    /// cannot resume.
    Failed,
}

impl CoroutineState {
    /// `true` once the coroutine has completed or failed.
    pub fn is_finished(self) -> bool {
        matches!(self, CoroutineState::Completed | CoroutineState::Failed)
    }
}
