use crate::error::Error;

/// Observable state of a [`Deferred`](crate::Deferred).
///
/// A future that is adopting another one reports `Pending` until the
/// adopted future settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State<T> {
    Pending,
    Fulfilled(T),
    Rejected(Error),
}

impl<T> State<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, State::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, State::Rejected(_))
    }

    /// Converts a settled state into its outcome, `None` while pending.
    pub fn into_result(self) -> Option<Result<T, Error>> {
        match self {
            State::Pending => None,
            State::Fulfilled(value) => Some(Ok(value)),
            State::Rejected(error) => Some(Err(error)),
        }
    }
}

impl<T> From<Result<T, Error>> for State<T> {
    fn from(outcome: Result<T, Error>) -> Self {
        match outcome {
            Ok(value) => State::Fulfilled(value),
            Err(error) => State::Rejected(error),
        }
    }
}
