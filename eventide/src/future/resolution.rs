use super::Deferred;
use crate::error::Error;

/// How a pending future should be settled.
///
/// Handlers passed to [`Deferred::subscribe`] return anything that converts
/// into a `Resolution`: a plain `Result` fulfills or rejects the
/// continuation, while a `Deferred` makes the continuation adopt it.
pub enum Resolution<T> {
    /// Fulfill with a value.
    Fulfill(T),
    /// Reject with an error.
    Reject(Error),
    /// Follow another future and settle with its outcome.
    Adopt(Deferred<T>),
}

/// Conversion into a [`Resolution`].
///
/// Implemented for `Result<T, Error>`, `Deferred<T>` and `Resolution<T>`
/// itself.
pub trait Resolve<T> {
    fn into_resolution(self) -> Resolution<T>;
}

impl<T> Resolve<T> for Resolution<T> {
    fn into_resolution(self) -> Resolution<T> {
        self
    }
}

impl<T> Resolve<T> for Result<T, Error> {
    fn into_resolution(self) -> Resolution<T> {
        match self {
            Ok(value) => Resolution::Fulfill(value),
            Err(error) => Resolution::Reject(error),
        }
    }
}

impl<T> Resolve<T> for Deferred<T> {
    fn into_resolution(self) -> Resolution<T> {
        Resolution::Adopt(self)
    }
}
