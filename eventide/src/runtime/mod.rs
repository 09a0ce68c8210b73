//! Core runtime components.
//!
//! This module contains the coroutine driver and the [`Runtime`] wrapper
//! that owns a scheduler and offers a synchronous entry point.
//!
//! It is responsible for:
//! - stepping coroutines against deferred values,
//! - tracking which coroutine a scheduler is currently polling,
//! - enabling cooperative yielding.

mod core;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod yield_now;

pub mod coroutine;

pub use self::core::Runtime;
