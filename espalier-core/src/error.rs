//! Error types for Espalier.
//!
//! Hooks, handlers, and rescue handlers all speak [`BoxError`]; the only
//! typed error surface is [`UnhandledError`], returned by a dispatch when an
//! application error escaped every rescue entry in the matched chain.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An application error that no rescue entry in the matched chain handled.
///
/// The wrapper is transparent: `Display` and `source` forward to the inner
/// error, and [`into_inner`](UnhandledError::into_inner) recovers it intact,
/// so the hosting adapter decides final behavior (crash, 500, log).
#[derive(Error, Debug)]
#[error(transparent)]
pub struct UnhandledError(#[from] BoxError);

impl UnhandledError {
    /// Recover the original application error.
    pub fn into_inner(self) -> BoxError {
        self.0
    }

    /// Borrow the original application error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}
