//! Rescue entries: scoped error recovery.
//!
//! A rescue entry pairs an error-type predicate with a handler. When a hook
//! or handler fails, resolution scans the matched chain from the failure
//! site outward; within each node, entries are scanned in reverse
//! declaration order, so the most recently declared in-scope entry wins.
//!
//! Rust has no error subtyping, so the predicate is a concrete-type test:
//! an entry registered for `E` matches exactly the errors that downcast to
//! `E`.

use crate::error::BoxError;
use crate::request::Request;
use crate::response::Response;
use std::error::Error;
use std::sync::Arc;
use std::{future::Future, pin::Pin};

/// The dynamic error form rescue handlers receive.
pub type DynError = dyn Error + Send + Sync + 'static;

/// A handler invoked to recover from a matched error.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `RescueHandler`",
    label = "missing `RescueHandler` implementation",
    note = "Rescue handlers must implement `rescue`, or be wrapped in `RescueFn`."
)]
pub trait RescueHandler: Send + Sync + 'static {
    /// Recover from the error, typically by setting a status and body.
    ///
    /// Returning `Err` restarts resolution one ancestor further out with
    /// the new error.
    fn rescue(
        &self,
        error: &DynError,
        req: &mut Request,
        res: &mut Response,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`RescueHandler`].
pub trait DynRescueHandler: Send + Sync + 'static {
    /// Recover from the error (dynamic dispatch version).
    fn rescue_dyn<'a>(
        &'a self,
        error: &'a DynError,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

// Blanket implementation: any RescueHandler is a DynRescueHandler.
impl<T: RescueHandler> DynRescueHandler for T {
    fn rescue_dyn<'a>(
        &'a self,
        error: &'a DynError,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.rescue(error, req, res))
    }
}

/// Adapter turning a plain synchronous closure into a [`RescueHandler`].
pub struct RescueFn<F>(F);

impl<F> RescueFn<F>
where
    F: Fn(&DynError, &mut Request, &mut Response) -> Result<(), BoxError> + Send + Sync + 'static,
{
    /// Wrap a closure as a rescue handler.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> RescueHandler for RescueFn<F>
where
    F: Fn(&DynError, &mut Request, &mut Response) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn rescue(
        &self,
        error: &DynError,
        req: &mut Request,
        res: &mut Response,
    ) -> Result<(), BoxError> {
        (self.0)(error, req, res)
    }
}

/// An (error type, handler) pair owned by a route node.
#[derive(Clone)]
pub struct RescueEntry {
    predicate: fn(&DynError) -> bool,
    handler: Arc<dyn DynRescueHandler>,
}

impl RescueEntry {
    /// Create an entry matching errors of concrete type `E`.
    pub fn of<E>(handler: impl RescueHandler) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            predicate: matches_type::<E>,
            handler: Arc::new(handler),
        }
    }

    /// Whether this entry's declared type matches the error.
    pub fn matches(&self, error: &DynError) -> bool {
        (self.predicate)(error)
    }

    /// The recovery handler.
    pub fn handler(&self) -> &Arc<dyn DynRescueHandler> {
        &self.handler
    }
}

fn matches_type<E: Error + Send + Sync + 'static>(error: &DynError) -> bool {
    error.is::<E>()
}
