//! Method handlers.
//!
//! A handler is the terminal point of a dispatch: the endpoint where the
//! matched route does its work. Its return value is adopted as the response
//! body, unless the response was finished or a raw body override was
//! installed along the way.

use crate::error::BoxError;
use crate::request::Request;
use crate::response::{Body, Response};
use std::{future::Future, pin::Pin};

/// The terminal endpoint of a matched route.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Handler`",
    label = "missing `Handler` implementation",
    note = "Handlers must implement `call`, or be wrapped in `HandlerFn`."
)]
pub trait Handler: Send + Sync + 'static {
    /// Handle the request, producing a body value.
    fn call(
        &self,
        req: &mut Request,
        res: &mut Response,
    ) -> impl Future<Output = Result<Body, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Handler`].
pub trait DynHandler: Send + Sync + 'static {
    /// Handle the request (dynamic dispatch version).
    fn call_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Pin<Box<dyn Future<Output = Result<Body, BoxError>> + Send + 'a>>;
}

// Blanket implementation: any Handler is a DynHandler.
impl<T: Handler> DynHandler for T {
    fn call_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Pin<Box<dyn Future<Output = Result<Body, BoxError>> + Send + 'a>> {
        Box::pin(self.call(req, res))
    }
}

/// Adapter turning a plain synchronous closure into a [`Handler`].
///
/// ```rust,ignore
/// let hello = HandlerFn::new(|_req: &mut Request, _res: &mut Response| {
///     Ok("hello".into())
/// });
/// ```
pub struct HandlerFn<F>(F);

impl<F> HandlerFn<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<Body, BoxError> + Send + Sync + 'static,
{
    /// Wrap a closure as a handler.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<Body, BoxError> + Send + Sync + 'static,
{
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<Body, BoxError> {
        (self.0)(req, res)
    }
}
