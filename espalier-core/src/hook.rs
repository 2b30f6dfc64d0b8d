//! Before/after hooks.
//!
//! A hook is a unit of pre- or post-processing scoped to a route node and
//! everything below it. The same trait serves both phases; whether a hook is
//! a before-hook or an after-hook is decided by where the builder registers
//! it, and the executor orders them accordingly (before: outermost first,
//! after: innermost first).
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Hook`] uses native `async fn` for zero-cost static dispatch. The route
//! tree stores hooks behind [`DynHook`], the object-safe mirror; every
//! `Hook` is a `DynHook` via the blanket impl.

use crate::error::BoxError;
use crate::request::Request;
use crate::response::Response;
use std::{future::Future, pin::Pin};

/// A before- or after-hook in the around pipeline.
///
/// Hooks receive the request and the response being assembled. Returning
/// `Err` hands control to rescue resolution; calling `Response::finish`
/// vetoes the rest of the inbound pipeline without being an error.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Hook`",
    label = "missing `Hook` implementation",
    note = "Hooks must implement `run`, or be wrapped in `HookFn`."
)]
pub trait Hook: Send + Sync + 'static {
    /// Run the hook against the current request/response pair.
    fn run(
        &self,
        req: &mut Request,
        res: &mut Response,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`Hook`].
pub trait DynHook: Send + Sync + 'static {
    /// Run the hook (dynamic dispatch version).
    fn run_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

// Blanket implementation: any Hook is a DynHook.
impl<T: Hook> DynHook for T {
    fn run_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.run(req, res))
    }
}

/// Adapter turning a plain synchronous closure into a [`Hook`].
///
/// ```rust,ignore
/// let auth = HookFn::new(|req: &mut Request, res: &mut Response| {
///     if req.header("authorization").is_none() {
///         res.set_status(401);
///         res.finish();
///     }
///     Ok(())
/// });
/// ```
pub struct HookFn<F>(F);

impl<F> HookFn<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<(), BoxError> + Send + Sync + 'static,
{
    /// Wrap a closure as a hook.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Hook for HookFn<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn run(&self, req: &mut Request, res: &mut Response) -> Result<(), BoxError> {
        (self.0)(req, res)
    }
}
