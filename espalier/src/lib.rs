//! # espalier — route-tree request dispatch
//!
//! `espalier` builds an immutable tree of route nodes from a declarative
//! nesting of path segments, matches incoming paths against it, and runs a
//! layered around pipeline — before-hooks, handler, after-hooks, rescue
//! entries — scoped to the matched path's ancestry.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use espalier::prelude::*;
//!
//! let app = App::builder()
//!     .route("hello", |r| {
//!         r.get(HandlerFn::new(|_req, _res| Ok("hello".into())));
//!         r.route("world", |r| {
//!             r.get(HandlerFn::new(|_req, _res| Ok("hello world".into())));
//!         });
//!     })
//!     .build();
//!
//! let res = app.dispatch(Request::get("/hello/world")).await?;
//! assert_eq!(res.status(), 200);
//! ```
//!
//! Trees are built once and never mutate; dispatches share them freely
//! across threads. The server binding — turning a wire request into a
//! [`Request`] and a [`Response`] back into wire bytes via
//! `Response::into_parts` — is the adapter's job, not this crate's.

#![warn(missing_docs)]

pub use espalier_core::{
    // Attribute bag
    Attributes,
    // Response model
    Body,
    // Errors
    BoxError,
    DynError,
    // Handler
    DynHandler,
    DynHook,
    DynRescueHandler,
    Handler,
    HandlerFn,
    // Hooks
    Hook,
    HookFn,
    // Request model
    Request,
    // Rescue
    RescueEntry,
    RescueFn,
    RescueHandler,
    Response,
    UnhandledError,
};

mod app;
mod pipeline;
pub mod routing;
pub mod testing;

pub use app::App;
pub use routing::{AppBuilder, NodeBuilder};

/// Prelude module - common imports for Espalier.
///
/// # Usage
///
/// ```rust,ignore
/// use espalier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        App, AppBuilder, Attributes, Body, BoxError, DynError, Handler, HandlerFn, Hook, HookFn,
        NodeBuilder, Request, RescueFn, RescueHandler, Response, UnhandledError,
    };
}
