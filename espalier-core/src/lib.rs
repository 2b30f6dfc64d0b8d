//! # espalier-core
//!
//! Core types and traits for the Espalier request router.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! server adapters and extensions that don't need the full `espalier` tree
//! and dispatch machinery. It defines:
//!
//! - the per-dispatch [`Request`] / [`Response`] pair and the [`Body`] value
//!   model with its wire defaulting rules,
//! - the shallow-copy [`Attributes`] bag seeded into every request,
//! - the pipeline vocabulary: [`Hook`] (before/after), [`Handler`]
//!   (terminal endpoint), and [`RescueHandler`] / [`RescueEntry`] (scoped
//!   error recovery), each with an object-safe `Dyn*` mirror and a
//!   closure adapter (`HookFn`, `HandlerFn`, `RescueFn`),
//! - the error currency: [`BoxError`] for application errors and
//!   [`UnhandledError`] for errors that escape a whole dispatch.
//!
//! The route tree, builder DSL, matcher, and pipeline executor live in the
//! `espalier` crate.

#![warn(missing_docs)]

mod attributes;
mod error;
mod handler;
mod hook;
mod request;
mod rescue;
mod response;

pub use attributes::Attributes;
pub use error::{BoxError, UnhandledError};
pub use handler::{DynHandler, Handler, HandlerFn};
pub use hook::{DynHook, Hook, HookFn};
pub use request::Request;
pub use rescue::{DynError, DynRescueHandler, RescueEntry, RescueFn, RescueHandler};
pub use response::{Body, Response};
