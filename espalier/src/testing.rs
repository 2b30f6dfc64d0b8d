//! Testing utilities for Espalier.
//!
//! This module provides utilities to make testing hook ordering and rescue
//! behavior easier.
//!
//! - [`Probe`]: a shared recorder producing labeled hooks and handlers
//! - Sample error types for exercising rescue entries

use espalier_core::{Body, BoxError, Handler, HandlerFn, Hook, HookFn, Request, Response};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// A shared recorder of pipeline events.
///
/// Hooks and handlers minted from one probe append labels to a common log,
/// so a test can assert the exact execution order across an entire
/// dispatch.
///
/// # Example
///
/// ```rust,ignore
/// let probe = Probe::new();
/// let app = App::builder()
///     .before(probe.hook("root"))
///     .route("a", |r| {
///         r.before(probe.hook("a"));
///         r.get(probe.handler("handler", "leaf"));
///     })
///     .build();
///
/// app.dispatch(Request::get("/a")).await?;
/// assert_eq!(probe.log(), ["root", "a", "handler"]);
/// ```
#[derive(Clone, Default)]
pub struct Probe {
    log: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    /// Create a new probe with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the recorded labels, in execution order.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Append a label directly.
    pub fn record(&self, label: impl Into<String>) {
        self.log.lock().unwrap().push(label.into());
    }

    /// Clear the log.
    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    /// A hook that records its label and continues.
    pub fn hook(&self, label: &str) -> impl Hook {
        let log = self.log.clone();
        let label = label.to_string();
        HookFn::new(move |_req: &mut Request, _res: &mut Response| {
            log.lock().unwrap().push(label.clone());
            Ok(())
        })
    }

    /// A hook that records its label, then marks the response finished.
    pub fn finishing_hook(&self, label: &str) -> impl Hook {
        let log = self.log.clone();
        let label = label.to_string();
        HookFn::new(move |_req: &mut Request, res: &mut Response| {
            log.lock().unwrap().push(label.clone());
            res.finish();
            Ok(())
        })
    }

    /// A hook that records its label, then fails with `error()`.
    pub fn failing_hook<E, F>(&self, label: &str, error: F) -> impl Hook
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        let log = self.log.clone();
        let label = label.to_string();
        HookFn::new(move |_req: &mut Request, _res: &mut Response| {
            log.lock().unwrap().push(label.clone());
            Err(Box::new(error()) as BoxError)
        })
    }

    /// A handler that records its label and returns `body`.
    pub fn handler(&self, label: &str, body: &str) -> impl Handler {
        let log = self.log.clone();
        let label = label.to_string();
        let body = body.to_string();
        HandlerFn::new(move |_req: &mut Request, _res: &mut Response| {
            log.lock().unwrap().push(label.clone());
            Ok(Body::Text(body.clone()))
        })
    }

    /// A handler that records its label, then fails with `error()`.
    pub fn failing_handler<E, F>(&self, label: &str, error: F) -> impl Handler
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        let log = self.log.clone();
        let label = label.to_string();
        HandlerFn::new(move |_req: &mut Request, _res: &mut Response| {
            log.lock().unwrap().push(label.clone());
            Err(Box::new(error()) as BoxError)
        })
    }
}

/// Sample error for rescue tests: a failed validation.
#[derive(Debug, Error)]
#[error("validation failed")]
pub struct ValidationFailed;

/// Sample error for rescue tests: an unavailable upstream.
#[derive(Debug, Error)]
#[error("upstream unavailable")]
pub struct UpstreamUnavailable;

/// Sample error for rescue tests, carrying a detail message.
#[derive(Debug, Error)]
#[error("storage offline: {0}")]
pub struct StorageOffline(pub &'static str);
