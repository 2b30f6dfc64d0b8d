//! The dispatch entry point.

use crate::pipeline;
use crate::routing::matcher::{self, RouteMatch};
use crate::routing::node::RouteNode;
use crate::routing::AppBuilder;
use espalier_core::{Attributes, Request, Response, UnhandledError};
use std::sync::Arc;

/// An immutable, dispatchable route tree.
///
/// Built once via [`App::builder`]; afterwards the tree never mutates, so
/// one `App` (or a clone — clones share the tree) can serve any number of
/// concurrent dispatches. All per-request state lives on the
/// [`Request`]/[`Response`] pair a dispatch owns.
#[derive(Clone)]
pub struct App {
    root: Arc<RouteNode>,
    attributes: Attributes,
}

impl App {
    /// Start declaring an app.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub(crate) fn from_parts(root: Arc<RouteNode>, attributes: Attributes) -> Self {
        Self { root, attributes }
    }

    pub(crate) fn root(&self) -> &Arc<RouteNode> {
        &self.root
    }

    /// The attribute prototype copied into every request.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Dispatch one request through the tree.
    ///
    /// Produces 404 when the path does not resolve to a node and 405 when
    /// it does but the node has no handler for the method; neither runs any
    /// hooks. Otherwise the matched chain's around pipeline runs. The only
    /// error returned is an application error that no rescue entry in the
    /// chain handled; it carries the original error unmodified.
    pub async fn dispatch(&self, mut req: Request) -> Result<Response, UnhandledError> {
        let query: Vec<(String, String)> =
            url::form_urlencoded::parse(req.query_string().as_bytes())
                .into_owned()
                .collect();
        req.set_query(query);

        let RouteMatch { chain, captures } = matcher::match_path(&self.root, req.segments());
        let resolved: Option<Vec<Arc<RouteNode>>> = chain.into_iter().collect();

        let mut res = Response::new();
        match resolved {
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(method = req.method(), path = req.path(), "no route");
                res.set_status(404);
            }
            Some(chain) => match chain.last().and_then(|node| node.handler_for(req.method())) {
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        method = req.method(),
                        path = req.path(),
                        "no handler for method"
                    );
                    res.set_status(405);
                }
                Some(handler) => {
                    req.set_captures(captures);
                    req.seed_attributes(self.attributes.clone());
                    if let Err(err) = pipeline::run(&chain, &handler, &mut req, &mut res).await {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            method = req.method(),
                            path = req.path(),
                            error = %err,
                            "unhandled application error"
                        );
                        return Err(UnhandledError::from(err));
                    }
                }
            },
        }

        if discards_body(req.method(), res.status()) {
            res.no_body();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = req.method(),
            path = req.path(),
            status = res.status(),
            "dispatched"
        );

        Ok(res)
    }
}

/// Whether the transmitted body must be empty: HEAD requests, informational
/// statuses, and the fixed no-body statuses.
fn discards_body(method: &str, status: u16) -> bool {
    method == "HEAD" || status < 200 || matches!(status, 204 | 205 | 304)
}
