//! The route tree builder DSL.
//!
//! An app is declared as a nesting of closures over [`NodeBuilder`]s:
//!
//! ```rust,ignore
//! let app = App::builder()
//!     .route("hello", |r| {
//!         r.get(HandlerFn::new(|_req, _res| Ok("hello".into())));
//!         r.route("world", |r| {
//!             r.get(HandlerFn::new(|_req, _res| Ok("hello world".into())));
//!         });
//!     })
//!     .build();
//! ```
//!
//! Declarations fold in order at [`build`](AppBuilder::build) time and
//! produce an immutable tree. Registration is last-write-wins throughout:
//! re-declaring a method handler, the wildcard child, or a colliding child
//! name (directly or through a mount) silently replaces the earlier
//! registration; nothing here errors.

use crate::app::App;
use crate::routing::node::RouteNode;
use espalier_core::{
    Attributes, DynHandler, DynHook, Handler, Hook, RescueEntry, RescueHandler,
};
use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

/// Builder for one route node and its subtree.
///
/// Obtained inside the closures passed to [`route`](NodeBuilder::route),
/// [`wildcard`](NodeBuilder::wildcard), and [`scope`](NodeBuilder::scope).
pub struct NodeBuilder {
    name: Option<String>,
    ops: Vec<ChildOp>,
    handlers: HashMap<String, Arc<dyn DynHandler>>,
    any_handler: Option<Arc<dyn DynHandler>>,
    befores: Vec<Arc<dyn DynHook>>,
    afters: Vec<Arc<dyn DynHook>>,
    rescuers: Vec<RescueEntry>,
}

/// A child declaration, kept in declaration order until realization.
enum ChildOp {
    Literal(String, NodeBuilder),
    Wildcard(NodeBuilder),
    Mount(Arc<RouteNode>),
}

impl NodeBuilder {
    fn named(name: Option<String>) -> Self {
        Self {
            name,
            ops: Vec::new(),
            handlers: HashMap::new(),
            any_handler: None,
            befores: Vec::new(),
            afters: Vec::new(),
            rescuers: Vec::new(),
        }
    }

    /// Declare a literal child route. A repeated name replaces the earlier
    /// declaration.
    pub fn route(&mut self, name: impl Into<String>, f: impl FnOnce(&mut NodeBuilder)) -> &mut Self {
        let name = name.into();
        let mut child = NodeBuilder::named(Some(name.clone()));
        f(&mut child);
        self.ops.push(ChildOp::Literal(name, child));
        self
    }

    /// Declare the wildcard child, capturing the matched segment under
    /// `capture`. A later wildcard declaration replaces this one.
    pub fn wildcard(
        &mut self,
        capture: impl Into<String>,
        f: impl FnOnce(&mut NodeBuilder),
    ) -> &mut Self {
        let mut child = NodeBuilder::named(Some(capture.into()));
        f(&mut child);
        self.ops.push(ChildOp::Wildcard(child));
        self
    }

    /// Graft a pre-built app's routes in at this level. Its top-level hooks
    /// wrap one layer outside its own routes' hooks, inside this node's.
    pub fn mount(&mut self, app: &App) -> &mut Self {
        self.ops.push(ChildOp::Mount(app.root().clone()));
        self
    }

    /// Give a group of sibling routes their own hooks without introducing a
    /// path segment: an anonymous child, immediately mounted.
    pub fn scope(&mut self, f: impl FnOnce(&mut NodeBuilder)) -> &mut Self {
        let mut child = NodeBuilder::named(None);
        f(&mut child);
        self.ops.push(ChildOp::Mount(Arc::new(child.build_node())));
        self
    }

    /// Register a before-hook, scoped to this node and its subtree.
    pub fn before(&mut self, hook: impl Hook) -> &mut Self {
        self.befores.push(Arc::new(hook));
        self
    }

    /// Register an after-hook, scoped to this node and its subtree.
    pub fn after(&mut self, hook: impl Hook) -> &mut Self {
        self.afters.push(Arc::new(hook));
        self
    }

    /// Register a rescue entry for errors of type `E` raised in this node's
    /// subtree. Within a node, later entries win.
    pub fn rescue_from<E>(&mut self, handler: impl RescueHandler) -> &mut Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.rescuers.push(RescueEntry::of::<E>(handler));
        self
    }

    /// Register the handler for a method. A repeated registration silently
    /// replaces the earlier one.
    pub fn handle(&mut self, method: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.handlers.insert(method.into(), Arc::new(handler));
        self
    }

    /// Register the default handler, used when no method entry matches.
    pub fn any(&mut self, handler: impl Handler) -> &mut Self {
        self.any_handler = Some(Arc::new(handler));
        self
    }

    /// Register a GET handler.
    pub fn get(&mut self, handler: impl Handler) -> &mut Self {
        self.handle("GET", handler)
    }

    /// Register a POST handler.
    pub fn post(&mut self, handler: impl Handler) -> &mut Self {
        self.handle("POST", handler)
    }

    /// Register a PUT handler.
    pub fn put(&mut self, handler: impl Handler) -> &mut Self {
        self.handle("PUT", handler)
    }

    /// Register a DELETE handler.
    pub fn delete(&mut self, handler: impl Handler) -> &mut Self {
        self.handle("DELETE", handler)
    }

    /// Register a PATCH handler.
    pub fn patch(&mut self, handler: impl Handler) -> &mut Self {
        self.handle("PATCH", handler)
    }

    /// Register a HEAD handler.
    pub fn head(&mut self, handler: impl Handler) -> &mut Self {
        self.handle("HEAD", handler)
    }

    /// Register an OPTIONS handler.
    pub fn options(&mut self, handler: impl Handler) -> &mut Self {
        self.handle("OPTIONS", handler)
    }

    /// Realize this builder into an immutable node, folding child
    /// declarations and mounts in declaration order.
    pub(crate) fn build_node(self) -> RouteNode {
        let mut children: HashMap<String, Arc<RouteNode>> = HashMap::new();
        let mut wildcard: Option<Arc<RouteNode>> = None;
        for op in self.ops {
            match op {
                ChildOp::Literal(name, child) => {
                    children.insert(name, Arc::new(child.build_node()));
                }
                ChildOp::Wildcard(child) => {
                    wildcard = Some(Arc::new(child.build_node()));
                }
                ChildOp::Mount(root) => {
                    for (name, child) in root.children() {
                        children.insert(name.clone(), graft_onto(&root, child));
                    }
                    if let Some(wc) = root.wildcard() {
                        wildcard = Some(graft_onto(&root, wc));
                    }
                }
            }
        }
        RouteNode::route(
            self.name,
            children,
            wildcard,
            self.handlers,
            self.any_handler,
            self.befores,
            self.afters,
            self.rescuers,
        )
    }
}

/// Wrap a mounted subtree node with the mounted root's own hooks. Hook-free
/// roots are shared as-is; the graft layer would be a no-op.
fn graft_onto(root: &Arc<RouteNode>, child: &Arc<RouteNode>) -> Arc<RouteNode> {
    if root.has_hooks() {
        Arc::new(RouteNode::graft(
            root.befores().to_vec(),
            root.afters().to_vec(),
            root.rescuers().to_vec(),
            child.clone(),
        ))
    } else {
        child.clone()
    }
}

/// Top-level builder producing an [`App`].
///
/// Mirrors [`NodeBuilder`] for the root node, adds the app's attribute
/// prototype, and chains by value so an app can be declared in one
/// expression.
pub struct AppBuilder {
    root: NodeBuilder,
    attributes: Attributes,
}

impl AppBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            root: NodeBuilder::named(None),
            attributes: Attributes::new(),
        }
    }

    /// Declare a literal child route under the root.
    pub fn route(mut self, name: impl Into<String>, f: impl FnOnce(&mut NodeBuilder)) -> Self {
        self.root.route(name, f);
        self
    }

    /// Declare the root's wildcard child.
    pub fn wildcard(mut self, capture: impl Into<String>, f: impl FnOnce(&mut NodeBuilder)) -> Self {
        self.root.wildcard(capture, f);
        self
    }

    /// Mount a pre-built app at the root.
    pub fn mount(mut self, app: &App) -> Self {
        self.root.mount(app);
        self
    }

    /// Group routes under root-level hooks without a path segment.
    pub fn scope(mut self, f: impl FnOnce(&mut NodeBuilder)) -> Self {
        self.root.scope(f);
        self
    }

    /// Register a root-level before-hook.
    pub fn before(mut self, hook: impl Hook) -> Self {
        self.root.before(hook);
        self
    }

    /// Register a root-level after-hook.
    pub fn after(mut self, hook: impl Hook) -> Self {
        self.root.after(hook);
        self
    }

    /// Register a root-level rescue entry for errors of type `E`.
    pub fn rescue_from<E>(mut self, handler: impl RescueHandler) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.root.rescue_from::<E>(handler);
        self
    }

    /// Register a handler for requests to the root path itself.
    pub fn handle(mut self, method: impl Into<String>, handler: impl Handler) -> Self {
        self.root.handle(method, handler);
        self
    }

    /// Register a GET handler for the root path.
    pub fn get(mut self, handler: impl Handler) -> Self {
        self.root.get(handler);
        self
    }

    /// Register the root's default handler.
    pub fn any(mut self, handler: impl Handler) -> Self {
        self.root.any(handler);
        self
    }

    /// Seed the attribute prototype copied into every request.
    pub fn attribute<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Realize the tree.
    pub fn build(self) -> App {
        App::from_parts(Arc::new(self.root.build_node()), self.attributes)
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
