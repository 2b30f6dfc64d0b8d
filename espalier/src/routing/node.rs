//! Immutable route nodes.
//!
//! A [`RouteNode`] is one level of the path tree: literal children, at most
//! one wildcard (capturing) child, a per-method handler table, and the
//! before/after/rescue lists scoped to this node alone. Ancestry is not
//! merged into the node; the executor walks the explicit parent chain the
//! matcher produces.
//!
//! Mount grafts are the second node form: they carry the mounted app's own
//! top-level hooks and wrap the subtree node they were grafted onto,
//! delegating matching and handler lookup to it. A graft contributes its own
//! level to the matched chain, one position out from the wrapped node, so
//! the executor bounds finishing and rescue resolution at a mount boundary
//! exactly as it would at an inline ancestor.

use espalier_core::{DynError, DynHandler, DynHook, RescueEntry};
use std::collections::HashMap;
use std::sync::Arc;

/// A node in the route tree. Immutable once built; safe for unsynchronized
/// concurrent reads across dispatches.
pub(crate) struct RouteNode {
    kind: NodeKind,
}

enum NodeKind {
    Route {
        /// Identifier; for wildcard nodes this is the capture key.
        name: Option<String>,
        children: HashMap<String, Arc<RouteNode>>,
        wildcard: Option<Arc<RouteNode>>,
        handlers: HashMap<String, Arc<dyn DynHandler>>,
        any_handler: Option<Arc<dyn DynHandler>>,
        befores: Vec<Arc<dyn DynHook>>,
        afters: Vec<Arc<dyn DynHook>>,
        rescuers: Vec<RescueEntry>,
    },
    Graft {
        befores: Vec<Arc<dyn DynHook>>,
        afters: Vec<Arc<dyn DynHook>>,
        rescuers: Vec<RescueEntry>,
        inner: Arc<RouteNode>,
    },
}

impl RouteNode {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn route(
        name: Option<String>,
        children: HashMap<String, Arc<RouteNode>>,
        wildcard: Option<Arc<RouteNode>>,
        handlers: HashMap<String, Arc<dyn DynHandler>>,
        any_handler: Option<Arc<dyn DynHandler>>,
        befores: Vec<Arc<dyn DynHook>>,
        afters: Vec<Arc<dyn DynHook>>,
        rescuers: Vec<RescueEntry>,
    ) -> Self {
        Self {
            kind: NodeKind::Route {
                name,
                children,
                wildcard,
                handlers,
                any_handler,
                befores,
                afters,
                rescuers,
            },
        }
    }

    pub(crate) fn graft(
        befores: Vec<Arc<dyn DynHook>>,
        afters: Vec<Arc<dyn DynHook>>,
        rescuers: Vec<RescueEntry>,
        inner: Arc<RouteNode>,
    ) -> Self {
        Self {
            kind: NodeKind::Graft {
                befores,
                afters,
                rescuers,
                inner,
            },
        }
    }

    /// The capture key recorded when this node matches a wildcard segment.
    pub(crate) fn capture_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Route { name, .. } => name.as_deref(),
            NodeKind::Graft { inner, .. } => inner.capture_name(),
        }
    }

    /// Literal child lookup, by exact string equality.
    pub(crate) fn child(&self, segment: &str) -> Option<&Arc<RouteNode>> {
        match &self.kind {
            NodeKind::Route { children, .. } => children.get(segment),
            NodeKind::Graft { inner, .. } => inner.child(segment),
        }
    }

    /// The wildcard child, tried only when no literal child matched.
    pub(crate) fn wildcard(&self) -> Option<&Arc<RouteNode>> {
        match &self.kind {
            NodeKind::Route { wildcard, .. } => wildcard.as_ref(),
            NodeKind::Graft { inner, .. } => inner.wildcard(),
        }
    }

    /// All literal children; used when grafting this node's subtree into a
    /// mounting parent.
    pub(crate) fn children(&self) -> &HashMap<String, Arc<RouteNode>> {
        match &self.kind {
            NodeKind::Route { children, .. } => children,
            NodeKind::Graft { inner, .. } => inner.children(),
        }
    }

    /// Resolve the handler for a method: exact entry first, then the GET
    /// entry for HEAD requests, then the `any` default.
    pub(crate) fn handler_for(&self, method: &str) -> Option<Arc<dyn DynHandler>> {
        match &self.kind {
            NodeKind::Route {
                handlers,
                any_handler,
                ..
            } => handlers
                .get(method)
                .or_else(|| (method == "HEAD").then(|| handlers.get("GET")).flatten())
                .or(any_handler.as_ref())
                .cloned(),
            NodeKind::Graft { inner, .. } => inner.handler_for(method),
        }
    }

    /// This level's before-hooks in execution order. A graft's are the
    /// mounted app's top-level hooks; the wrapped node runs its own at its
    /// own chain level.
    pub(crate) fn befores(&self) -> &[Arc<dyn DynHook>] {
        match &self.kind {
            NodeKind::Route { befores, .. } | NodeKind::Graft { befores, .. } => befores,
        }
    }

    /// This level's after-hooks in execution order; the mirror of
    /// [`befores`](RouteNode::befores).
    pub(crate) fn afters(&self) -> &[Arc<dyn DynHook>] {
        match &self.kind {
            NodeKind::Route { afters, .. } | NodeKind::Graft { afters, .. } => afters,
        }
    }

    /// This level's rescue entries, in declaration order.
    pub(crate) fn rescuers(&self) -> &[RescueEntry] {
        match &self.kind {
            NodeKind::Route { rescuers, .. } | NodeKind::Graft { rescuers, .. } => rescuers,
        }
    }

    /// Find the rescue entry for an error at this level: entries are
    /// consulted in reverse declaration order, so the most recent wins.
    pub(crate) fn find_rescuer(&self, error: &DynError) -> Option<&RescueEntry> {
        self.rescuers().iter().rev().find(|e| e.matches(error))
    }

    /// The chain entries this node contributes when matched: each graft
    /// layer wrapping it, outermost first, ending with the wrapped route
    /// itself.
    pub(crate) fn layers(self: &Arc<Self>) -> Vec<Arc<RouteNode>> {
        match &self.kind {
            NodeKind::Route { .. } => vec![self.clone()],
            NodeKind::Graft { inner, .. } => {
                let mut layers = vec![self.clone()];
                layers.extend(inner.layers());
                layers
            }
        }
    }

    /// Whether this node carries any hooks at all; mounts of hook-free apps
    /// skip the graft wrapper entirely.
    pub(crate) fn has_hooks(&self) -> bool {
        match &self.kind {
            NodeKind::Route {
                befores,
                afters,
                rescuers,
                ..
            } => !befores.is_empty() || !afters.is_empty() || !rescuers.is_empty(),
            NodeKind::Graft { .. } => true,
        }
    }
}
