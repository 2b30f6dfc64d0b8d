//! Path matching.

use crate::routing::node::RouteNode;
use std::collections::HashMap;
use std::sync::Arc;

/// The result of walking the tree with a request path.
///
/// The chain is ordered root-first. Every graft layer wrapping a matched
/// node gets its own entry, one position out from the node it wraps, so the
/// executor treats a mount boundary like any other ancestry level. Entries
/// are padded with `None` past the point where matching failed. The final
/// entry is the matching route: `None` means no route (404); `Some` may
/// still lack a handler for the method (405).
pub(crate) struct RouteMatch {
    pub(crate) chain: Vec<Option<Arc<RouteNode>>>,
    pub(crate) captures: HashMap<String, String>,
}

/// Walk the tree from `root` along `segments`.
///
/// At every level a literal child strictly precedes the wildcard child; a
/// wildcard hop records the segment under the wildcard node's capture key.
pub(crate) fn match_path(root: &Arc<RouteNode>, segments: &[String]) -> RouteMatch {
    let mut chain: Vec<Option<Arc<RouteNode>>> = Vec::with_capacity(segments.len() + 1);
    let mut captures = HashMap::new();
    let mut current = Some(root.clone());
    chain.push(current.clone());
    for segment in segments {
        let next = current.and_then(|node| {
            if let Some(child) = node.child(segment) {
                Some(child.clone())
            } else if let Some(wc) = node.wildcard() {
                if let Some(key) = wc.capture_name() {
                    captures.insert(key.to_string(), segment.clone());
                }
                Some(wc.clone())
            } else {
                None
            }
        });
        match next {
            Some(node) => {
                // A mounted node unfolds into one chain entry per graft
                // layer plus the wrapped route; matching continues from the
                // innermost.
                current = None;
                for layer in node.layers() {
                    current = Some(layer.clone());
                    chain.push(Some(layer));
                }
            }
            None => {
                current = None;
                chain.push(None);
            }
        }
    }
    RouteMatch { chain, captures }
}
