//! The around-pipeline executor.
//!
//! Given the parent chain the matcher produced, this module runs
//! before-hooks top-down, the matched handler, after-hooks bottom-up, and
//! rescue resolution on error.
//!
//! Two bounds shape execution. The `finished` flag on the response vetoes
//! remaining before-hooks and the handler. The *finishing node* — the chain
//! position where the response became finished or where an error was
//! rescued — bounds the after phase: only nodes from the finishing node
//! outward run their after-hooks, so a level whose before-hooks never ran
//! never sees its after-hooks either.

use crate::routing::node::RouteNode;
use espalier_core::{BoxError, DynHandler, Request, Response};
use std::sync::Arc;

/// Run the full pipeline over a matched chain.
///
/// `chain` is ordered root-first and ends at the matching node; `handler`
/// is the method handler already resolved on that node. The only `Err` this
/// returns is an application error no rescue entry in the chain handled.
pub(crate) async fn run(
    chain: &[Arc<RouteNode>],
    handler: &Arc<dyn DynHandler>,
    req: &mut Request,
    res: &mut Response,
) -> Result<(), BoxError> {
    let innermost = chain.len().saturating_sub(1);
    let mut finishing: Option<usize> = None;

    // Before phase: outermost to innermost.
    'before: for idx in 0..chain.len() {
        for hook in chain[idx].befores() {
            let outcome = hook.run_dyn(req, res).await;
            match outcome {
                Ok(()) => {
                    if res.is_finished() {
                        finishing = Some(idx);
                        break 'before;
                    }
                }
                Err(err) => {
                    res.finish();
                    let handled_at = resolve_rescue(chain, idx, err, req, res).await?;
                    finishing = Some(handled_at);
                    break 'before;
                }
            }
        }
    }

    // Handler invocation, unless a hook finished the response first.
    if finishing.is_none() && !res.is_finished() {
        let outcome = handler.call_dyn(req, res).await;
        match outcome {
            Ok(body) => {
                if !res.is_finished() && !res.has_raw_body() {
                    res.set_body(body);
                }
            }
            Err(err) => {
                res.finish();
                let handled_at = resolve_rescue(chain, innermost, err, req, res).await?;
                finishing = Some(handled_at);
            }
        }
    }

    // After phase: innermost to outermost, bounded by the finishing node.
    let mut idx = finishing.unwrap_or(innermost);
    'after: loop {
        let hooks = chain[idx].afters();
        let mut pos = 0;
        while pos < hooks.len() {
            let outcome = hooks[pos].run_dyn(req, res).await;
            match outcome {
                Ok(()) => pos += 1,
                Err(err) => {
                    res.finish();
                    let handled_at = resolve_rescue(chain, idx, err, req, res).await?;
                    if handled_at == idx {
                        // Rescued in place: carry on with this node's
                        // remaining after-hooks.
                        pos += 1;
                    } else {
                        // Rescued further out: resume there, skipping the
                        // levels in between.
                        idx = handled_at;
                        continue 'after;
                    }
                }
            }
        }
        if idx == 0 {
            break;
        }
        idx -= 1;
    }

    Ok(())
}

/// Resolve an error raised at chain position `from`.
///
/// Scans from the raising node outward toward the root; within a node,
/// entries are consulted in reverse declaration order (the node handles
/// that internally). The first match handles the error and its position is
/// returned as the new finishing node. A rescue handler that itself fails
/// restarts the scan one level further out with the new error. With no
/// match anywhere, the error is fatal and propagates unmodified.
async fn resolve_rescue(
    chain: &[Arc<RouteNode>],
    from: usize,
    mut error: BoxError,
    req: &mut Request,
    res: &mut Response,
) -> Result<usize, BoxError> {
    let mut upper = from;
    'scan: loop {
        let mut idx = upper;
        loop {
            if let Some(entry) = chain[idx].find_rescuer(error.as_ref()) {
                let outcome = entry.handler().rescue_dyn(error.as_ref(), req, res).await;
                match outcome {
                    Ok(()) => return Ok(idx),
                    Err(next) => {
                        if idx == 0 {
                            return Err(next);
                        }
                        error = next;
                        upper = idx - 1;
                        continue 'scan;
                    }
                }
            }
            if idx == 0 {
                return Err(error);
            }
            idx -= 1;
        }
    }
}
