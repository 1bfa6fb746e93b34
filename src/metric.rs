//! Pluggable simplification metrics.
//!
//! During simplification every candidate feature (a chain of arcs from a
//! leaf to its join node, or a loop's closing arc) is assigned an
//! importance in `[0, 1]`; features below the caller's threshold are
//! cancelled. The default importance is persistence. Implementing
//! [`SimplificationMetric`] lets an application redefine what counts as
//! noise — geometric measures, region size, anything computable from the
//! graph.

use crate::topology::graph::ReebGraph;
use crate::topology::handle::ArcId;

/// Evaluates the importance of a Reeb graph feature during simplification.
///
/// `arcs` is the concatenated ascending arc chain of the feature (a single
/// arc for loop filtering). Implementations must return a value in
/// `[0, 1]`; the feature is cancelled when the value is strictly below the
/// simplification threshold.
pub trait SimplificationMetric {
    /// Importance of the feature spanned by `arcs`.
    fn value(&self, graph: &ReebGraph, arcs: &[ArcId]) -> f64;
}

/// The default importance: scalar span of the feature as a fraction of the
/// field's overall span. Provided so callers can compose or wrap the
/// built-in behavior; passing `None` to
/// [`simplify`](ReebGraph::simplify) is equivalent.
#[derive(Copy, Clone, Debug, Default)]
pub struct PersistenceMetric;

impl SimplificationMetric for PersistenceMetric {
    fn value(&self, graph: &ReebGraph, arcs: &[ArcId]) -> f64 {
        let span = graph.scalar_span();
        if span == 0.0 || arcs.is_empty() {
            return 0.0;
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &a in arcs {
            let bottom = graph.node_scalar_value(graph.arc_down_node_id(a));
            let top = graph.node_scalar_value(graph.arc_up_node_id(a));
            lo = lo.min(bottom);
            hi = hi.max(top);
        }
        (hi - lo) / span
    }
}
