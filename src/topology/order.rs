//! Simulation-of-simplicity vertex order.
//!
//! All comparisons between mesh vertices use the lexicographic order on
//! `(scalar value, vertex id)`. Breaking scalar ties by vertex id makes the
//! order strictly total, which removes every degeneracy caused by equal
//! field values: two distinct vertices never compare equal, so arcs always
//! have a well-defined lower and upper endpoint and repeated runs on the
//! same input are byte-identical.

use crate::topology::elements::VertexId;
use std::cmp::Ordering;

/// Compare two `(vertex id, value)` pairs in scalar order with the vertex
/// id as tie-breaker.
#[inline]
pub fn vertex_order(a: (VertexId, f64), b: (VertexId, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

/// True when `a` precedes `b` in the vertex order.
#[inline]
pub fn is_below(a: (VertexId, f64), b: (VertexId, f64)) -> bool {
    vertex_order(a, b) == Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_dominates() {
        assert!(is_below((9, 1.0), (1, 2.0)));
        assert!(!is_below((1, 2.0), (9, 1.0)));
    }

    #[test]
    fn vertex_id_breaks_ties() {
        assert!(is_below((1, 5.0), (2, 5.0)));
        assert!(!is_below((2, 5.0), (1, 5.0)));
    }

    #[test]
    fn order_is_total() {
        let verts = [(3, 1.0), (1, 1.0), (2, 0.5), (0, 1.5)];
        for &a in &verts {
            for &b in &verts {
                if a != b {
                    assert_ne!(is_below(a, b), is_below(b, a));
                }
            }
        }
    }

    #[test]
    fn sorting_with_the_oracle_is_deterministic() {
        let mut verts = vec![(5, 1.0), (3, 1.0), (4, 0.0), (1, 1.0)];
        verts.sort_by(|&a, &b| vertex_order(a, b));
        assert_eq!(verts, vec![(4, 0.0), (1, 1.0), (3, 1.0), (5, 1.0)]);
    }
}
