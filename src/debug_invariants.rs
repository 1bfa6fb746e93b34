//! Structural validation checkpoints.
//!
//! The zip walk and the simplification sweeps rewrite doubly linked arc
//! and label lists in place, and a single missed back link only shows up
//! much later, in a traversal far from the mutation that broke it. Every
//! mutating pass therefore ends with a [`debug_invariants!`] checkpoint
//! that names the pass and replays the full structural validation of
//! [`validate_invariants`](DebugInvariants::validate_invariants): arc
//! endpoint ordering, incidence-list threading, label-list ownership, and
//! vertical-chain contiguity.
//!
//! Checkpoints run in debug builds, and in release builds when the
//! `strict-invariants` or `check-invariants` cargo feature is enabled;
//! plain release builds skip them entirely. A violated invariant panics
//! with the offending pass in the message — corruption is fatal, never
//! silently carried forward.

use crate::reeb_error::ReebGraphError;

/// Full structural self-validation of a graph.
pub trait DebugInvariants {
    /// Walk every table and list, returning the first violated invariant
    /// as [`ReebGraphError::CorruptTopology`].
    fn validate_invariants(&self) -> Result<(), ReebGraphError>;
}

/// Validation checkpoint at the end of a mutating pass.
///
/// `$graph` is the graph to validate (a `&ReebGraph` or anything that
/// coerces to one, such as `self` inside a `&mut self` method); `$pass`
/// names the pass for the panic message, e.g.
/// `crate::debug_invariants!(self, "construction::collapse")`.
#[macro_export]
macro_rules! debug_invariants {
    ($graph:expr, $pass:expr) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        {
            if let Err(e) =
                $crate::debug_invariants::DebugInvariants::validate_invariants($graph)
            {
                panic!("invariant violated after {}: {e}", $pass);
            }
        }
    };
}
