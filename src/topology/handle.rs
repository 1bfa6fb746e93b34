//! Strong, zero-cost handles for Reeb graph elements.
//!
//! Nodes, arcs and labels form a cyclic web of references; all of them are
//! expressed as small-integer handles into the arena tables rather than
//! pointers. Each handle wraps a nonzero `u32` so that raw value 0 can be
//! reserved as the invalid/null sentinel, and `Option<NodeId>` stays the
//! size of a bare `u32`.
//!
//! This module provides:
//! - Transparent newtypes around `NonZeroU32` for the three element kinds.
//! - Constructors and accessors with safety checks.
//! - Implementations of common traits (`Debug`, `Display`, ordering,
//!   hashing, serde) so handles can be used in maps, sets, and printed
//!   easily.

use crate::reeb_error::ReebGraphError;
use crate::topology::arena::Handle;
use std::{convert::TryFrom, fmt, num::NonZeroU32};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Creates a new handle from a raw `u32` value.
            ///
            /// Returns an error if `raw == 0`; 0 is reserved as the null
            /// sentinel.
            #[inline]
            pub fn new(raw: u32) -> Result<Self, ReebGraphError> {
                NonZeroU32::new(raw)
                    .map($name)
                    .ok_or(ReebGraphError::InvalidHandle)
            }

            /// Returns the underlying `u32` value of this handle.
            #[inline]
            pub fn get(&self) -> u32 {
                self.0.get()
            }
        }

        impl Handle for $name {
            #[inline]
            fn from_raw(raw: NonZeroU32) -> Self {
                $name(raw)
            }
            #[inline]
            fn raw(self) -> NonZeroU32 {
                self.0
            }
        }

        impl TryFrom<u32> for $name {
            type Error = ReebGraphError;
            #[inline]
            fn try_from(raw: u32) -> Result<Self, ReebGraphError> {
                $name::new(raw)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = ReebGraphError;
            #[inline]
            fn try_from(raw: usize) -> Result<Self, ReebGraphError> {
                let raw32 = u32::try_from(raw).map_err(|_| ReebGraphError::InvalidHandle)?;
                $name::new(raw32)
            }
        }

        impl From<$name> for u32 {
            #[inline]
            fn from(id: $name) -> Self {
                id.get()
            }
        }

        impl From<NonZeroU32> for $name {
            #[inline]
            fn from(nz: NonZeroU32) -> Self {
                $name(nz)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.get()).finish()
            }
        }

        /// Prints the numeric id without any wrapper text.
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.get())
            }
        }
    };
}

define_handle!(
    /// Handle to a node (a critical point in the final graph, or a
    /// transient mesh vertex during construction).
    NodeId
);

define_handle!(
    /// Handle to an arc: a monotonic path between two nodes.
    ArcId
);

define_handle!(
    /// Handle to a label: a propagation marker attached to an arc.
    LabelId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_zero_returns_error() {
        assert!(NodeId::new(0).is_err());
        assert!(ArcId::new(0).is_err());
        assert!(LabelId::new(0).is_err());
    }

    #[test]
    fn new_and_get() {
        let n = NodeId::new(42).unwrap();
        assert_eq!(n.get(), 42);
    }

    #[test]
    fn try_from_usize() -> Result<(), ReebGraphError> {
        let a = ArcId::try_from(123usize)?;
        assert_eq!(a.get(), 123);
        assert_eq!(
            ArcId::try_from(0usize).unwrap_err(),
            ReebGraphError::InvalidHandle
        );
        Ok(())
    }

    #[test]
    fn debug_and_display() {
        let l = LabelId::new(7).unwrap();
        assert_eq!(format!("{:?}", l), "LabelId(7)");
        assert_eq!(format!("{}", l), "7");
    }

    #[test]
    fn ordering_and_hash() {
        let a = NodeId::new(1).unwrap();
        let b = NodeId::new(2).unwrap();
        assert!(a < b);
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn option_is_free() {
        use std::mem::size_of;
        assert_eq!(size_of::<Option<NodeId>>(), size_of::<u32>());
        assert_eq!(size_of::<Option<ArcId>>(), size_of::<u32>());
    }
}


#[cfg(test)]
mod serde_tests {
    use super::*;

    #[test]
    fn json_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let n = NodeId::new(123)?;
        let s = serde_json::to_string(&n)?;
        let n2: NodeId = serde_json::from_str(&s)?;
        assert_eq!(n2, n);
        Ok(())
    }
}
