use std::fmt;

macro_rules! entity_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for "no entity".
            pub const INVALID: Self = Self(u32::MAX);

            /// Creates a handle from a raw index.
            #[must_use]
            pub const fn new(idx: u32) -> Self {
                Self(idx)
            }

            #[allow(clippy::cast_possible_truncation)]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Raw index into the entity's property arrays.
            #[must_use]
            pub const fn idx(self) -> u32 {
                self.0
            }

            /// Raw index as `usize`.
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Returns `true` for the [`INVALID`](Self::INVALID) sentinel.
            #[must_use]
            pub const fn is_invalid(self) -> bool {
                self.0 == u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "{}"), self.0)
            }
        }
    };
}

entity_handle!(
    /// Handle of a vertex.
    Vertex,
    "v"
);
entity_handle!(
    /// Handle of an edge.
    Edge,
    "e"
);
entity_handle!(
    /// Handle of a face.
    Face,
    "f"
);
entity_handle!(
    /// Handle of a halfedge. Halfedges `2e` and `2e + 1` form edge `e`.
    Halfedge,
    "h"
);
