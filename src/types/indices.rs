//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up the different index spaces of a lattice
//! Boltzmann case (mesh node vs lattice direction vs component vs block vs
//! macroscopic variable).

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// First index (0).
            pub const ZERO: Self = Self(0);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Linear node index within a block allocation (halo included).
    ///
    /// # Example
    ///
    /// ```
    /// use lbm_rs::types::NodeIndex;
    ///
    /// let node = NodeIndex::new(42);
    /// assert_eq!(node.get(), 42);
    /// ```
    NodeIndex,
    "N"
);

define_index!(
    /// Lattice direction index over the full multi-component direction set.
    DirectionIndex,
    "D"
);

define_index!(
    /// Lattice component (species / distribution population) index.
    ComponentIndex,
    "C"
);

define_index!(
    /// Mesh block index within a grid.
    BlockIndex,
    "B"
);

define_index!(
    /// Macroscopic variable index (density, velocity components, ...).
    MacroVarIndex,
    "M"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_display() {
        assert_eq!(format!("{}", NodeIndex::new(7)), "N7");
        assert_eq!(format!("{}", DirectionIndex::new(3)), "D3");
        assert_eq!(format!("{}", ComponentIndex::new(0)), "C0");
        assert_eq!(format!("{}", BlockIndex::new(1)), "B1");
        assert_eq!(format!("{}", MacroVarIndex::new(2)), "M2");
    }

    #[test]
    fn test_index_slices() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(values[DirectionIndex::new(1)], 2.0);

        let mut values = values;
        values[DirectionIndex::new(2)] = 5.0;
        assert_eq!(values[2], 5.0);
    }

    #[test]
    fn test_index_conversions() {
        let d: DirectionIndex = 4.into();
        let raw: usize = d.into();
        assert_eq!(raw, 4);
        assert_eq!(DirectionIndex::ZERO.get(), 0);
    }
}
