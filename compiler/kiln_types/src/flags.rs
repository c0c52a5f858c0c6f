//! Pre-computed type metadata flags.
//!
//! Computed once when a type is interned so classification queries
//! never walk the type structure.

use bitflags::bitflags;

bitflags! {
    /// Pre-computed type properties for O(1) queries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u16 {
        /// Pre-interned primitive.
        const IS_PRIMITIVE = 1 << 0;
        /// The `void` type.
        const IS_VOID = 1 << 1;
        /// Integer type (including `char`, excluding `bool`).
        const IS_INTEGER = 1 << 2;
        /// Signed integer.
        const IS_SIGNED = 1 << 3;
        /// Floating-point type.
        const IS_FLOAT = 1 << 4;
        /// Pointer type; always has a pointee.
        const IS_POINTER = 1 << 5;
        /// Struct or enum, lowered to a backend aggregate.
        const IS_AGGREGATE = 1 << 6;
        /// Carries a declared name and namespace path.
        const IS_NAMED = 1 << 7;
    }
}

impl TypeFlags {
    /// Arithmetic scalar: integer or floating-point.
    #[inline]
    pub fn is_numeric(self) -> bool {
        self.intersects(Self::IS_INTEGER | Self::IS_FLOAT)
    }
}
