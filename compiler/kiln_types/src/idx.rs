//! Type index handle.
//!
//! Primitive types have fixed indices so they can be named without a pool.
//! Everything past [`Idx::FIRST_DYNAMIC`] is allocated on demand.

use std::fmt;

/// A 32-bit index into the type [`Pool`](crate::Pool).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Primitive Types ===
    pub const VOID: Self = Self(0);
    pub const BOOL: Self = Self(1);
    /// 8-bit signed character.
    pub const CHAR: Self = Self(2);
    /// Target-width signed integer.
    pub const INT: Self = Self(3);
    /// Target-width unsigned integer.
    pub const UINT: Self = Self(4);
    pub const INT8: Self = Self(5);
    pub const INT16: Self = Self(6);
    pub const INT32: Self = Self(7);
    pub const INT64: Self = Self(8);
    pub const INT128: Self = Self(9);
    pub const UINT8: Self = Self(10);
    pub const UINT16: Self = Self(11);
    pub const UINT32: Self = Self(12);
    pub const UINT64: Self = Self(13);
    pub const UINT128: Self = Self(14);
    /// Pointer-width signed integer.
    pub const INTPTR: Self = Self(15);
    /// Pointer-width unsigned integer.
    pub const SIZE: Self = Self(16);
    /// Pointer-width signed difference.
    pub const PTRDIFF: Self = Self(17);
    pub const FLOAT: Self = Self(18);
    pub const DOUBLE: Self = Self(19);
    pub const LONG_DOUBLE: Self = Self(20);

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 21;

    /// First index for dynamically allocated types.
    pub const FIRST_DYNAMIC: u32 = Self::PRIMITIVE_COUNT;

    /// Sentinel value indicating no type.
    pub const NONE: Self = Self(u32::MAX);

    const PRIMITIVE_NAMES: [&'static str; Self::PRIMITIVE_COUNT as usize] = [
        "void",
        "bool",
        "char",
        "int",
        "uint",
        "int8",
        "int16",
        "int32",
        "int64",
        "int128",
        "uint8",
        "uint16",
        "uint32",
        "uint64",
        "uint128",
        "intptr",
        "size",
        "ptrdiff",
        "float",
        "double",
        "long-double",
    ];

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Source name of a primitive; `None` for pool-allocated types.
    pub fn name(self) -> Option<&'static str> {
        Self::PRIMITIVE_NAMES.get(self.index()).copied()
    }

    /// Resolve a primitive type name such as `"int"` or `"uint8"`.
    pub fn from_primitive_name(name: &str) -> Option<Self> {
        Self::PRIMITIVE_NAMES
            .iter()
            .position(|&n| n == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(Self)
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Idx::NONE")
        } else if let Some(name) = self.name() {
            write!(f, "Idx({name})")
        } else {
            write!(f, "Idx({})", self.0)
        }
    }
}
