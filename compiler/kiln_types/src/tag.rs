//! Type kind tags.

/// Kind of a type in the pool.
///
/// Primitive tags map one-to-one onto the fixed primitive indices.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum Tag {
    // Primitives
    Void = 0,
    Bool = 1,
    Char = 2,
    Int = 3,
    UInt = 4,
    Int8 = 5,
    Int16 = 6,
    Int32 = 7,
    Int64 = 8,
    Int128 = 9,
    UInt8 = 10,
    UInt16 = 11,
    UInt32 = 12,
    UInt64 = 13,
    UInt128 = 14,
    IntPtr = 15,
    Size = 16,
    PtrDiff = 17,
    Float = 18,
    Double = 19,
    LongDouble = 20,

    // Constructed types
    /// `data` is the pointee's raw index.
    Pointer = 32,
    /// `data` indexes the name/path record in `extra`.
    Struct = 48,
    /// `data` indexes the name/path record in `extra`.
    Enum = 49,
}

impl Tag {
    pub(crate) const PRIMITIVES: [Tag; 21] = [
        Tag::Void,
        Tag::Bool,
        Tag::Char,
        Tag::Int,
        Tag::UInt,
        Tag::Int8,
        Tag::Int16,
        Tag::Int32,
        Tag::Int64,
        Tag::Int128,
        Tag::UInt8,
        Tag::UInt16,
        Tag::UInt32,
        Tag::UInt64,
        Tag::UInt128,
        Tag::IntPtr,
        Tag::Size,
        Tag::PtrDiff,
        Tag::Float,
        Tag::Double,
        Tag::LongDouble,
    ];

    #[inline]
    pub const fn is_named(self) -> bool {
        matches!(self, Tag::Struct | Tag::Enum)
    }
}
