//! Type table for the kiln compiler.
//!
//! Every type lives in a single [`Pool`] and is referenced by a 32-bit
//! [`Idx`]. Type equality is index equality: pointer types and named
//! aggregates are interned, so `(p int)` built twice yields the same `Idx`.
//!
//! Primitive widths that depend on the target (`int`, `size`, `intptr`, ...)
//! are fixed by the [`TargetInfo`] the pool is created with.

mod flags;
mod idx;
mod pool;
mod tag;
mod target;

pub use flags::TypeFlags;
pub use idx::Idx;
pub use pool::Pool;
pub use tag::Tag;
pub use target::TargetInfo;
