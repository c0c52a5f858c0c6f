//! Core syntax-tree types for the kiln compiler.
//!
//! Everything downstream of the reader works on these types:
//!
//! - [`Span`]: byte range into the source of a unit
//! - [`Name`] / [`StringInterner`]: interned identifiers and literal text
//! - [`NodeArena`] / [`NodeId`]: the S-expression tree of one unit
//!
//! Nodes are stored in a flat arena and referenced by index. Lists keep
//! their children contiguously in a side table, so a list node is a
//! `(start, len)` pair rather than an owned `Vec`.

mod interner;
mod name;
mod node;
mod span;

pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use node::{Node, NodeArena, NodeBuilder, NodeId, NodeKind, NodeRange, Token, TokenKind};
pub use span::Span;

