//! The macro expansion seam.
//!
//! Macro definitions and their evaluation live outside this crate. The
//! dispatcher only needs one operation: offer a list node and get back
//! either a replacement node or "not mine".

use kiln_ir::{NodeArena, NodeId, StringInterner};

/// Result of offering a node to the expander.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Root of a freshly allocated replacement subtree.
    Expanded(NodeId),
    /// No macro applies to this node.
    NotApplicable,
    /// A macro applied but could not produce a tree.
    Failed(String),
}

pub trait MacroExpander {
    /// Try to rewrite `node`. New nodes are allocated in `arena`; existing
    /// nodes are never modified.
    fn try_expand(
        &mut self,
        arena: &mut NodeArena,
        interner: &StringInterner,
        node: NodeId,
    ) -> Expansion;
}

impl<F> MacroExpander for F
where
    F: FnMut(&mut NodeArena, &StringInterner, NodeId) -> Expansion,
{
    fn try_expand(
        &mut self,
        arena: &mut NodeArena,
        interner: &StringInterner,
        node: NodeId,
    ) -> Expansion {
        self(arena, interner, node)
    }
}

/// Expander that knows no macros.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoMacros;

impl MacroExpander for NoMacros {
    fn try_expand(&mut self, _: &mut NodeArena, _: &StringInterner, _: NodeId) -> Expansion {
        Expansion::NotApplicable
    }
}
