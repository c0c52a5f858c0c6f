//! S-expression nodes stored in a flat arena.

use std::fmt;

use crate::{Name, Span, StringInterner};

/// Index of a node in a [`NodeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Lexical class of a leaf token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Symbol,
    Str,
    Int,
    Float,
}

impl TokenKind {
    /// Word used for this kind in diagnostics.
    pub const fn describe(self) -> &'static str {
        match self {
            TokenKind::Symbol => "symbol",
            TokenKind::Str => "string",
            TokenKind::Int => "integer",
            TokenKind::Float => "floating-point number",
        }
    }
}

/// Leaf of the tree: a token kind plus its literal text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Name,
}

/// Contiguous run of children in the arena's side table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeRange {
    pub start: u32,
    pub len: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    Token(Token),
    List(NodeRange),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Owner of every node of one unit.
///
/// Nodes are never mutated after they are pushed. Macro expansion pushes a
/// fresh subtree and hands back its root, so two dispatches of the same
/// `NodeId` always see the same tree.
#[derive(Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    children: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let raw = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(node);
        NodeId(raw)
    }

    pub fn push_token(&mut self, kind: TokenKind, text: Name, span: Span) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::Token(Token { kind, text }),
            span,
        })
    }

    pub fn push_symbol(&mut self, text: Name, span: Span) -> NodeId {
        self.push_token(TokenKind::Symbol, text, span)
    }

    pub fn push_int(&mut self, text: Name, span: Span) -> NodeId {
        self.push_token(TokenKind::Int, text, span)
    }

    pub fn push_float(&mut self, text: Name, span: Span) -> NodeId {
        self.push_token(TokenKind::Float, text, span)
    }

    pub fn push_str(&mut self, text: Name, span: Span) -> NodeId {
        self.push_token(TokenKind::Str, text, span)
    }

    /// Push a list whose children are `items`, in order.
    pub fn push_list(&mut self, items: &[NodeId], span: Span) -> NodeId {
        let start = u32::try_from(self.children.len()).unwrap_or(u32::MAX);
        let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
        self.children.extend_from_slice(items);
        self.alloc(Node {
            kind: NodeKind::List(NodeRange { start, len }),
            span,
        })
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).span
    }

    pub fn token(&self, id: NodeId) -> Option<Token> {
        match self.kind(id) {
            NodeKind::Token(tok) => Some(tok),
            NodeKind::List(_) => None,
        }
    }

    /// Text of a symbol token; `None` for other tokens and lists.
    pub fn symbol(&self, id: NodeId) -> Option<Name> {
        match self.token(id) {
            Some(Token {
                kind: TokenKind::Symbol,
                text,
            }) => Some(text),
            _ => None,
        }
    }

    pub fn list(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.kind(id) {
            NodeKind::List(range) => {
                let start = range.start as usize;
                Some(&self.children[start..start + range.len as usize])
            }
            NodeKind::Token(_) => None,
        }
    }

    pub fn is_list(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::List(_))
    }

    /// Shape word for diagnostics ("symbol", "integer", "list", ...).
    pub fn describe(&self, id: NodeId) -> &'static str {
        match self.kind(id) {
            NodeKind::Token(tok) => tok.kind.describe(),
            NodeKind::List(_) => "list",
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render a subtree back to S-expression text.
    pub fn display(&self, id: NodeId, interner: &StringInterner) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id, interner);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, interner: &StringInterner) {
        match self.kind(id) {
            NodeKind::Token(tok) => {
                let text = interner.lookup(tok.text);
                if tok.kind == TokenKind::Str {
                    out.push('"');
                    out.push_str(text);
                    out.push('"');
                } else {
                    out.push_str(text);
                }
            }
            NodeKind::List(_) => {
                out.push('(');
                for (i, &child) in self.list(id).unwrap_or_default().iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    self.write_node(out, child, interner);
                }
                out.push(')');
            }
        }
    }
}

/// Convenience constructor for trees built in code: macro output, compiler
/// synthesized forms and tests.
///
/// Tokens get consecutive non-overlapping spans so diagnostics on built
/// trees still sort in construction order.
pub struct NodeBuilder<'a> {
    arena: &'a mut NodeArena,
    interner: &'a StringInterner,
    cursor: u32,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(arena: &'a mut NodeArena, interner: &'a StringInterner) -> Self {
        NodeBuilder {
            arena,
            interner,
            cursor: 1,
        }
    }

    fn next_span(&mut self, text: &str) -> Span {
        let len = u32::try_from(text.len()).unwrap_or(u32::MAX);
        let span = Span::new(self.cursor, self.cursor.saturating_add(len));
        self.cursor = span.end.saturating_add(1);
        span
    }

    fn token(&mut self, kind: TokenKind, text: &str) -> NodeId {
        let span = self.next_span(text);
        let name = self.interner.intern(text);
        self.arena.push_token(kind, name, span)
    }

    pub fn sym(&mut self, text: &str) -> NodeId {
        self.token(TokenKind::Symbol, text)
    }

    pub fn int(&mut self, text: &str) -> NodeId {
        self.token(TokenKind::Int, text)
    }

    pub fn float(&mut self, text: &str) -> NodeId {
        self.token(TokenKind::Float, text)
    }

    pub fn str(&mut self, text: &str) -> NodeId {
        self.token(TokenKind::Str, text)
    }

    pub fn list(&mut self, items: &[NodeId]) -> NodeId {
        let span = items
            .iter()
            .map(|&id| self.arena.span(id))
            .reduce(Span::merge)
            .unwrap_or_else(|| self.next_span("()"));
        self.arena.push_list(items, span)
    }
}
