//! A translation unit and its top-level declarations.
//!
//! Top-level forms:
//!
//! ```text
//! (namespace name form...)
//! (def Name (enum linkage type (element...)))
//! (def Name (struct linkage ((field type)...)))
//! (def name (fn linkage ret ((param type)...) body...))
//! ```
//!
//! Each top-level form either commits completely or reports at least one
//! error; a failure never stops the forms after it.

mod enum_decl;
mod fn_decl;
mod struct_decl;

use kiln_ir::{Name, NodeArena, NodeId, NodeKind, SharedInterner, Span, StringInterner, TokenKind};
use kiln_types::Idx;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::stack::ensure_sufficient_stack;
use crate::{
    errors, CompileOptions, Context, CoreForm, Expansion, FormResult, Linkage, MacroExpander,
    NoMacros, ENUM_VALUE_MEMBER,
};

/// Child ids of a list node, copied out of the arena.
pub(crate) type Items = SmallVec<[NodeId; 8]>;

/// Names the unit compares symbols against, interned once.
pub(crate) struct Keywords {
    pub namespace: Name,
    pub def: Name,
    pub enum_: Name,
    pub struct_: Name,
    pub fn_: Name,
    pub p: Name,
    pub pointer: Name,
    pub true_: Name,
    pub false_: Name,
    pub enum_value: Name,
}

impl Keywords {
    fn new(interner: &StringInterner) -> Self {
        Keywords {
            namespace: interner.intern("namespace"),
            def: interner.intern("def"),
            enum_: interner.intern("enum"),
            struct_: interner.intern("struct"),
            fn_: interner.intern("fn"),
            p: interner.intern("p"),
            pointer: interner.intern("pointer"),
            true_: interner.intern("true"),
            false_: interner.intern("false"),
            enum_value: interner.intern(ENUM_VALUE_MEMBER),
        }
    }
}

pub struct Unit {
    pub(crate) arena: NodeArena,
    pub(crate) ctx: Context,
    pub(crate) expander: Box<dyn MacroExpander>,
    /// Core form registry, keyed by the interned form name.
    pub(crate) forms: FxHashMap<Name, CoreForm>,
    pub(crate) kw: Keywords,
    pub(crate) max_expansion_depth: u32,
}

impl Unit {
    pub fn new(interner: SharedInterner, arena: NodeArena, options: &CompileOptions) -> Self {
        let forms = CoreForm::ALL
            .iter()
            .map(|&form| (interner.intern(form.name()), form))
            .collect();
        let kw = Keywords::new(&interner);
        Unit {
            arena,
            ctx: Context::new(interner, options),
            expander: Box::new(NoMacros),
            forms,
            kw,
            max_expansion_depth: options.max_expansion_depth,
        }
    }

    #[must_use]
    pub fn with_expander(mut self, expander: impl MacroExpander + 'static) -> Self {
        self.expander = Box::new(expander);
        self
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    // ── Top level ───────────────────────────────────────────────────

    /// Process every form in order. Fails if any of them failed.
    pub fn process_all(&mut self, forms: &[NodeId]) -> FormResult<()> {
        let mut failed = None;
        for &form in forms {
            if let Err(err) = self.process_top_level(form) {
                failed = Some(err);
            }
        }
        failed.map_or(Ok(()), Err)
    }

    /// Process one top-level declaration.
    pub fn process_top_level(&mut self, node: NodeId) -> FormResult<()> {
        self.process_top_level_at(node, 0)
    }

    fn process_top_level_at(&mut self, node: NodeId, depth: u32) -> FormResult<()> {
        ensure_sufficient_stack(|| {
            let items = self.expect_list(node, "top-level form")?;
            let Some(&head) = items.first() else {
                return Err(self.ctx.error(errors::empty_list(self.span(node))));
            };
            match self.arena.symbol(head) {
                Some(name) if name == self.kw.namespace => self.process_namespace(node, &items),
                Some(name) if name == self.kw.def => self.process_def(node, &items),
                _ => match self.try_expand(node, depth)? {
                    Some(expanded) => self.process_top_level_at(expanded, depth + 1),
                    None => Err(self.ctx.error(errors::unexpected_element(
                        self.span(head),
                        "`namespace` or `def`",
                        "top-level form",
                        &self.display(head),
                    ))),
                },
            }
        })
    }

    fn process_namespace(&mut self, node: NodeId, items: &[NodeId]) -> FormResult<()> {
        self.check_min_arity(node, "namespace", items, 1)?;
        let name = self.expect_symbol(items[1], "namespace name")?;
        self.ctx.activate_namespace(name);
        let result = self.process_all(&items[2..]);
        self.ctx.deactivate_namespace();
        result
    }

    fn process_def(&mut self, node: NodeId, items: &[NodeId]) -> FormResult<()> {
        self.check_arity(node, "def", items, 2)?;
        let name = self.expect_symbol(items[1], "declaration name")?;
        let body = items[2];
        let parts = self.expect_list(body, "declaration body")?;
        let kind = match parts.first() {
            Some(&head) => self.arena.symbol(head),
            None => None,
        };
        match kind {
            Some(k) if k == self.kw.enum_ => self.define_enum(items[1], name, body, &parts),
            Some(k) if k == self.kw.struct_ => self.define_struct(items[1], name, body, &parts),
            Some(k) if k == self.kw.fn_ => self.define_function(items[1], name, body, &parts),
            _ => Err(self.ctx.error(errors::unexpected_element(
                self.span(body),
                "`enum`, `struct` or `fn`",
                "declaration",
                &self.display(body),
            ))),
        }
    }

    /// Process `(def Name (enum linkage type (elements...)))`.
    ///
    /// Either the enum, its backing struct and their ABI functions are all
    /// registered, or nothing is and at least one error was reported.
    pub fn declare_enum(&mut self, node: NodeId) -> FormResult<()> {
        let items = self.expect_list(node, "enum declaration")?;
        let is_def = items
            .first()
            .and_then(|&head| self.arena.symbol(head))
            .is_some_and(|head| head == self.kw.def);
        if !is_def {
            return Err(self.ctx.error(errors::unexpected_element(
                self.span(node),
                "`def`",
                "enum declaration",
                &self.display(node),
            )));
        }
        self.check_arity(node, "def", &items, 2)?;
        let name = self.expect_symbol(items[1], "enum name")?;
        let parts = self.expect_list(items[2], "enum declaration body")?;
        self.define_enum(items[1], name, items[2], &parts)
    }

    // ── Node helpers ────────────────────────────────────────────────

    pub(crate) fn span(&self, node: NodeId) -> Span {
        self.arena.span(node)
    }

    pub(crate) fn display(&self, node: NodeId) -> String {
        self.arena.display(node, self.ctx.interner())
    }

    pub(crate) fn items(&self, node: NodeId) -> Option<Items> {
        self.arena.list(node).map(SmallVec::from_slice)
    }

    pub(crate) fn expect_list(&mut self, node: NodeId, context: &str) -> FormResult<Items> {
        match self.items(node) {
            Some(items) => Ok(items),
            None => Err(self.ctx.error(errors::incorrect_arg_type(
                self.span(node),
                "list",
                context,
                self.arena.describe(node),
            ))),
        }
    }

    pub(crate) fn expect_symbol(&mut self, node: NodeId, context: &str) -> FormResult<Name> {
        match self.arena.symbol(node) {
            Some(name) => Ok(name),
            None => Err(self.ctx.error(errors::unexpected_element(
                self.span(node),
                "symbol",
                context,
                self.arena.describe(node),
            ))),
        }
    }

    /// `items` includes the head; `expected` counts arguments after it.
    pub(crate) fn check_arity(
        &mut self,
        node: NodeId,
        form: &str,
        items: &[NodeId],
        expected: usize,
    ) -> FormResult<()> {
        let found = items.len().saturating_sub(1);
        if found == expected {
            return Ok(());
        }
        Err(self.ctx.error(errors::incorrect_arg_count(
            self.span(node),
            form,
            expected,
            found,
        )))
    }

    pub(crate) fn check_min_arity(
        &mut self,
        node: NodeId,
        form: &str,
        items: &[NodeId],
        minimum: usize,
    ) -> FormResult<()> {
        let found = items.len().saturating_sub(1);
        if found >= minimum {
            return Ok(());
        }
        Err(self.ctx.error(errors::too_few_args(
            self.span(node),
            form,
            minimum,
            found,
        )))
    }

    pub(crate) fn parse_linkage(&mut self, node: NodeId) -> FormResult<Linkage> {
        let linkage = self
            .arena
            .symbol(node)
            .and_then(|name| Linkage::from_keyword(self.ctx.interner().lookup(name)));
        match linkage {
            Some(linkage) => Ok(linkage),
            None => Err(self.ctx.error(errors::invalid_linkage(
                self.span(node),
                &self.display(node),
            ))),
        }
    }

    /// Resolve a type form: a primitive or declared name, or `(p T)` / `(pointer T)`.
    pub(crate) fn resolve_type(&mut self, node: NodeId) -> FormResult<Idx> {
        ensure_sufficient_stack(|| match self.arena.kind(node) {
            NodeKind::Token(token) if token.kind == TokenKind::Symbol => {
                match self.ctx.lookup_type(token.text) {
                    Some(ty) => Ok(ty),
                    None => Err(self.ctx.error(errors::type_not_in_scope(
                        self.span(node),
                        self.ctx.interner().lookup(token.text),
                    ))),
                }
            }
            NodeKind::List(_) => {
                let items = self.items(node).unwrap_or_default();
                let is_pointer = items.len() == 2
                    && self
                        .arena
                        .symbol(items[0])
                        .is_some_and(|head| head == self.kw.p || head == self.kw.pointer);
                if !is_pointer {
                    return Err(self.ctx.error(errors::type_not_in_scope(
                        self.span(node),
                        &self.display(node),
                    )));
                }
                let pointee = self.resolve_type(items[1])?;
                Ok(self.ctx.pool.pointer_to(pointee))
            }
            NodeKind::Token(_) => Err(self.ctx.error(errors::unexpected_element(
                self.span(node),
                "type",
                "type position",
                self.arena.describe(node),
            ))),
        })
    }

    /// Offer `node` to the macro expander.
    ///
    /// `depth` counts the rewrites already applied to reach `node`.
    pub(crate) fn try_expand(&mut self, node: NodeId, depth: u32) -> FormResult<Option<NodeId>> {
        if depth >= self.max_expansion_depth {
            return Err(self.ctx.error(errors::macro_failed(
                self.span(node),
                &format!("expansion depth limit of {} reached", self.max_expansion_depth),
            )));
        }
        let interner = self.ctx.interner.clone();
        match self.expander.try_expand(&mut self.arena, &interner, node) {
            Expansion::Expanded(expanded) => {
                tracing::trace!(
                    from = %self.display(node),
                    to = %self.display(expanded),
                    "macro expanded"
                );
                Ok(Some(expanded))
            }
            Expansion::NotApplicable => Ok(None),
            Expansion::Failed(detail) => {
                Err(self.ctx.error(errors::macro_failed(self.span(node), &detail)))
            }
        }
    }
}
