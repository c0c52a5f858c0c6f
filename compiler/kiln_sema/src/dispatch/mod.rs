//! The instruction dispatcher.
//!
//! [`FormProcessor::process`] is the single recursive entry point for
//! expressions. A node is classified once:
//!
//! | Node | Route |
//! |------|-------|
//! | integer / float / string token | constant |
//! | `true` / `false` | `bool` constant |
//! | other symbol | variable read |
//! | `(core form args...)` | core form, marked as core-prefixed |
//! | `(form args...)` with a core form head | core form, unless a function of that name is in scope |
//! | any other list | macro expander, then overload resolution and a call |
//!
//! Every handler takes the block to emit into and returns the block to
//! continue from inside its [`ParseResult`]. A failed sub-form stops the
//! handler before it emits anything further.

use kiln_backend::{BackendError, BlockId, FunctionId, IrModule, ValueId};
use kiln_diagnostic::ErrorGuaranteed;
use kiln_ir::{Name, NodeId, NodeKind, Span, Token, TokenKind};
use kiln_types::Idx;
use smallvec::SmallVec;

use crate::stack::ensure_sufficient_stack;
use crate::unit::Unit;
use crate::{errors, CoreForm, FormResult, LocalScope, Param, ParseResult, Storage, Variable};

/// Lowers the expressions of one function body.
pub struct FormProcessor<'u> {
    pub(crate) unit: &'u mut Unit,
    pub(crate) func: FunctionId,
    scope: LocalScope,
    /// Macro rewrites applied to reach the node being processed.
    expansion_depth: u32,
}

impl<'u> FormProcessor<'u> {
    pub fn new(unit: &'u mut Unit, func: FunctionId) -> Self {
        FormProcessor {
            unit,
            func,
            scope: LocalScope::new(),
            expansion_depth: 0,
        }
    }

    pub fn unit(&self) -> &Unit {
        self.unit
    }

    pub fn scope(&self) -> &LocalScope {
        &self.scope
    }

    pub(crate) fn into_unit(self) -> &'u mut Unit {
        self.unit
    }

    /// Bind `name` to an SSA value. Reads of it are not lvalues.
    pub fn bind_value(&mut self, name: Name, ty: Idx, value: ValueId) -> Option<Variable> {
        self.scope.bind(
            name,
            Variable {
                ty,
                storage: Storage::Value(value),
            },
        )
    }

    /// Bind `name` to the storage `slot`, a pointer to a `ty`.
    pub fn bind_slot(&mut self, name: Name, ty: Idx, slot: ValueId) -> Option<Variable> {
        self.scope.bind(
            name,
            Variable {
                ty,
                storage: Storage::Slot(slot),
            },
        )
    }

    /// Copy parameter `index` into a fresh stack slot and bind it.
    pub(crate) fn spill_param(
        &mut self,
        block: BlockId,
        index: usize,
        param: Param,
        span: Span,
    ) -> FormResult<()> {
        let Some(value) = self.unit.ctx.module.param(self.func, index) else {
            return Err(self
                .unit
                .ctx
                .error(errors::internal(span, "parameter index out of range")));
        };
        let llty = self.unit.ctx.backend_type(param.ty);
        let slot = self.backend_at(span, |m| {
            let slot = m.alloca(block, llty)?;
            m.store(block, value, slot)?;
            Ok(slot)
        })?;
        self.bind_slot(param.name, param.ty, slot);
        Ok(())
    }

    // ── Dispatch ────────────────────────────────────────────────────

    /// Process `node`, emitting into `block`.
    pub fn process(&mut self, block: BlockId, node: NodeId) -> FormResult {
        ensure_sufficient_stack(|| {
            let result = match self.unit.arena.kind(node) {
                NodeKind::Token(token) => self.process_token(block, node, token),
                NodeKind::List(_) => self.process_list(block, node),
            }?;
            debug_assert!(result.is_consistent(&self.unit.ctx.pool));
            Ok(result)
        })
    }

    fn process_token(&mut self, block: BlockId, node: NodeId, token: Token) -> FormResult {
        let ctx = &mut self.unit.ctx;
        let text = ctx.name_str(token.text);
        match token.kind {
            TokenKind::Int => {
                let llty = ctx.backend_type(Idx::INT);
                match ctx.module.const_int_from_str(llty, true, text) {
                    Ok(value) => Ok(ParseResult::new(block, Idx::INT, value)),
                    Err(BackendError::LiteralOutOfRange { .. }) => {
                        let int = ctx.type_name(Idx::INT);
                        Err(ctx.error(errors::literal_out_of_range(
                            self.unit.arena.span(node),
                            text,
                            &int,
                        )))
                    }
                    Err(_) => Err(self.malformed_literal(node, "integer literal")),
                }
            }
            TokenKind::Float => match text.parse::<f64>() {
                Ok(parsed) => {
                    let llty = ctx.backend_type(Idx::FLOAT);
                    let value = ctx.module.const_float(llty, parsed);
                    Ok(ParseResult::new(block, Idx::FLOAT, value))
                }
                Err(_) => Err(self.malformed_literal(node, "floating-point literal")),
            },
            TokenKind::Str => {
                let ty = ctx.pool.pointer_to(Idx::CHAR);
                let value = ctx.module.global_string(text);
                Ok(ParseResult::new(block, ty, value))
            }
            TokenKind::Symbol => self.process_symbol(block, node, token.text),
        }
    }

    fn process_symbol(&mut self, block: BlockId, node: NodeId, name: Name) -> FormResult {
        if name == self.unit.kw.true_ || name == self.unit.kw.false_ {
            let llty = self.unit.ctx.backend_type(Idx::BOOL);
            let bit = i128::from(name == self.unit.kw.true_);
            let value = self.unit.ctx.module.const_int(llty, bit);
            return Ok(ParseResult::new(block, Idx::BOOL, value));
        }
        let Some(var) = self.scope.lookup(name) else {
            let span = self.unit.arena.span(node);
            let ctx = &mut self.unit.ctx;
            return Err(ctx.error(errors::variable_not_in_scope(span, ctx.name_str(name))));
        };
        match var.storage {
            Storage::Value(value) => Ok(ParseResult::new(block, var.ty, value).owned_elsewhere()),
            Storage::Slot(slot) => {
                let loaded = self.backend(node, |m| m.load(block, slot))?;
                let slot_ty = self.unit.ctx.pool.pointer_to(var.ty);
                Ok(ParseResult::new(block, var.ty, loaded)
                    .with_lvalue(slot, slot_ty)
                    .owned_elsewhere())
            }
        }
    }

    fn process_list(&mut self, block: BlockId, node: NodeId) -> FormResult {
        let items = self.unit.items(node).unwrap_or_default();
        let Some(&head) = items.first() else {
            return Err(self.unit.ctx.error(errors::empty_list(self.unit.arena.span(node))));
        };
        let Some(head_name) = self.unit.arena.symbol(head) else {
            return Err(self.unit.ctx.error(errors::unexpected_element(
                self.unit.arena.span(head),
                "symbol",
                "head of form",
                self.unit.arena.describe(head),
            )));
        };
        let args = &items[1..];

        if let Some(&form) = self.unit.forms.get(&head_name) {
            if form == CoreForm::Core {
                return self.process_core_prefixed(block, node, args);
            }
            if !self.unit.ctx.has_function_named(head_name) {
                tracing::trace!(form = form.name(), "core form");
                return self.process_core_form(block, node, form, args, false);
            }
        }

        match self.unit.try_expand(node, self.expansion_depth)? {
            Some(expanded) => {
                self.expansion_depth += 1;
                let result = self.process(block, expanded);
                self.expansion_depth -= 1;
                result
            }
            None => self.process_call(block, node, head_name, args),
        }
    }

    /// `(core form args...)`: always the core form, even when shadowed.
    fn process_core_prefixed(&mut self, block: BlockId, node: NodeId, args: &[NodeId]) -> FormResult {
        let form = args
            .first()
            .and_then(|&n| self.unit.arena.symbol(n))
            .and_then(|name| self.unit.forms.get(&name).copied())
            .filter(|&form| form != CoreForm::Core);
        match form {
            Some(form) => self.process_core_form(block, node, form, &args[1..], true),
            None => {
                let at = args.first().copied().unwrap_or(node);
                Err(self.unit.ctx.error(errors::unexpected_element(
                    self.unit.arena.span(at),
                    "core form name",
                    "`core`",
                    &self.unit.display(at),
                )))
            }
        }
    }

    /// Evaluate arguments left to right, pick the exact overload, and call it.
    fn process_call(
        &mut self,
        block: BlockId,
        node: NodeId,
        name: Name,
        args: &[NodeId],
    ) -> FormResult {
        let mut block = block;
        let mut evaluated: SmallVec<[ParseResult; 4]> = SmallVec::with_capacity(args.len());
        for &arg in args {
            let result = self.process(block, arg)?;
            block = result.block;
            evaluated.push(result);
        }
        let arg_types: SmallVec<[Idx; 4]> = evaluated.iter().map(|r| r.ty).collect();
        let Some(callee) = self.unit.ctx.lookup_function(name, &arg_types) else {
            let ctx = &self.unit.ctx;
            let shown: Vec<String> = arg_types.iter().map(|&ty| ctx.type_name(ty)).collect();
            let diag = errors::no_matching_function(
                self.unit.arena.span(node),
                ctx.name_str(name),
                &shown,
            );
            return Err(self.unit.ctx.error(diag));
        };
        let (backend, ret) = (callee.backend, callee.return_type);

        let values: SmallVec<[ValueId; 4]> = evaluated.iter().map(|r| r.value).collect();
        let returned = self.backend(node, |m| m.call(block, backend, &values))?;
        let value = match returned {
            Some(value) => value,
            None => self.unit.ctx.void_value(),
        };
        for arg in evaluated {
            block = self.destruct(arg.in_block(block))?.block;
        }
        Ok(ParseResult::new(block, ret, value))
    }

    // ── Shared helpers ──────────────────────────────────────────────

    /// Run a backend operation, reporting its failure at `node`.
    pub(crate) fn backend<T>(
        &mut self,
        node: NodeId,
        op: impl FnOnce(&mut IrModule) -> Result<T, BackendError>,
    ) -> FormResult<T> {
        let span = self.unit.arena.span(node);
        self.backend_at(span, op)
    }

    fn backend_at<T>(
        &mut self,
        span: Span,
        op: impl FnOnce(&mut IrModule) -> Result<T, BackendError>,
    ) -> FormResult<T> {
        op(&mut self.unit.ctx.module).map_err(|err| self.unit.ctx.report_backend(&err, span))
    }

    /// Emit cleanup for a value that is no longer needed.
    pub fn destruct(&mut self, result: ParseResult) -> FormResult {
        crate::destruct(&mut self.unit.ctx, result)
    }

    fn malformed_literal(&mut self, node: NodeId, expected: &str) -> ErrorGuaranteed {
        let span = self.unit.arena.span(node);
        let found = self.unit.display(node);
        self.unit.ctx.error(errors::unexpected_element(span, expected, "expression", &found))
    }
}

#[cfg(test)]
mod tests;
