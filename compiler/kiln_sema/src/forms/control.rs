//! `do` and `if`.

use kiln_backend::BlockId;
use kiln_ir::NodeId;
use kiln_types::Idx;

use super::setf::SETF_COPY_ASSIGN;
use crate::destruct::{owns_resources, DESTROY};
use crate::{errors, CoreForm, FormProcessor, FormResult, ParseResult};

impl FormProcessor<'_> {
    /// `(do form...)`: every result but the last is destructed.
    pub(crate) fn process_do(&mut self, block: BlockId, node: NodeId, args: &[NodeId]) -> FormResult {
        let Some((&last, init)) = args.split_last() else {
            let span = self.unit.arena.span(node);
            return Err(self
                .unit
                .ctx
                .error(errors::too_few_args(span, CoreForm::Do.name(), 1, 0)));
        };
        let mut block = block;
        for &form in init {
            let result = self.process(block, form)?;
            block = self.destruct(result)?.block;
        }
        self.process(block, last)
    }

    /// `(if cond then else)`.
    ///
    /// ```text
    /// block:  br cond, then, else
    /// then:   ...; br merge
    /// else:   ...; br merge
    /// merge:  phi [then-value, then-exit], [else-value, else-exit]
    /// ```
    ///
    /// The exits are wherever the branches finished, which need not be the
    /// blocks they started in.
    pub(crate) fn process_if(&mut self, block: BlockId, node: NodeId, args: &[NodeId]) -> FormResult {
        self.check_args(node, CoreForm::If, args, 3)?;
        let cond = self.process(block, args[0])?;
        if cond.ty != Idx::BOOL {
            let found = self.unit.ctx.type_name(cond.ty);
            return Err(self.unit.ctx.error(errors::condition_not_bool(
                self.unit.arena.span(args[0]),
                &found,
            )));
        }
        let cond = self.destruct(cond)?;

        let module = &mut self.unit.ctx.module;
        let then_entry = module.append_block(self.func, "then");
        let else_entry = module.append_block(self.func, "else");
        self.backend(node, |m| m.cond_br(cond.block, cond.value, then_entry, else_entry))?;

        let then_result = self.process(then_entry, args[1])?;
        let else_result = self.process(else_entry, args[2])?;
        if then_result.ty != else_result.ty {
            let then_ty = self.unit.ctx.type_name(then_result.ty);
            let else_ty = self.unit.ctx.type_name(else_result.ty);
            return Err(self.unit.ctx.error(errors::branch_types_differ(
                self.unit.arena.span(node),
                &then_ty,
                &else_ty,
            )));
        }

        let (then_result, else_result) = self.unify_ownership(node, then_result, else_result)?;

        let merge = self.unit.ctx.module.append_block(self.func, "merge");
        self.backend(node, |m| {
            m.br(then_result.block, merge)?;
            m.br(else_result.block, merge)
        })?;
        let value = if self.unit.ctx.pool.is_void(then_result.ty) {
            self.unit.ctx.void_value()
        } else {
            self.backend(node, |m| {
                m.phi(
                    merge,
                    &[
                        (then_result.value, then_result.block),
                        (else_result.value, else_result.block),
                    ],
                )
            })?
        };
        let mut result = ParseResult::new(merge, then_result.ty, value);
        result.do_not_destruct = then_result.do_not_destruct;
        Ok(result)
    }

    /// Give both branch results the same ownership before they meet in a `phi`.
    ///
    /// When one branch owns its value and the other borrows it, the borrowed
    /// value is copied in its exit block through `setf-copy-assign`, so the
    /// merged value is owned whichever branch ran. Types without cleanup need
    /// no copy. A type with cleanup but no copy overload is rejected.
    fn unify_ownership(
        &mut self,
        node: NodeId,
        then_result: ParseResult,
        else_result: ParseResult,
    ) -> FormResult<(ParseResult, ParseResult)> {
        if then_result.do_not_destruct == else_result.do_not_destruct {
            return Ok((then_result, else_result));
        }
        let destroy = self.unit.ctx.interner().intern(DESTROY);
        if !owns_resources(&mut self.unit.ctx, destroy, then_result.ty) {
            return Ok((then_result.owned_elsewhere(), else_result.owned_elsewhere()));
        }
        if then_result.do_not_destruct {
            Ok((self.copy_borrowed(node, then_result)?, else_result))
        } else {
            Ok((then_result, self.copy_borrowed(node, else_result)?))
        }
    }

    /// An owned copy of `borrowed`, emitted at the end of its block.
    fn copy_borrowed(&mut self, node: NodeId, borrowed: ParseResult) -> FormResult {
        let ty = borrowed.ty;
        let ptr_ty = self.unit.ctx.pool.pointer_to(ty);
        let copy_assign = self.unit.ctx.interner().intern(SETF_COPY_ASSIGN);
        let Some(copy) = self
            .unit
            .ctx
            .lookup_function(copy_assign, &[ptr_ty, ptr_ty])
            .map(|f| f.backend)
        else {
            let found = self.unit.ctx.type_name(ty);
            return Err(self.unit.ctx.error(errors::branch_ownership_differs(
                self.unit.arena.span(node),
                &found,
            )));
        };

        let llty = self.unit.ctx.backend_type(ty);
        let block = borrowed.block;
        let value = self.backend(node, |m| {
            let source = m.alloca(block, llty)?;
            m.store(block, borrowed.value, source)?;
            let fresh = m.alloca(block, llty)?;
            m.call(block, copy, &[fresh, source])?;
            m.load(block, fresh)
        })?;
        Ok(ParseResult::new(block, ty, value))
    }
}
