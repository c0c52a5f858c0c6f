//! `(setf dest-ptr value)`

use kiln_backend::BlockId;
use kiln_ir::NodeId;
use kiln_types::Idx;

use crate::{errors, CoreForm, FormProcessor, FormResult, ParseResult};

/// Overload consulted when assigning from an lvalue: `((dst (p T)) (src (p T))) -> bool`.
pub(crate) const SETF_COPY_ASSIGN: &str = "setf-copy-assign";

impl FormProcessor<'_> {
    /// Store `value` through `dest-ptr`. Yields `true`.
    ///
    /// Assigning from an lvalue calls a `setf-copy-assign` overload for the
    /// type when one is in scope, leaving the source intact. Values flagged
    /// `do_not_copy_with_setf`, and rvalues, are moved with a plain store.
    pub(crate) fn setf(&mut self, block: BlockId, node: NodeId, args: &[NodeId]) -> FormResult {
        self.check_args(node, CoreForm::Setf, args, 2)?;
        let dest = self.process(block, args[0])?;
        let Some(pointee) = self.unit.ctx.pool.pointee(dest.ty) else {
            let found = self.unit.ctx.type_name(dest.ty);
            return Err(self.unit.ctx.error(errors::non_pointer_deref(
                self.unit.arena.span(args[0]),
                &found,
            )));
        };
        let value = self.process(dest.block, args[1])?;
        if value.ty != pointee {
            let expected = self.unit.ctx.type_name(pointee);
            let found = self.unit.ctx.type_name(value.ty);
            return Err(self.unit.ctx.error(errors::incorrect_value_type(
                self.unit.arena.span(args[1]),
                &expected,
                &found,
            )));
        }

        let mut block = value.block;
        match self.copy_assign_for(&value, dest.ty) {
            Some((callee, source)) => {
                self.backend(node, |m| m.call(block, callee, &[dest.value, source]))?;
                block = self.destruct(value.in_block(block))?.block;
            }
            None => self.backend(node, |m| m.store(block, value.value, dest.value))?,
        }
        block = self.destruct(dest.in_block(block))?.block;

        let llty = self.unit.ctx.backend_type(Idx::BOOL);
        let done = self.unit.ctx.module.const_int(llty, 1);
        Ok(ParseResult::new(block, Idx::BOOL, done))
    }

    /// The copy-assign overload and source address to use, if `value` is copied.
    fn copy_assign_for(
        &self,
        value: &ParseResult,
        dest_ty: Idx,
    ) -> Option<(kiln_backend::FunctionId, kiln_backend::ValueId)> {
        if !value.value_is_lvalue || value.do_not_copy_with_setf {
            return None;
        }
        let source = value.address_of_value?;
        let source_ty = value.type_of_address_of_value?;
        let ctx = &self.unit.ctx;
        let name = ctx.interner().intern(SETF_COPY_ASSIGN);
        ctx.lookup_function(name, &[dest_ty, source_ty])
            .map(|f| (f.backend, source))
    }
}
