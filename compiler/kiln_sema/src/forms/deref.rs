//! `@` and `#`.

use kiln_backend::BlockId;
use kiln_ir::NodeId;

use crate::{errors, CoreForm, FormProcessor, FormResult, ParseResult};

impl FormProcessor<'_> {
    /// `(@ ptr)`.
    ///
    /// Loads the pointee and returns it as an lvalue whose address is the
    /// pointer. With `get_address` nothing is loaded and the pointer itself
    /// comes back unchanged; `(# (@ p))` uses this.
    pub(crate) fn dereference(
        &mut self,
        block: BlockId,
        node: NodeId,
        args: &[NodeId],
        get_address: bool,
        prefixed_with_core: bool,
    ) -> FormResult {
        self.check_args(node, CoreForm::Deref, args, 1)?;
        let ptr = self.process(block, args[0])?;

        let Some(pointee) = self.unit.ctx.pool.pointee(ptr.ty) else {
            let found = self.unit.ctx.type_name(ptr.ty);
            return Err(self.unit.ctx.error(errors::non_pointer_deref(
                self.unit.arena.span(args[0]),
                &found,
            )));
        };
        if self.unit.ctx.pool.is_void(pointee) {
            return Err(self
                .unit
                .ctx
                .error(errors::void_pointer_deref(self.unit.arena.span(args[0]))));
        }

        let mut result = if get_address {
            ParseResult::new(ptr.block, ptr.ty, ptr.value)
        } else {
            let loaded = self.backend(node, |m| m.load(ptr.block, ptr.value))?;
            ParseResult::new(ptr.block, pointee, loaded)
                .with_lvalue(ptr.value, ptr.ty)
                .owned_elsewhere()
        };
        result.do_not_copy_with_setf = prefixed_with_core;

        let cleaned = self.destruct(ptr)?;
        Ok(result.in_block(cleaned.block))
    }

    /// `(# x)`: the storage address of lvalue `x`.
    ///
    /// `(# (@ p))` is `p` itself, with no load emitted, unless a function
    /// named `@` shadows the core form.
    pub(crate) fn address_of(&mut self, block: BlockId, node: NodeId, args: &[NodeId]) -> FormResult {
        self.check_args(node, CoreForm::AddressOf, args, 1)?;
        let operand = args[0];

        let inner = self.unit.items(operand).unwrap_or_default();
        let is_deref = inner
            .first()
            .and_then(|&head| self.unit.arena.symbol(head))
            .filter(|&name| self.unit.forms.get(&name) == Some(&CoreForm::Deref))
            .is_some_and(|name| !self.unit.ctx.has_function_named(name));
        if is_deref {
            return self.dereference(block, operand, &inner[1..], true, false);
        }

        let value = self.process(block, operand)?;
        let (Some(address), Some(address_ty)) =
            (value.address_of_value, value.type_of_address_of_value)
        else {
            return Err(self
                .unit
                .ctx
                .error(errors::address_of_non_lvalue(self.unit.arena.span(operand))));
        };
        Ok(ParseResult::new(value.block, address_ty, address).owned_elsewhere())
    }
}
