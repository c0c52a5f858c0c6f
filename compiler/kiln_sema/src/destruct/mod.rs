//! Value cleanup.
//!
//! A type owns resources when a `destroy` overload taking a pointer to it
//! is in scope. A struct without one is cleaned up member by member, for
//! the members that own resources themselves. Everything else needs
//! nothing.
//!
//! Every handler that drops an intermediate value passes it through
//! [`destruct`] first.

use kiln_backend::{BackendError, BlockId, FunctionId, ValueId};
use kiln_ir::Name;
use kiln_types::Idx;

use crate::stack::ensure_sufficient_stack;
use crate::{errors, Context, FormResult, ParseResult};

/// Name of the destructor overload: `destroy ((value (p T))) -> void`.
pub(crate) const DESTROY: &str = "destroy";

/// Emit cleanup for `result` and return it positioned after the cleanup.
///
/// Results flagged `do_not_destruct` come back unchanged.
pub fn destruct(ctx: &mut Context, result: ParseResult) -> FormResult {
    if result.do_not_destruct {
        return Ok(result);
    }
    let destroy = ctx.interner().intern(DESTROY);
    let block = destruct_value(ctx, destroy, result.block, result.ty, result.value)?;
    Ok(result.in_block(block))
}

fn destruct_value(
    ctx: &mut Context,
    destroy: Name,
    block: BlockId,
    ty: Idx,
    value: ValueId,
) -> FormResult<BlockId> {
    ensure_sufficient_stack(|| {
        if let Some(dtor) = destructor_for(ctx, destroy, ty) {
            tracing::trace!(ty = %ctx.type_name(ty), "calling destructor");
            let llty = ctx.backend_type(ty);
            return call_destructor(ctx, block, llty, value, dtor)
                .map(|()| block)
                .map_err(|err| ctx.error(errors::destructor_failed(&err.to_string())));
        }

        let members: Vec<Idx> = match ctx.struct_of_type(ty) {
            Some(s) => s.members.iter().map(|&(_, member)| member).collect(),
            None => return Ok(block),
        };
        let mut block = block;
        for (index, member) in members.into_iter().enumerate() {
            if !owns_resources(ctx, destroy, member) {
                continue;
            }
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let field = ctx
                .module_mut()
                .extract_value(block, value, index)
                .map_err(|err| ctx.error(errors::destructor_failed(&err.to_string())))?;
            block = destruct_value(ctx, destroy, block, member, field)?;
        }
        Ok(block)
    })
}

fn call_destructor(
    ctx: &mut Context,
    block: BlockId,
    llty: kiln_backend::LlTypeId,
    value: ValueId,
    dtor: FunctionId,
) -> Result<(), BackendError> {
    let module = ctx.module_mut();
    let slot = module.alloca(block, llty)?;
    module.store(block, value, slot)?;
    module.call(block, dtor, &[slot])?;
    Ok(())
}

fn destructor_for(ctx: &mut Context, destroy: Name, ty: Idx) -> Option<FunctionId> {
    if ctx.pool().is_void(ty) {
        return None;
    }
    let ptr = ctx.pool_mut().pointer_to(ty);
    ctx.lookup_function(destroy, &[ptr]).map(|f| f.backend)
}

/// Whether destructing a `ty` emits anything.
pub(crate) fn owns_resources(ctx: &mut Context, destroy: Name, ty: Idx) -> bool {
    if destructor_for(ctx, destroy, ty).is_some() {
        return true;
    }
    let members: Vec<Idx> = match ctx.struct_of_type(ty) {
        Some(s) => s.members.iter().map(|&(_, member)| member).collect(),
        None => return false,
    };
    members
        .into_iter()
        .any(|member| owns_resources(ctx, destroy, member))
}
