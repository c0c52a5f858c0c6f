//! Functions every enum gets at declaration time.
//!
//! For `(def E (enum linkage T ...))` in the current namespace:
//!
//! | Function | Signature | Body |
//! |----------|-----------|------|
//! | constructor | `(E (value T)) -> E` | wrap `value` in the backing struct |
//! | conversion | `(T (value E)) -> T` | read the backing member |
//! | `= != < <= > >=` | `((a E) (b E)) -> bool` | compare backing members |
//!
//! All of them take the enum's linkage. Comparisons use signed or unsigned
//! predicates to match `T`.

use kiln_backend::{BackendError, BlockId, IntPredicate, IrModule, ValueId};
use kiln_ir::{Name, Span};
use kiln_types::Idx;
use smallvec::smallvec;

use crate::{Context, FormResult, Linkage, Param};

/// Operator name, signed predicate, unsigned predicate.
const COMPARISONS: [(&str, IntPredicate, IntPredicate); 6] = [
    ("=", IntPredicate::Eq, IntPredicate::Eq),
    ("!=", IntPredicate::Ne, IntPredicate::Ne),
    ("<", IntPredicate::Slt, IntPredicate::Ult),
    ("<=", IntPredicate::Sle, IntPredicate::Ule),
    (">", IntPredicate::Sgt, IntPredicate::Ugt),
    (">=", IntPredicate::Sge, IntPredicate::Uge),
];

pub(crate) fn register_enum(
    ctx: &mut Context,
    name: Name,
    enum_ty: Idx,
    underlying: Idx,
    linkage: Linkage,
    span: Span,
) -> FormResult<()> {
    let value = ctx.interner().intern("value");
    let a = ctx.interner().intern("a");
    let b = ctx.interner().intern("b");

    let backing = ctx.backend_type(enum_ty);
    let sig = Signature {
        name,
        params: smallvec![Param {
            name: value,
            ty: underlying
        }],
        ret: enum_ty,
        linkage,
    };
    emit(ctx, sig, span, |m, block, args| {
        let empty = m.undef(backing);
        m.insert_value(block, empty, args[0], 0)
    })?;

    let conversion = ctx.interner().intern(&ctx.type_name(underlying));
    let sig = Signature {
        name: conversion,
        params: smallvec![Param {
            name: value,
            ty: enum_ty
        }],
        ret: underlying,
        linkage,
    };
    emit(ctx, sig, span, |m, block, args| m.extract_value(block, args[0], 0))?;

    let signed = ctx.pool().is_signed(underlying);
    for (op, signed_pred, unsigned_pred) in COMPARISONS {
        let pred = if signed { signed_pred } else { unsigned_pred };
        let sig = Signature {
            name: ctx.interner().intern(op),
            params: smallvec![
                Param { name: a, ty: enum_ty },
                Param { name: b, ty: enum_ty }
            ],
            ret: Idx::BOOL,
            linkage,
        };
        emit(ctx, sig, span, |m, block, args| {
            let lhs = m.extract_value(block, args[0], 0)?;
            let rhs = m.extract_value(block, args[1], 0)?;
            m.icmp(block, pred, lhs, rhs)
        })?;
    }
    Ok(())
}

struct Signature {
    name: Name,
    params: smallvec::SmallVec<[Param; 4]>,
    ret: Idx,
    linkage: Linkage,
}

/// Declare one function and give it a single-block body returning `body`'s value.
fn emit(
    ctx: &mut Context,
    sig: Signature,
    span: Span,
    body: impl FnOnce(&mut IrModule, BlockId, &[ValueId]) -> Result<ValueId, BackendError>,
) -> FormResult<()> {
    let func = ctx.declare_function(sig.name, sig.params, sig.ret, sig.linkage, span)?;
    let module = ctx.module_mut();
    let entry = module.append_block(func, "entry");
    let args = module.function(func).params().to_vec();
    let emitted = body(module, entry, &args).and_then(|v| module.ret(entry, Some(v)));
    if let Err(err) = emitted {
        module.finish_function(func);
        return Err(ctx.report_backend(&err, span));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
