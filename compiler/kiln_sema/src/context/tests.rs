use super::*;
use crate::{EnumBuilder, Linkage};
use kiln_backend::LlType;
use kiln_ir::StringInterner;
use pretty_assertions::assert_eq;

fn context() -> Context {
    Context::new(StringInterner::shared(), &CompileOptions::default())
}

fn enum_of(ty: Idx) -> Enum {
    EnumBuilder::new(32, true).finish(Linkage::Intern, None, ty, Idx::INT)
}

#[test]
fn namespaces_nest_and_reuse_children() {
    let mut ctx = context();
    let gfx = ctx.interner().intern("gfx");
    let colour = ctx.interner().intern("colour");

    let outer = ctx.activate_namespace(gfx);
    let inner = ctx.activate_namespace(colour);
    assert_eq!(ctx.namespace_path(), &[gfx, colour]);

    ctx.deactivate_namespace();
    ctx.deactivate_namespace();
    ctx.deactivate_namespace();
    assert_eq!(ctx.current_namespace(), NamespaceId::ROOT);

    assert_eq!(ctx.activate_namespace(gfx), outer);
    assert_eq!(ctx.activate_namespace(colour), inner);
}

#[test]
fn lookup_walks_outwards_and_inner_shadows_outer() {
    let mut ctx = context();
    let e = ctx.interner().intern("E");
    let ns = ctx.interner().intern("ns");
    let outer_ty = ctx.pool_mut().named_enum(e, &[]);
    let inner_ty = ctx.pool_mut().named_enum(e, &[ns]);

    assert!(ctx.add_enum(e, enum_of(outer_ty)));
    ctx.activate_namespace(ns);
    assert_eq!(ctx.lookup_type(e), Some(outer_ty));

    assert!(ctx.add_enum(e, enum_of(inner_ty)));
    assert_eq!(ctx.lookup_type(e), Some(inner_ty));

    ctx.deactivate_namespace();
    assert_eq!(ctx.lookup_type(e), Some(outer_ty));
}

#[test]
fn add_enum_refuses_a_taken_name_and_keeps_the_first() {
    let mut ctx = context();
    let e = ctx.interner().intern("E");
    let first = ctx.pool_mut().named_enum(e, &[]);

    assert!(ctx.add_enum(e, enum_of(first)));
    assert!(!ctx.add_enum(e, enum_of(Idx::NONE)));
    assert_eq!(ctx.lookup_enum(e).map(|en| en.ty), Some(first));
}

#[test]
fn primitive_names_resolve_without_declarations() {
    let ctx = context();
    let int = ctx.interner().intern("int");
    let unknown = ctx.interner().intern("Unknown");

    assert_eq!(ctx.lookup_type(int), Some(Idx::INT));
    assert_eq!(ctx.lookup_type(unknown), None);
}

#[test]
fn symbols_carry_the_namespace_path() {
    let mut ctx = context();
    let gfx = ctx.interner().intern("gfx");
    let colour = ctx.interner().intern("Colour");
    let eq = ctx.interner().intern("=");

    assert_eq!(ctx.name_to_symbol(colour), "_kiln_Colour");
    ctx.activate_namespace(gfx);
    assert_eq!(ctx.name_to_symbol(colour), "_kiln_gfx$Colour");
    assert_eq!(ctx.struct_symbol(colour), "struct__kiln_gfx$Colour");
    assert_eq!(
        ctx.function_symbol(eq, &[Idx::INT, Idx::INT]),
        "_kiln_gfx$$EQ$$int$Cint"
    );
}

#[test]
fn backend_types_follow_target_widths() {
    let mut ctx = context();
    let p_void = ctx.pool_mut().pointer_to(Idx::VOID);
    let p_int = ctx.pool_mut().pointer_to(Idx::INT);

    let int = ctx.backend_type(Idx::INT);
    let size = ctx.backend_type(Idx::SIZE);
    let boolean = ctx.backend_type(Idx::BOOL);
    let opaque = ctx.backend_type(p_void);
    let ptr = ctx.backend_type(p_int);

    let m = ctx.module();
    assert_eq!(m.llty(int), &LlType::Int(32));
    assert_eq!(m.llty(size), &LlType::Int(64));
    assert_eq!(m.llty(boolean), &LlType::Int(1));
    assert_eq!(m.type_name(opaque), "i8*");
    assert_eq!(m.pointee(ptr), Some(int));
}

#[test]
fn errors_are_queued() {
    let mut ctx = context();
    let _ = ctx.error(crate::errors::empty_list(Span::new(1, 3)));

    assert_eq!(ctx.diagnostics().error_count(), 1);
    assert!(ctx.diagnostics().has_errors().is_some());
}
