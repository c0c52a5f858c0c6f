#![allow(clippy::unwrap_used)]

use super::*;
use kiln_backend::IrModule;
use kiln_types::TargetInfo;
use pretty_assertions::assert_eq;

fn handles() -> (IrModule, BlockId, ValueId, ValueId) {
    let mut m = IrModule::new("test");
    let i32_ty = m.int_type(32);
    let ptr_ty = m.pointer_to(i32_ty);
    let func = m
        .declare_function("f", &[ptr_ty], i32_ty, kiln_backend::Linkage::Internal)
        .unwrap();
    let entry = m.append_block(func, "entry");
    let ptr = m.param(func, 0).unwrap();
    let loaded = m.load(entry, ptr).unwrap();
    (m, entry, ptr, loaded)
}

#[test]
fn rvalue_has_no_address() {
    let pool = Pool::new(TargetInfo::default());
    let (_, entry, _, loaded) = handles();
    let r = ParseResult::new(entry, Idx::INT, loaded);

    assert!(!r.value_is_lvalue);
    assert_eq!(r.address_of_value, None);
    assert!(r.is_consistent(&pool));
}

#[test]
fn lvalue_address_type_points_to_value_type() {
    let mut pool = Pool::new(TargetInfo::default());
    let p_int = pool.pointer_to(Idx::INT);
    let p_char = pool.pointer_to(Idx::CHAR);
    let (_, entry, ptr, loaded) = handles();

    let good = ParseResult::new(entry, Idx::INT, loaded).with_lvalue(ptr, p_int);
    let bad = ParseResult::new(entry, Idx::INT, loaded).with_lvalue(ptr, p_char);

    assert!(good.is_consistent(&pool));
    assert!(!bad.is_consistent(&pool));
}

#[test]
fn half_set_lvalue_is_inconsistent() {
    let pool = Pool::new(TargetInfo::default());
    let (_, entry, ptr, loaded) = handles();
    let mut r = ParseResult::new(entry, Idx::INT, loaded);
    r.address_of_value = Some(ptr);

    assert!(!r.is_consistent(&pool));
}

#[test]
fn builders_only_touch_their_field() {
    let (mut m, entry, _, loaded) = handles();
    let func = m.block(entry).func();
    let next = m.append_block(func, "next");
    let r = ParseResult::new(entry, Idx::INT, loaded)
        .owned_elsewhere()
        .in_block(next);

    assert_eq!(r.block, next);
    assert!(r.do_not_destruct);
    assert!(!r.do_not_copy_with_setf);
    assert_eq!(r.value, loaded);
}
