#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_support::{read_into, scratch_function, unit_with};
use crate::{FormProcessor, Unit};
use kiln_backend::{FunctionId, Instr, Terminator};
use pretty_assertions::assert_eq;

fn declared(source: &str) -> Unit {
    let (mut unit, forms) = unit_with(source);
    unit.process_all(&forms).unwrap();
    unit
}

fn function(unit: &Unit, symbol: &str) -> FunctionId {
    unit.context()
        .module()
        .lookup_function(symbol)
        .unwrap_or_else(|| panic!("`{symbol}` was not emitted"))
}

fn entry_instrs<'u>(unit: &'u Unit, symbol: &str) -> &'u [Instr] {
    let module = unit.context().module();
    let func = module.function(function(unit, symbol));
    assert_eq!(func.blocks().len(), 1, "{symbol}");
    module.block(func.blocks()[0]).instrs()
}

fn comparison_predicate(unit: &Unit, symbol: &str) -> IntPredicate {
    match entry_instrs(unit, symbol) {
        [Instr::ExtractValue { .. }, Instr::ExtractValue { .. }, Instr::ICmp { pred, .. }] => *pred,
        other => panic!("unexpected body for `{symbol}`: {other:?}"),
    }
}

#[test]
fn every_enum_gets_constructor_conversion_and_comparisons() {
    let unit = declared("(def E (enum intern int (a b)))");

    let ctor = entry_instrs(&unit, "_kiln_E$$int");
    assert!(matches!(ctor, [Instr::InsertValue { index: 0, .. }]));
    let conv = entry_instrs(&unit, "_kiln_int$$E");
    assert!(matches!(conv, [Instr::ExtractValue { index: 0, .. }]));
    for op in ["$EQ", "$BG$EQ", "$LT", "$LT$EQ", "$GT", "$GT$EQ"] {
        let symbol = format!("_kiln_{op}$$E$CE");
        let module = unit.context().module();
        let func = module.function(function(&unit, &symbol));
        assert_eq!(func.params().len(), 2);
        assert_eq!(module.int_width(func.ret()), Some(1), "{symbol}");
    }
}

#[test]
fn generated_functions_return_their_value() {
    let unit = declared("(def E (enum extern int (a)))");
    let module = unit.context().module();

    for symbol in ["_kiln_E$$int", "_kiln_int$$E", "_kiln_$EQ$$E$CE"] {
        let func = module.function(function(&unit, symbol));
        assert_eq!(func.linkage(), kiln_backend::Linkage::External);
        let entry = module.block(func.blocks()[0]);
        let returned = entry.instrs().last().and_then(Instr::dst);
        assert_eq!(entry.terminator(), Some(&Terminator::Ret(returned)));
    }
}

#[test]
fn comparisons_follow_the_signedness_of_the_underlying_type() {
    let unit = declared(
        "(def S (enum intern int8 (a)))
         (def U (enum intern uint8 (a)))",
    );

    assert_eq!(comparison_predicate(&unit, "_kiln_$LT$$S$CS"), IntPredicate::Slt);
    assert_eq!(comparison_predicate(&unit, "_kiln_$LT$$U$CU"), IntPredicate::Ult);
    assert_eq!(comparison_predicate(&unit, "_kiln_$GT$EQ$$U$CU"), IntPredicate::Uge);
    assert_eq!(comparison_predicate(&unit, "_kiln_$EQ$$U$CU"), IntPredicate::Eq);
}

#[test]
fn generated_functions_live_in_the_enum_namespace() {
    let unit = declared("(namespace gfx (def Colour (enum intern int (red))))");

    function(&unit, "_kiln_gfx$Colour$$int");
    function(&unit, "_kiln_gfx$int$$gfx$DTColour");
}

#[test]
fn comparing_enum_values_yields_bool() {
    let mut unit = declared("(def E (enum intern int (a b)))");
    let node = read_into(&mut unit, "(< (E 1) (E 2))")[0];
    let (func, entry) = scratch_function(&mut unit, &[]);

    let r = FormProcessor::new(&mut unit, func).process(entry, node).unwrap();

    assert_eq!(r.ty, Idx::BOOL);
}

#[test]
fn enums_do_not_compare_with_their_underlying_type() {
    let mut unit = declared("(def E (enum intern int (a b)))");
    let node = read_into(&mut unit, "(= (E 1) (int (E 2)))")[0];
    let (func, entry) = scratch_function(&mut unit, &[]);

    assert!(FormProcessor::new(&mut unit, func).process(entry, node).is_err());
    assert_eq!(
        crate::test_support::error_codes(&unit),
        vec![kiln_diagnostic::ErrorCode::E2007]
    );
}
