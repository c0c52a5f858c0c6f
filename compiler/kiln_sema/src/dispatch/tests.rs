#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_support::{error_codes, name, read_into, scratch_function, unit_with};
use crate::{CompileOptions, Expansion};
use kiln_backend::Instr;
use kiln_diagnostic::ErrorCode;
use kiln_ir::{NodeArena, StringInterner};
use pretty_assertions::assert_eq;

/// Declare every form but the last, then evaluate the last in a scratch function.
fn eval(source: &str) -> (Unit, FormResult, BlockId) {
    let (mut unit, forms) = unit_with(source);
    let (decls, expr) = forms.split_at(forms.len() - 1);
    unit.process_all(decls).unwrap();
    let (func, entry) = scratch_function(&mut unit, &[]);
    let result = FormProcessor::new(&mut unit, func).process(entry, expr[0]);
    (unit, result, entry)
}

#[test]
fn integer_token_is_an_int_constant() {
    let (unit, result, entry) = eval("42");
    let r = result.unwrap();

    assert_eq!(r.ty, Idx::INT);
    assert_eq!(r.block, entry);
    assert_eq!(unit.context().module().const_int_value(r.value), Some(42));
    assert!(unit.context().module().block(entry).instrs().is_empty());
}

#[test]
fn integer_token_out_of_int_range_is_rejected() {
    let (unit, result, _) = eval("3000000000");

    assert!(result.is_err());
    assert_eq!(error_codes(&unit), vec![ErrorCode::E2006]);
}

#[test]
fn string_token_is_a_char_pointer() {
    let (mut unit, result, _) = eval("\"hello\"");
    let r = result.unwrap();

    let p_char = unit.context_mut().pool_mut().pointer_to(Idx::CHAR);
    assert_eq!(r.ty, p_char);
}

#[test]
fn true_and_false_are_bool_constants() {
    let (unit, result, _) = eval("true");
    let r = result.unwrap();
    assert_eq!(r.ty, Idx::BOOL);
    assert_eq!(unit.context().module().const_uint_value(r.value), Some(1));

    let (unit, result, _) = eval("false");
    let r = result.unwrap();
    assert_eq!(unit.context().module().const_uint_value(r.value), Some(0));
}

#[test]
fn float_token_is_a_float_constant() {
    let (_, result, _) = eval("1.5");
    assert_eq!(result.unwrap().ty, Idx::FLOAT);
}

#[test]
fn unknown_variable_is_reported() {
    let (unit, result, _) = eval("nowhere");

    assert!(result.is_err());
    assert_eq!(error_codes(&unit), vec![ErrorCode::E2003]);
}

#[test]
fn empty_list_is_reported() {
    let (unit, result, _) = eval("()");

    assert!(result.is_err());
    assert_eq!(error_codes(&unit), vec![ErrorCode::E1006]);
}

#[test]
fn slot_variable_read_loads_and_is_an_lvalue() {
    let (mut unit, _) = unit_with("");
    let forms = read_into(&mut unit, "x");
    let p_int = unit.context_mut().pool_mut().pointer_to(Idx::INT);
    let (func, entry) = scratch_function(&mut unit, &[p_int]);
    let slot = unit.context().module().param(func, 0).unwrap();
    let x = name(&unit, "x");

    let mut fp = FormProcessor::new(&mut unit, func);
    fp.bind_slot(x, Idx::INT, slot);
    let r = fp.process(entry, forms[0]).unwrap();

    assert_eq!(r.ty, Idx::INT);
    assert!(r.value_is_lvalue);
    assert_eq!(r.address_of_value, Some(slot));
    assert_eq!(r.type_of_address_of_value, Some(p_int));
    assert!(r.do_not_destruct);
    assert_eq!(
        unit.context().module().block(entry).instrs(),
        &[Instr::Load { dst: r.value, ptr: slot }]
    );
}

#[test]
fn dispatching_equal_literals_twice_gives_equal_results() {
    let (mut unit, forms) = unit_with("7 7");
    let (func, entry) = scratch_function(&mut unit, &[]);
    let mut fp = FormProcessor::new(&mut unit, func);

    let first = fp.process(entry, forms[0]).unwrap();
    let again = fp.process(entry, forms[0]).unwrap();
    let other = fp.process(entry, forms[1]).unwrap();

    let module = unit.context().module();
    for r in [again, other] {
        assert_eq!(r.ty, first.ty);
        assert_eq!(r.block, first.block);
        assert_eq!(module.const_int_value(r.value), module.const_int_value(first.value));
    }
    assert!(module.block(entry).instrs().is_empty());
}

#[test]
fn call_resolves_the_exact_overload() {
    let (unit, result, entry) = eval(
        "(def add (fn intern int ((a int) (b int)) a))
         (def add (fn intern int ((a int)) a))
         (add 1 2)",
    );
    let r = result.unwrap();

    assert_eq!(r.ty, Idx::INT);
    let module = unit.context().module();
    let [Instr::Call { callee, args, .. }] = module.block(entry).instrs() else {
        panic!("expected a single call");
    };
    assert_eq!(args.len(), 2);
    assert_eq!(module.function(*callee).symbol(), "_kiln_add$$int$Cint");
}

#[test]
fn call_without_matching_overload_is_reported() {
    let (unit, result, _) = eval(
        "(def add (fn intern int ((a int) (b int)) a))
         (add 1 true)",
    );

    assert!(result.is_err());
    assert_eq!(error_codes(&unit), vec![ErrorCode::E2007]);
    let note = &unit.context().diagnostics().diagnostics()[0].notes[0];
    assert_eq!(note, "argument types: (int bool)");
}

#[test]
fn user_function_shadows_core_form_unless_core_prefixed() {
    let (unit, result, _) = eval(
        "(def @ (fn intern int ((x int)) x))
         (@ 5)",
    );
    assert_eq!(result.unwrap().ty, Idx::INT);
    assert!(error_codes(&unit).is_empty());

    let (unit, result, _) = eval(
        "(def @ (fn intern int ((x int)) x))
         (core @ 5)",
    );
    assert!(result.is_err());
    assert_eq!(error_codes(&unit), vec![ErrorCode::E2001]);
}

#[test]
fn core_requires_a_core_form_name() {
    let (unit, result, _) = eval("(core frobnicate 1)");

    assert!(result.is_err());
    assert_eq!(error_codes(&unit), vec![ErrorCode::E1003]);
}

/// Rewrites `(keyword x)` to `x`.
fn expander_unwrapping(
    keyword: &'static str,
) -> impl FnMut(&mut NodeArena, &StringInterner, NodeId) -> Expansion + 'static {
    move |arena: &mut NodeArena, interner: &StringInterner, node: NodeId| -> Expansion {
        let items = arena.list(node).unwrap_or_default();
        match items {
            [head, arg] if arena.symbol(*head) == Some(interner.intern(keyword)) => {
                Expansion::Expanded(*arg)
            }
            _ => Expansion::NotApplicable,
        }
    }
}

#[test]
fn unrecognised_list_is_offered_to_the_expander() {
    let (unit, forms) = unit_with("(id 5)");
    let mut unit = unit.with_expander(expander_unwrapping("id"));
    let (func, entry) = scratch_function(&mut unit, &[]);

    let r = FormProcessor::new(&mut unit, func).process(entry, forms[0]).unwrap();

    assert_eq!(r.ty, Idx::INT);
    assert_eq!(unit.context().module().const_int_value(r.value), Some(5));
}

#[test]
fn runaway_expansion_stops_at_the_depth_limit() {
    let interner = StringInterner::shared();
    let mut arena = NodeArena::new();
    let forms = crate::test_support::read_all(&mut arena, &interner, "(loop)");
    let options = CompileOptions {
        max_expansion_depth: 8,
        ..CompileOptions::default()
    };
    let mut unit = Unit::new(interner, arena, &options)
        .with_expander(|_: &mut NodeArena, _: &StringInterner, node: NodeId| Expansion::Expanded(node));
    let (func, entry) = scratch_function(&mut unit, &[]);

    let result = FormProcessor::new(&mut unit, func).process(entry, forms[0]);

    assert!(result.is_err());
    assert_eq!(error_codes(&unit), vec![ErrorCode::E6001]);
}

#[test]
fn failed_expansion_is_reported() {
    let (unit, forms) = unit_with("(broken)");
    let mut unit = unit.with_expander(|_: &mut NodeArena, _: &StringInterner, _: NodeId| {
        Expansion::Failed("no clause matched".to_owned())
    });
    let (func, entry) = scratch_function(&mut unit, &[]);

    let result = FormProcessor::new(&mut unit, func).process(entry, forms[0]);

    assert!(result.is_err());
    let diags = unit.context().diagnostics().diagnostics();
    assert_eq!(diags[0].code, ErrorCode::E6001);
    assert!(diags[0].message.contains("no clause matched"));
}
