#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_support::{error_codes, name, read_into, scratch_function, unit_with};
use crate::{ParseResult, Unit};
use kiln_backend::{FunctionId, Instr, Terminator, ValueId};
use kiln_diagnostic::ErrorCode;
use kiln_types::Idx;
use pretty_assertions::assert_eq;

#[test]
fn core_form_names_round_trip() {
    for form in CoreForm::ALL {
        assert_eq!(CoreForm::from_name(form.name()), Some(form));
    }
    assert_eq!(CoreForm::from_name("def"), None);
}

/// Variables bound as plain values in a scratch function.
struct Fixture {
    unit: Unit,
    func: FunctionId,
    entry: kiln_backend::BlockId,
    vars: Vec<(kiln_ir::Name, Idx, ValueId)>,
}

impl Fixture {
    /// `decls` are top-level forms; `vars` are `(name, type)` pairs where the
    /// type is given as source text.
    fn new(decls: &str, vars: &[(&str, &str)]) -> Self {
        let (mut unit, forms) = unit_with(decls);
        unit.process_all(&forms).unwrap();
        let mut tys = Vec::new();
        for (_, ty) in vars {
            let node = read_into(&mut unit, ty)[0];
            tys.push(unit.resolve_type(node).unwrap());
        }
        let (func, entry) = scratch_function(&mut unit, &tys);
        let vars = vars
            .iter()
            .zip(tys)
            .enumerate()
            .map(|(i, ((var, _), ty))| {
                let value = unit.context().module().param(func, i).unwrap();
                (name(&unit, var), ty, value)
            })
            .collect();
        Fixture {
            unit,
            func,
            entry,
            vars,
        }
    }

    fn eval(&mut self, source: &str) -> FormResult {
        let node = read_into(&mut self.unit, source)[0];
        let mut fp = FormProcessor::new(&mut self.unit, self.func);
        for &(var, ty, value) in &self.vars {
            fp.bind_value(var, ty, value);
        }
        fp.process(self.entry, node)
    }

    fn var(&self, index: usize) -> ValueId {
        self.vars[index].2
    }

    fn instrs(&self) -> &[Instr] {
        self.unit.context().module().block(self.entry).instrs()
    }

    fn codes(&self) -> Vec<ErrorCode> {
        error_codes(&self.unit)
    }

    fn pointer_to(&mut self, ty: Idx) -> Idx {
        self.unit.context_mut().pool_mut().pointer_to(ty)
    }
}

// ── @ ──────────────────────────────────────────────────────────────

#[test]
fn deref_loads_the_pointee_as_an_lvalue() {
    let mut f = Fixture::new("", &[("p", "(p int)")]);
    let p_int = f.pointer_to(Idx::INT);

    let r = f.eval("(@ p)").unwrap();

    assert_eq!(r.ty, Idx::INT);
    assert!(r.value_is_lvalue);
    assert_eq!(r.address_of_value, Some(f.var(0)));
    assert_eq!(r.type_of_address_of_value, Some(p_int));
    assert!(!r.do_not_copy_with_setf);
    assert_eq!(f.instrs(), &[Instr::Load { dst: r.value, ptr: f.var(0) }]);
}

#[test]
fn deref_of_non_pointer_names_the_type() {
    let mut f = Fixture::new("", &[("n", "uint16")]);

    assert!(f.eval("(@ n)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2001]);
    let message = &f.unit.context().diagnostics().diagnostics()[0].message;
    assert_eq!(message, "cannot dereference non-pointer type `uint16`");
    assert!(f.instrs().is_empty());
}

#[test]
fn deref_of_void_pointer_fails_in_both_modes() {
    let mut f = Fixture::new("", &[("q", "(p void)")]);

    assert!(f.eval("(@ q)").is_err());
    assert!(f.eval("(# (@ q))").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2002, ErrorCode::E2002]);
}

#[test]
fn deref_checks_arity() {
    let mut f = Fixture::new("", &[("p", "(p int)")]);

    assert!(f.eval("(@ p p)").is_err());
    assert!(f.eval("(@)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E1001, ErrorCode::E1001]);
}

#[test]
fn address_mode_returns_the_pointer_unchanged() {
    let mut f = Fixture::new("", &[("p", "(p int)")]);
    let p_int = f.pointer_to(Idx::INT);

    let r = f.eval("(# (@ p))").unwrap();

    assert_eq!(r.ty, p_int);
    assert_eq!(r.value, f.var(0));
    assert!(f.instrs().is_empty());
}

#[test]
fn core_prefixed_deref_skips_copy_on_setf() {
    let mut f = Fixture::new("", &[("p", "(p int)")]);

    let plain = f.eval("(@ p)").unwrap();
    let core = f.eval("(core @ p)").unwrap();

    assert!(!plain.do_not_copy_with_setf);
    assert!(core.do_not_copy_with_setf);
    assert_eq!(core.ty, plain.ty);
}

#[test]
fn deref_of_deref_follows_two_pointers() {
    let mut f = Fixture::new("", &[("pp", "(p (p int))")]);

    let r = f.eval("(@ (@ pp))").unwrap();

    assert_eq!(r.ty, Idx::INT);
    assert_eq!(f.instrs().len(), 2);
}

const OWNED_POINTER: &str = "
    (def mkptr (fn intern (p int) ()))
    (def destroy (fn intern void ((q (p (p int))))))";

#[test]
fn deref_destroys_an_owned_pointer_after_loading() {
    let mut f = Fixture::new(OWNED_POINTER, &[]);

    let r = f.eval("(@ (mkptr))").unwrap();

    assert_eq!(r.ty, Idx::INT);
    assert_eq!(r.block, f.entry);
    let module = f.unit.context().module();
    let [Instr::Call { dst: Some(ptr), .. }, Instr::Load { dst: loaded, ptr: from }, Instr::Alloca { dst: slot, .. }, Instr::Store { value, ptr: into }, Instr::Call { callee, args, .. }] =
        f.instrs()
    else {
        panic!("expected call, load, then cleanup; got {:?}", f.instrs());
    };
    assert_eq!(*loaded, r.value);
    assert_eq!(from, ptr);
    assert_eq!((value, into), (ptr, slot));
    assert_eq!(args.as_slice(), &[*slot]);
    assert_eq!(
        module.function(*callee).symbol(),
        "_kiln_destroy$$$LPp_$LPp_int$RP$RP"
    );
}

#[test]
fn deref_continues_from_the_block_its_pointer_ended_in() {
    let mut f = Fixture::new(OWNED_POINTER, &[("c", "bool")]);

    let r = f.eval("(@ (if c (mkptr) (mkptr)))").unwrap();

    assert_ne!(r.block, f.entry);
    let module = f.unit.context().module();
    assert_eq!(module.block(r.block).label(), "merge");
    assert!(matches!(
        module.block(r.block).instrs(),
        [
            Instr::Phi { .. },
            Instr::Load { .. },
            Instr::Alloca { .. },
            Instr::Store { .. },
            Instr::Call { .. }
        ]
    ));
}

// ── # ──────────────────────────────────────────────────────────────

#[test]
fn address_of_lvalue_is_its_storage() {
    let mut f = Fixture::new("", &[("p", "(p int)")]);
    let p_int = f.pointer_to(Idx::INT);
    let node = read_into(&mut f.unit, "(# x)")[0];
    let x = name(&f.unit, "x");
    let slot = f.var(0);

    let mut fp = FormProcessor::new(&mut f.unit, f.func);
    fp.bind_slot(x, Idx::INT, slot);
    let r = fp.process(f.entry, node).unwrap();

    assert_eq!(r.ty, p_int);
    assert_eq!(r.value, slot);
    assert!(!r.value_is_lvalue);
}

#[test]
fn address_of_rvalue_is_rejected() {
    let mut f = Fixture::new("", &[]);

    assert!(f.eval("(# 5)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2008]);
}

#[test]
fn address_of_deref_defers_to_a_shadowing_function() {
    let mut f = Fixture::new("(def @ (fn intern int ((q (p int)))))", &[("p", "(p int)")]);

    assert!(f.eval("(# (@ p))").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2008]);
    assert!(matches!(f.instrs(), [Instr::Call { .. }]));
}

// ── setf ───────────────────────────────────────────────────────────

#[test]
fn setf_stores_through_the_pointer() {
    let mut f = Fixture::new("", &[("p", "(p int)")]);

    let r = f.eval("(setf p 5)").unwrap();

    assert_eq!(r.ty, Idx::BOOL);
    let [Instr::Store { value, ptr }] = f.instrs() else {
        panic!("expected one store, got {:?}", f.instrs());
    };
    assert_eq!(*ptr, f.var(0));
    assert_eq!(f.unit.context().module().const_int_value(*value), Some(5));
}

#[test]
fn setf_rejects_mismatched_value() {
    let mut f = Fixture::new("", &[("p", "(p int)")]);

    assert!(f.eval("(setf p true)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2012]);
}

#[test]
fn setf_rejects_non_pointer_destination() {
    let mut f = Fixture::new("", &[]);

    assert!(f.eval("(setf 1 2)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2001]);
}

const COPYABLE: &str = "
    (def S (struct intern ((v int))))
    (def setf-copy-assign (fn intern bool ((dst (p S)) (src (p S)))))";

#[test]
fn setf_from_lvalue_calls_copy_assign() {
    let mut f = Fixture::new(COPYABLE, &[("d", "(p S)"), ("s", "(p S)")]);

    f.eval("(setf d (@ s))").unwrap();

    let calls: Vec<_> = f
        .instrs()
        .iter()
        .filter_map(|i| match i {
            Instr::Call { callee, args, .. } => Some((*callee, args.to_vec())),
            _ => None,
        })
        .collect();
    assert_eq!(calls.len(), 1);
    let (callee, args) = &calls[0];
    assert_eq!(
        f.unit.context().module().function(*callee).symbol(),
        "_kiln_setf$Dcopy$Dassign$$$LPp_S$RP$C$LPp_S$RP"
    );
    assert_eq!(args, &vec![f.var(0), f.var(1)]);
}

#[test]
fn setf_from_core_deref_stores_without_copy() {
    let mut f = Fixture::new(COPYABLE, &[("d", "(p S)"), ("s", "(p S)")]);

    f.eval("(setf d (core @ s))").unwrap();

    assert!(f.instrs().iter().all(|i| !matches!(i, Instr::Call { .. })));
    assert!(matches!(f.instrs().last(), Some(Instr::Store { .. })));
}

// ── do / if ────────────────────────────────────────────────────────

#[test]
fn do_yields_its_last_form() {
    let mut f = Fixture::new("", &[]);

    let r = f.eval("(do 1 2 3)").unwrap();

    assert_eq!(f.unit.context().module().const_int_value(r.value), Some(3));
}

#[test]
fn empty_do_is_rejected() {
    let mut f = Fixture::new("", &[]);

    assert!(f.eval("(do)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E1002]);
}

#[test]
fn if_branches_and_merges_with_phi() {
    let mut f = Fixture::new("", &[("c", "bool")]);

    let r: ParseResult = f.eval("(if c 1 2)").unwrap();

    assert_eq!(r.ty, Idx::INT);
    assert_ne!(r.block, f.entry);
    let module = f.unit.context().module();
    let Some(Terminator::CondBr { then_block, else_block, .. }) = module.block(f.entry).terminator()
    else {
        panic!("entry should end in a conditional branch");
    };
    for branch in [*then_block, *else_block] {
        assert_eq!(module.block(branch).terminator(), Some(&Terminator::Br(r.block)));
    }
    assert!(matches!(
        module.block(r.block).instrs(),
        [Instr::Phi { dst, incoming }] if *dst == r.value && incoming.len() == 2
    ));
}

#[test]
fn nested_if_merges_from_the_inner_exit_block() {
    let mut f = Fixture::new("", &[("c", "bool")]);

    let r = f.eval("(if c (if c 1 2) 3)").unwrap();

    let module = f.unit.context().module();
    let [Instr::Phi { incoming, .. }] = module.block(r.block).instrs() else {
        panic!("expected a phi");
    };
    let (inner_value, inner_exit) = incoming[0];
    assert_eq!(module.block(inner_exit).label(), "merge");
    assert!(matches!(module.block(inner_exit).instrs(), [Instr::Phi { dst, .. }] if *dst == inner_value));
}

#[test]
fn if_requires_a_bool_condition() {
    let mut f = Fixture::new("", &[]);

    assert!(f.eval("(if 1 2 3)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2010]);
}

#[test]
fn if_branches_must_agree() {
    let mut f = Fixture::new("", &[]);

    assert!(f.eval("(if true 1 \"one\")").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E2009]);
}

const HANDLE: &str = "
    (def Handle (struct intern ((fd int))))
    (def destroy (fn intern void ((h (p Handle)))))
    (def mk (fn intern Handle ()))";

const HANDLE_COPY: &str = "
    (def setf-copy-assign (fn intern bool ((dst (p Handle)) (src (p Handle)))))";

#[test]
fn if_copies_a_borrowed_branch_merged_with_an_owned_one() {
    let mut f = Fixture::new(&format!("{HANDLE}{HANDLE_COPY}"), &[("h", "Handle"), ("c", "bool")]);

    let r = f.eval("(do (if c h (mk)) 0)").unwrap();

    let module = f.unit.context().module();
    let [Instr::Phi { dst: merged, incoming }, Instr::Alloca { .. }, Instr::Store { value: destroyed, .. }, Instr::Call { .. }] =
        module.block(r.block).instrs()
    else {
        panic!("expected the merged value to be destroyed once");
    };
    assert_eq!(destroyed, merged);

    let (then_value, then_exit) = incoming[0];
    assert_ne!(then_value, f.var(0));
    let [Instr::Alloca { .. }, Instr::Store { value: source, .. }, Instr::Alloca { .. }, Instr::Call { callee, .. }, Instr::Load { dst: copied, .. }] =
        module.block(then_exit).instrs()
    else {
        panic!("expected the borrowed branch to be copied");
    };
    assert_eq!(*source, f.var(0));
    assert_eq!(*copied, then_value);
    assert_eq!(
        module.function(*callee).symbol(),
        "_kiln_setf$Dcopy$Dassign$$$LPp_Handle$RP$C$LPp_Handle$RP"
    );
}

#[test]
fn if_rejects_mixed_ownership_without_a_copy() {
    let mut f = Fixture::new(HANDLE, &[("h", "Handle"), ("c", "bool")]);

    assert!(f.eval("(if c (mk) h)").is_err());
    assert_eq!(f.codes(), vec![ErrorCode::E4002]);
}

#[test]
fn if_of_two_borrowed_values_is_not_destroyed() {
    let mut f = Fixture::new(HANDLE, &[("h", "Handle"), ("c", "bool")]);

    let r = f.eval("(do (if c h h) 0)").unwrap();

    let module = f.unit.context().module();
    assert!(matches!(module.block(r.block).instrs(), [Instr::Phi { .. }]));
}

#[test]
fn if_mixes_ownership_freely_for_types_without_cleanup() {
    let mut f = Fixture::new(HANDLE, &[("n", "int"), ("c", "bool")]);

    let r = f.eval("(if c n 1)").unwrap();

    assert!(r.do_not_destruct);
    assert!(f.codes().is_empty());
}
