//! Diagnostic constructors shared by the form handlers.
//!
//! Each function builds the [`Diagnostic`] for one error kind with a
//! consistent message shape; callers attach it to the queue through
//! [`Context::error`](crate::Context::error).

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::Span;

pub(crate) fn incorrect_arg_count(span: Span, form: &str, expected: usize, found: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(format!(
            "`{form}` expects {expected} argument{}, found {found}",
            plural(expected)
        ))
        .with_label(span, "incorrect number of arguments")
}

pub(crate) fn too_few_args(span: Span, form: &str, minimum: usize, found: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!(
            "`{form}` expects at least {minimum} argument{}, found {found}",
            plural(minimum)
        ))
        .with_label(span, "too few arguments")
}

/// `expected` and `found` are shape descriptions such as "symbol" or "list".
pub(crate) fn unexpected_element(span: Span, expected: &str, context: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1003)
        .with_message(format!("expected {expected} in {context}, found {found}"))
        .with_label(span, format!("expected {expected}"))
}

pub(crate) fn incorrect_arg_type(span: Span, expected: &str, context: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1004)
        .with_message(format!("{context} must be a {expected}, found {found}"))
        .with_label(span, format!("expected {expected}"))
}

pub(crate) fn invalid_linkage(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1005)
        .with_message(format!("invalid linkage `{found}`"))
        .with_label(span, "not a linkage")
        .with_note("expected `intern` or `extern`")
}

pub(crate) fn empty_list(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1006)
        .with_message("empty list cannot be evaluated")
        .with_label(span, "empty list")
}

pub(crate) fn non_pointer_deref(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!("cannot dereference non-pointer type `{found}`"))
        .with_label(span, "not a pointer")
}

pub(crate) fn void_pointer_deref(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message("cannot dereference void pointer")
        .with_label(span, "points to void")
}

pub(crate) fn variable_not_in_scope(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("variable `{name}` not in scope"))
        .with_label(span, "not found")
}

pub(crate) fn type_not_in_scope(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2004)
        .with_message(format!("type `{name}` not in scope"))
        .with_label(span, "unknown type")
}

pub(crate) fn enum_type_not_integer(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2005)
        .with_message(format!("enum type must be integer, found `{found}`"))
        .with_label(span, "not an integer type")
}

pub(crate) fn literal_out_of_range(span: Span, text: &str, ty: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2006)
        .with_message(format!("integer literal `{text}` out of range for `{ty}`"))
        .with_label(span, "out of range")
}

pub(crate) fn no_matching_function(span: Span, name: &str, args: &[String]) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2007)
        .with_message(format!("no function or macro `{name}` matches these arguments"))
        .with_label(span, "no match")
        .with_note(format!("argument types: ({})", args.join(" ")))
}

pub(crate) fn address_of_non_lvalue(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2008)
        .with_message("cannot take address of non-lvalue")
        .with_label(span, "has no storage")
}

pub(crate) fn branch_types_differ(span: Span, then_ty: &str, else_ty: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2009)
        .with_message(format!("branches have different types: `{then_ty}` and `{else_ty}`"))
        .with_label(span, "branch types differ")
}

pub(crate) fn condition_not_bool(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2010)
        .with_message(format!("condition must be bool, found `{found}`"))
        .with_label(span, "not a bool")
}

pub(crate) fn return_type_mismatch(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2011)
        .with_message(format!("function returns `{expected}`, body produces `{found}`"))
        .with_label(span, "return type mismatch")
}

pub(crate) fn incorrect_value_type(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2012)
        .with_message(format!("expected value of type `{expected}`, found `{found}`"))
        .with_label(span, "incorrect value type")
}

pub(crate) fn redeclaration(code: ErrorCode, span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(format!("{} `{name}`", code.description()))
        .with_label(span, "already declared")
}

pub(crate) fn branch_ownership_differs(span: Span, ty: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4002)
        .with_message(format!(
            "one branch owns its `{ty}` and the other borrows it, and `{ty}` has no `setf-copy-assign`"
        ))
        .with_label(span, "branches differ in ownership")
}

pub(crate) fn destructor_failed(detail: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4001)
        .with_message(format!("destructor could not be emitted: {detail}"))
}

pub(crate) fn backend(span: Span, detail: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E5001)
        .with_message(format!("backend error: {detail}"))
        .with_label(span, "while emitting this form")
}

pub(crate) fn macro_failed(span: Span, detail: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E6001)
        .with_message(format!("macro expansion failed: {detail}"))
        .with_label(span, "in this expansion")
}

pub(crate) fn internal(span: Span, detail: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message(format!("internal compiler error: {detail}"))
        .with_label(span, "while processing this form")
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
