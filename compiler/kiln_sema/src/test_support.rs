//! Reading S-expression text into nodes for tests.

#![allow(clippy::unwrap_used)]

use kiln_backend::{BlockId, FunctionId};
use kiln_ir::{NodeArena, NodeBuilder, NodeId, StringInterner};
use kiln_types::Idx;

use crate::{CompileOptions, Unit};

/// Read every form in `source`.
///
/// Integers are optionally signed decimal or `0x` hex, floats contain a
/// `.`, strings are double-quoted without escapes. Malformed input panics.
pub(crate) fn read_all(arena: &mut NodeArena, interner: &StringInterner, source: &str) -> Vec<NodeId> {
    let tokens = tokenize(source);
    let mut builder = NodeBuilder::new(arena, interner);
    let mut pos = 0;
    let mut forms = Vec::new();
    while pos < tokens.len() {
        forms.push(read_form(&mut builder, &tokens, &mut pos));
    }
    forms
}

fn tokenize(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' => {
                tokens.push(c.to_string());
                chars.next();
            }
            '"' => {
                let mut text = String::from('"');
                chars.next();
                for c in chars.by_ref() {
                    text.push(c);
                    if c == '"' {
                        break;
                    }
                }
                tokens.push(text);
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                tokens.push(text);
            }
        }
    }
    tokens
}

fn read_form(builder: &mut NodeBuilder<'_>, tokens: &[String], pos: &mut usize) -> NodeId {
    let token = &tokens[*pos];
    *pos += 1;
    if token == "(" {
        let mut items = Vec::new();
        while tokens[*pos] != ")" {
            items.push(read_form(builder, tokens, pos));
        }
        *pos += 1;
        return builder.list(&items);
    }
    assert_ne!(token, ")", "unbalanced parentheses");
    if let Some(text) = token.strip_prefix('"') {
        return builder.str(text.strip_suffix('"').unwrap_or(text));
    }
    let digits = token.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(token);
    if digits.starts_with(|c: char| c.is_ascii_digit()) {
        if digits.contains('.') {
            return builder.float(token);
        }
        return builder.int(token);
    }
    builder.sym(token)
}

/// A unit holding the forms of `source`, with the default options.
pub(crate) fn unit_with(source: &str) -> (Unit, Vec<NodeId>) {
    let interner = StringInterner::shared();
    let mut arena = NodeArena::new();
    let forms = read_all(&mut arena, &interner, source);
    (Unit::new(interner, arena, &CompileOptions::default()), forms)
}

/// Read more forms into an existing unit.
pub(crate) fn read_into(unit: &mut Unit, source: &str) -> Vec<NodeId> {
    let interner = unit.ctx.interner.clone();
    read_all(&mut unit.arena, &interner, source)
}

/// A function over `params` with an empty entry block to emit expressions into.
pub(crate) fn scratch_function(unit: &mut Unit, params: &[Idx]) -> (FunctionId, BlockId) {
    let params: Vec<_> = params.iter().map(|&ty| unit.ctx.backend_type(ty)).collect();
    let ret = unit.ctx.module.void_type();
    let func = unit
        .ctx
        .module
        .declare_function("scratch", &params, ret, kiln_backend::Linkage::Internal)
        .unwrap();
    let entry = unit.ctx.module.append_block(func, "entry");
    (func, entry)
}

/// Intern `text` in the unit's interner.
pub(crate) fn name(unit: &Unit, text: &str) -> kiln_ir::Name {
    unit.ctx.interner().intern(text)
}

/// Codes of all queued diagnostics, in emission order.
pub(crate) fn error_codes(unit: &Unit) -> Vec<kiln_diagnostic::ErrorCode> {
    unit.ctx.diagnostics().diagnostics().iter().map(|d| d.code).collect()
}
