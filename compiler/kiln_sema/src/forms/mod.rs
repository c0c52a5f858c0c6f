//! Core forms.
//!
//! The set of core forms is closed. [`Unit`](crate::Unit) interns every
//! name once at construction and the dispatcher routes by the interned
//! [`Name`](kiln_ir::Name), so no handler ever compares strings.

mod control;
mod deref;
mod setf;

use kiln_backend::BlockId;
use kiln_ir::NodeId;

use crate::{FormProcessor, FormResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CoreForm {
    /// `(@ ptr)`: load through a pointer.
    Deref,
    /// `(# lvalue)`: storage address of an lvalue.
    AddressOf,
    /// `(setf dest-ptr value)`: assign through a pointer.
    Setf,
    /// `(do form...)`: sequence, yielding the last value.
    Do,
    /// `(if cond then else)`
    If,
    /// `(core form args...)`: the core form even if a function shadows it.
    Core,
}

impl CoreForm {
    pub const ALL: [CoreForm; 6] = [
        CoreForm::Deref,
        CoreForm::AddressOf,
        CoreForm::Setf,
        CoreForm::Do,
        CoreForm::If,
        CoreForm::Core,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CoreForm::Deref => "@",
            CoreForm::AddressOf => "#",
            CoreForm::Setf => "setf",
            CoreForm::Do => "do",
            CoreForm::If => "if",
            CoreForm::Core => "core",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|form| form.name() == name)
    }
}

impl FormProcessor<'_> {
    /// Run core form `form` on `args`, the list items after the form name.
    pub(crate) fn process_core_form(
        &mut self,
        block: BlockId,
        node: NodeId,
        form: CoreForm,
        args: &[NodeId],
        prefixed_with_core: bool,
    ) -> FormResult {
        match form {
            CoreForm::Deref => self.dereference(block, node, args, false, prefixed_with_core),
            CoreForm::AddressOf => self.address_of(block, node, args),
            CoreForm::Setf => self.setf(block, node, args),
            CoreForm::Do => self.process_do(block, node, args),
            CoreForm::If => self.process_if(block, node, args),
            // Only reachable as `(core core ...)`, which the dispatcher rejects.
            CoreForm::Core => Err(self.unit.ctx.error(crate::errors::unexpected_element(
                self.unit.arena.span(node),
                "core form name",
                "`core`",
                "core",
            ))),
        }
    }

    /// `args.len()` must equal `expected`.
    pub(crate) fn check_args(
        &mut self,
        node: NodeId,
        form: CoreForm,
        args: &[NodeId],
        expected: usize,
    ) -> FormResult<()> {
        if args.len() == expected {
            return Ok(());
        }
        let span = self.unit.arena.span(node);
        Err(self.unit.ctx.error(crate::errors::incorrect_arg_count(
            span,
            form.name(),
            expected,
            args.len(),
        )))
    }
}

#[cfg(test)]
mod tests;
