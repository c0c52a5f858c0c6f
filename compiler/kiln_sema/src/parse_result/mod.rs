//! The value every form handler produces.

use kiln_backend::{BlockId, ValueId};
use kiln_types::{Idx, Pool};

/// Outcome of processing one form.
///
/// `block` is the insertion point after the form: a form that branches
/// leaves it somewhere other than where it started, and the caller must
/// continue from here.
///
/// When `value_is_lvalue` is set, `address_of_value` holds the storage the
/// value was loaded from and `type_of_address_of_value` is the pointer type
/// of that storage, whose pointee is `ty`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseResult {
    pub ty: Idx,
    pub value: ValueId,
    pub block: BlockId,
    pub value_is_lvalue: bool,
    pub address_of_value: Option<ValueId>,
    pub type_of_address_of_value: Option<Idx>,
    /// Assignment binds directly to this storage instead of copying out of it.
    pub do_not_copy_with_setf: bool,
    /// The value's storage is owned elsewhere; destructing it is a no-op.
    pub do_not_destruct: bool,
}

impl ParseResult {
    /// A plain rvalue.
    pub fn new(block: BlockId, ty: Idx, value: ValueId) -> Self {
        ParseResult {
            ty,
            value,
            block,
            value_is_lvalue: false,
            address_of_value: None,
            type_of_address_of_value: None,
            do_not_copy_with_setf: false,
            do_not_destruct: false,
        }
    }

    /// Mark as an lvalue stored at `address`, a value of pointer type `address_ty`.
    #[must_use]
    pub fn with_lvalue(mut self, address: ValueId, address_ty: Idx) -> Self {
        self.value_is_lvalue = true;
        self.address_of_value = Some(address);
        self.type_of_address_of_value = Some(address_ty);
        self
    }

    #[must_use]
    pub fn owned_elsewhere(mut self) -> Self {
        self.do_not_destruct = true;
        self
    }

    #[must_use]
    pub fn in_block(mut self, block: BlockId) -> Self {
        self.block = block;
        self
    }

    /// The lvalue fields agree with each other and with `ty`.
    pub fn is_consistent(&self, pool: &Pool) -> bool {
        match (self.address_of_value, self.type_of_address_of_value) {
            (Some(_), Some(address_ty)) => {
                self.value_is_lvalue && pool.pointee(address_ty) == Some(self.ty)
            }
            (None, None) => !self.value_is_lvalue,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests;
