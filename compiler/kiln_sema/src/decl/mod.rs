//! Registered structs and functions.

use kiln_backend::{FunctionId, LlTypeId};
use kiln_ir::Name;
use kiln_types::Idx;
use smallvec::SmallVec;

use crate::Linkage;

/// A struct registered in a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Struct {
    pub linkage: Linkage,
    pub once_tag: Option<String>,
    pub ty: Idx,
    pub backend: LlTypeId,
    /// Backend type name (`struct_` + mangled symbol).
    pub symbol: String,
    pub members: SmallVec<[(Name, Idx); 4]>,
}

impl Struct {
    pub fn member_index(&self, name: Name) -> Option<u32> {
        self.members
            .iter()
            .position(|(n, _)| *n == name)
            .and_then(|i| u32::try_from(i).ok())
    }

    pub fn member_type(&self, name: Name) -> Option<Idx> {
        self.members.iter().find(|(n, _)| *n == name).map(|(_, ty)| *ty)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Name,
    pub ty: Idx,
}

/// One overload of a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: Name,
    pub params: SmallVec<[Param; 4]>,
    pub return_type: Idx,
    pub linkage: Linkage,
    pub symbol: String,
    pub backend: FunctionId,
}

impl Function {
    pub fn param_types(&self) -> impl Iterator<Item = Idx> + '_ {
        self.params.iter().map(|p| p.ty)
    }

    /// Exact match of the parameter list against `args`.
    pub fn accepts(&self, args: &[Idx]) -> bool {
        self.params.len() == args.len() && self.param_types().eq(args.iter().copied())
    }
}
