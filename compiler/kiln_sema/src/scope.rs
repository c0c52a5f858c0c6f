//! Local variable bindings inside a function body.

use kiln_backend::ValueId;
use kiln_ir::Name;
use kiln_types::Idx;
use rustc_hash::FxHashMap;

/// Where a variable's value lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    /// A stack slot of type `(p ty)`; reads load from it and are lvalues.
    Slot(ValueId),
    /// An SSA value with no storage of its own.
    Value(ValueId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub ty: Idx,
    pub storage: Storage,
}

/// Name to variable bindings for one function body.
#[derive(Clone, Debug, Default)]
pub struct LocalScope {
    bindings: FxHashMap<Name, Variable>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the binding it replaced.
    pub fn bind(&mut self, name: Name, var: Variable) -> Option<Variable> {
        self.bindings.insert(name, var)
    }

    pub fn lookup(&self, name: Name) -> Option<Variable> {
        self.bindings.get(&name).copied()
    }

    pub fn contains(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
