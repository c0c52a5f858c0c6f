//! Per-namespace symbol tables.

use kiln_ir::Name;
use rustc_hash::FxHashMap;

use crate::{Enum, Function, Struct};

/// Index of a namespace in its [`Context`](crate::Context).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u32);

impl NamespaceId {
    /// The unnamed root namespace every unit starts in.
    pub const ROOT: NamespaceId = NamespaceId(0);

    #[inline]
    pub(crate) fn from_len(len: usize) -> Self {
        NamespaceId(u32::try_from(len).unwrap_or(u32::MAX))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One namespace: its own declarations plus links to its children.
///
/// Enums and structs live in separate tables, so an enum and its backing
/// struct share a declared name.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    name: Option<Name>,
    parent: Option<NamespaceId>,
    /// Names from the root down to and including this namespace.
    path: Vec<Name>,
    children: FxHashMap<Name, NamespaceId>,
    enums: FxHashMap<Name, Enum>,
    structs: FxHashMap<Name, Struct>,
    functions: FxHashMap<Name, Vec<Function>>,
}

impl Namespace {
    pub(crate) fn root() -> Self {
        Self::default()
    }

    pub(crate) fn child(name: Name, parent: NamespaceId, parent_path: &[Name]) -> Self {
        let mut path = parent_path.to_vec();
        path.push(name);
        Namespace {
            name: Some(name),
            parent: Some(parent),
            path,
            ..Self::default()
        }
    }

    /// `None` for the root.
    pub fn name(&self) -> Option<Name> {
        self.name
    }

    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    pub fn path(&self) -> &[Name] {
        &self.path
    }

    pub fn child_id(&self, name: Name) -> Option<NamespaceId> {
        self.children.get(&name).copied()
    }

    pub(crate) fn add_child(&mut self, name: Name, id: NamespaceId) {
        self.children.insert(name, id);
    }

    // ── Enums and structs ───────────────────────────────────────────

    pub fn get_enum(&self, name: Name) -> Option<&Enum> {
        self.enums.get(&name)
    }

    pub fn get_struct(&self, name: Name) -> Option<&Struct> {
        self.structs.get(&name)
    }

    /// Returns `false`, leaving the table untouched, if `name` is taken.
    pub(crate) fn add_enum(&mut self, name: Name, e: Enum) -> bool {
        if self.enums.contains_key(&name) {
            return false;
        }
        self.enums.insert(name, e);
        true
    }

    pub(crate) fn add_struct(&mut self, name: Name, s: Struct) -> bool {
        if self.structs.contains_key(&name) {
            return false;
        }
        self.structs.insert(name, s);
        true
    }

    // ── Functions ───────────────────────────────────────────────────

    /// All overloads declared here under `name`.
    pub fn overloads(&self, name: Name) -> &[Function] {
        self.functions.get(&name).map_or(&[], Vec::as_slice)
    }

    /// Returns `false` if an overload with the same parameter types exists.
    pub(crate) fn add_function(&mut self, func: Function) -> bool {
        let overloads = self.functions.entry(func.name).or_default();
        let params: Vec<_> = func.param_types().collect();
        if overloads.iter().any(|f| f.accepts(&params)) {
            return false;
        }
        overloads.push(func);
        true
    }
}
