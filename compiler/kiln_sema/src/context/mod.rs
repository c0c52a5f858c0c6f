//! Per-unit compilation state.
//!
//! The [`Context`] owns the type pool, the backend module, the diagnostic
//! queue and the namespace tree. Registration (`add_*`) always targets the
//! innermost active namespace; lookup walks the active chain from the
//! innermost namespace outwards.

use kiln_backend::{BackendError, FunctionId, IrModule, LlTypeId, ValueId};
use kiln_diagnostic::ErrorCode;
use kiln_diagnostic::{Diagnostic, DiagnosticQueue, ErrorGuaranteed};
use kiln_ir::{Name, SharedInterner, Span, StringInterner};
use kiln_types::{Idx, Pool, Tag};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{
    errors, CompileOptions, Enum, FormResult, Function, Linkage, Mangler, Namespace, NamespaceId,
    Param, Struct,
};

pub struct Context {
    pub(crate) interner: SharedInterner,
    pub(crate) pool: Pool,
    pub(crate) module: IrModule,
    pub(crate) diagnostics: DiagnosticQueue,
    namespaces: Vec<Namespace>,
    /// Root first, innermost last. Never empty.
    active: Vec<NamespaceId>,
    /// Backend layout of each struct and enum type.
    named_backend: FxHashMap<Idx, LlTypeId>,
    once_tag: Option<String>,
    mangler: Mangler,
}

impl Context {
    pub fn new(interner: SharedInterner, options: &CompileOptions) -> Self {
        Context {
            interner,
            pool: Pool::new(options.target),
            module: IrModule::new(options.module_name.clone()),
            diagnostics: DiagnosticQueue::with_config(options.diagnostics.clone()),
            namespaces: vec![Namespace::root()],
            active: vec![NamespaceId::ROOT],
            named_backend: FxHashMap::default(),
            once_tag: options.once_tag.clone(),
            mangler: Mangler::new(),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    pub fn module(&self) -> &IrModule {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut IrModule {
        &mut self.module
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticQueue {
        &mut self.diagnostics
    }

    pub fn once_tag(&self) -> Option<&str> {
        self.once_tag.as_deref()
    }

    // ── Diagnostics ─────────────────────────────────────────────────

    pub fn error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        tracing::debug!(code = %diag.code, message = %diag.message, "error");
        self.diagnostics.emit_error(diag)
    }

    pub(crate) fn report_backend(&mut self, err: &BackendError, span: Span) -> ErrorGuaranteed {
        self.error(errors::backend(span, &err.to_string()))
    }

    /// Printable form of a type for diagnostics.
    pub fn type_name(&self, ty: Idx) -> String {
        self.pool.format_type(ty, &self.interner)
    }

    pub(crate) fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    // ── Namespaces ──────────────────────────────────────────────────

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub fn current_namespace(&self) -> NamespaceId {
        self.active.last().copied().unwrap_or(NamespaceId::ROOT)
    }

    fn current_mut(&mut self) -> &mut Namespace {
        let id = self.current_namespace();
        &mut self.namespaces[id.index()]
    }

    /// Names of the active namespaces, outermost first.
    pub fn namespace_path(&self) -> &[Name] {
        self.namespace(self.current_namespace()).path()
    }

    /// Enter child namespace `name` of the current one, creating it if needed.
    pub fn activate_namespace(&mut self, name: Name) -> NamespaceId {
        let parent = self.current_namespace();
        let id = if let Some(id) = self.namespace(parent).child_id(name) {
            id
        } else {
            let id = NamespaceId::from_len(self.namespaces.len());
            let ns = Namespace::child(name, parent, self.namespace(parent).path());
            self.namespaces.push(ns);
            self.namespaces[parent.index()].add_child(name, id);
            id
        };
        self.active.push(id);
        tracing::trace!(namespace = self.name_str(name), "enter namespace");
        id
    }

    /// Leave the current namespace. The root is never left.
    pub fn deactivate_namespace(&mut self) {
        if self.active.len() > 1 {
            self.active.pop();
        }
    }

    /// Innermost first.
    fn chain(&self) -> impl Iterator<Item = &Namespace> + '_ {
        self.active.iter().rev().map(|id| self.namespace(*id))
    }

    fn namespace_by_path(&self, path: &[Name]) -> Option<&Namespace> {
        let mut id = NamespaceId::ROOT;
        for &segment in path {
            id = self.namespace(id).child_id(segment)?;
        }
        Some(self.namespace(id))
    }

    // ── Registration ────────────────────────────────────────────────

    /// Register an enum in the current namespace. `false` if the name is taken.
    pub fn add_enum(&mut self, name: Name, e: Enum) -> bool {
        self.current_mut().add_enum(name, e)
    }

    pub fn add_struct(&mut self, name: Name, s: Struct) -> bool {
        self.current_mut().add_struct(name, s)
    }

    /// `false` if an overload with the same parameter types exists.
    pub fn add_function(&mut self, func: Function) -> bool {
        self.current_mut().add_function(func)
    }

    /// Whether the current namespace already binds an enum `name`.
    pub fn has_local_enum(&self, name: Name) -> bool {
        self.namespace(self.current_namespace()).get_enum(name).is_some()
    }

    pub fn has_local_struct(&self, name: Name) -> bool {
        self.namespace(self.current_namespace()).get_struct(name).is_some()
    }

    pub(crate) fn set_backend_type(&mut self, ty: Idx, llty: LlTypeId) {
        self.named_backend.insert(ty, llty);
    }

    /// Declare a function overload in the backend and the current namespace.
    ///
    /// Fails with a redeclaration error if an overload with the same
    /// parameter types exists, or if the mangled symbol is already taken.
    pub(crate) fn declare_function(
        &mut self,
        name: Name,
        params: SmallVec<[Param; 4]>,
        return_type: Idx,
        linkage: Linkage,
        span: Span,
    ) -> FormResult<FunctionId> {
        let param_types: Vec<Idx> = params.iter().map(|p| p.ty).collect();
        if self
            .namespace(self.current_namespace())
            .overloads(name)
            .iter()
            .any(|f| f.accepts(&param_types))
        {
            return Err(self.error(errors::redeclaration(
                ErrorCode::E3004,
                span,
                self.name_str(name),
            )));
        }
        let symbol = self.function_symbol(name, &param_types);
        let backend_params: Vec<LlTypeId> =
            param_types.iter().map(|&ty| self.backend_type(ty)).collect();
        let ret = self.backend_type(return_type);
        let backend = match self
            .module
            .declare_function(&symbol, &backend_params, ret, linkage.backend())
        {
            Ok(id) => id,
            Err(BackendError::DuplicateSymbol(_)) => {
                return Err(self.error(errors::redeclaration(
                    ErrorCode::E3004,
                    span,
                    self.name_str(name),
                )));
            }
            Err(err) => return Err(self.report_backend(&err, span)),
        };
        tracing::debug!(symbol = %symbol, "declared function");
        let added = self.add_function(Function {
            name,
            params,
            return_type,
            linkage,
            symbol,
            backend,
        });
        debug_assert!(added, "overload checked above");
        Ok(backend)
    }

    // ── Lookup ──────────────────────────────────────────────────────

    pub fn lookup_enum(&self, name: Name) -> Option<&Enum> {
        self.chain().find_map(|ns| ns.get_enum(name))
    }

    pub fn lookup_struct(&self, name: Name) -> Option<&Struct> {
        self.chain().find_map(|ns| ns.get_struct(name))
    }

    /// A declared type by name: enums shadow their backing structs.
    pub fn lookup_type(&self, name: Name) -> Option<Idx> {
        if let Some(prim) = Idx::from_primitive_name(self.name_str(name)) {
            return Some(prim);
        }
        self.chain().find_map(|ns| {
            ns.get_enum(name)
                .map(|e| e.ty)
                .or_else(|| ns.get_struct(name).map(|s| s.ty))
        })
    }

    /// The struct registered for a struct type.
    pub fn struct_of_type(&self, ty: Idx) -> Option<&Struct> {
        if self.pool.tag(ty) != Tag::Struct {
            return None;
        }
        let (name, path) = self.pool.named_parts(ty)?;
        self.namespace_by_path(&path)?.get_struct(name)
    }

    /// The enum registered for an enum type.
    pub fn enum_of_type(&self, ty: Idx) -> Option<&Enum> {
        if self.pool.tag(ty) != Tag::Enum {
            return None;
        }
        let (name, path) = self.pool.named_parts(ty)?;
        self.namespace_by_path(&path)?.get_enum(name)
    }

    /// The overload of `name` taking exactly `args`, innermost namespace first.
    pub fn lookup_function(&self, name: Name, args: &[Idx]) -> Option<&Function> {
        self.chain()
            .find_map(|ns| ns.overloads(name).iter().find(|f| f.accepts(args)))
    }

    pub fn has_function_named(&self, name: Name) -> bool {
        self.chain().any(|ns| !ns.overloads(name).is_empty())
    }

    // ── Symbols ─────────────────────────────────────────────────────

    fn path_strs(&self) -> Vec<&'static str> {
        self.namespace_path()
            .iter()
            .map(|&n| self.name_str(n))
            .collect()
    }

    /// Mangled symbol of `name` declared in the current namespace.
    pub fn name_to_symbol(&self, name: Name) -> String {
        self.mangler.mangle_name(&self.path_strs(), self.name_str(name))
    }

    /// Backend type name of struct `name` declared in the current namespace.
    pub fn struct_symbol(&self, name: Name) -> String {
        self.mangler.struct_symbol(&self.path_strs(), self.name_str(name))
    }

    /// Mangled symbol of one overload of `name` in the current namespace.
    pub fn function_symbol(&self, name: Name, params: &[Idx]) -> String {
        let params: Vec<String> = params.iter().map(|&ty| self.type_name(ty)).collect();
        self.mangler
            .mangle_function(&self.path_strs(), self.name_str(name), &params)
    }

    // ── Backend types ───────────────────────────────────────────────

    /// Backend representation of `ty`.
    ///
    /// `bool` is `i1`; `(p void)` lowers to `i8*`. Named types must have been
    /// given a layout with `set_backend_type` when they were declared.
    pub fn backend_type(&mut self, ty: Idx) -> LlTypeId {
        if let Some(pointee) = self.pool.pointee(ty) {
            let inner = if self.pool.is_void(pointee) {
                self.module.int_type(8)
            } else {
                self.backend_type(pointee)
            };
            return self.module.pointer_to(inner);
        }
        if let Some(&llty) = self.named_backend.get(&ty) {
            return llty;
        }
        if let Some(bits) = self.pool.int_width(ty) {
            return self.module.int_type(bits);
        }
        if let Some(bits) = self.pool.float_width(ty) {
            return self.module.float_type(bits);
        }
        match self.pool.tag(ty) {
            Tag::Bool => self.module.int_type(1),
            Tag::Void => self.module.void_type(),
            tag => {
                debug_assert!(false, "no backend layout for {tag:?}");
                self.module.literal_struct(Vec::new())
            }
        }
    }

    /// Placeholder value for forms of type `void`.
    pub(crate) fn void_value(&mut self) -> ValueId {
        let void = self.module.void_type();
        self.module.undef(void)
    }
}

#[cfg(test)]
mod tests;
