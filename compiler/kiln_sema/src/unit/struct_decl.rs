//! `(def Name (struct linkage ((field type)...)))`

use kiln_backend::BackendError;
use kiln_diagnostic::ErrorCode;
use kiln_ir::{Name, NodeId};
use kiln_types::Idx;
use smallvec::SmallVec;

use super::Unit;
use crate::{errors, FormResult, Struct};

impl Unit {
    pub(crate) fn define_struct(
        &mut self,
        name_node: NodeId,
        name: Name,
        body: NodeId,
        parts: &[NodeId],
    ) -> FormResult<()> {
        self.check_arity(body, "struct", parts, 2)?;
        let linkage = self.parse_linkage(parts[1])?;
        let fields = self.expect_list(parts[2], "struct members")?;

        let mut members: SmallVec<[(Name, Idx); 4]> = SmallVec::new();
        for &field in &fields {
            let pair = self.expect_list(field, "struct member")?;
            self.check_arity(field, "struct member", &pair, 1)?;
            let member = self.expect_symbol(pair[0], "struct member name")?;
            if members.iter().any(|(n, _)| *n == member) {
                return Err(self.ctx.error(errors::redeclaration(
                    ErrorCode::E3005,
                    self.span(pair[0]),
                    self.ctx.name_str(member),
                )));
            }
            let ty = self.resolve_type(pair[1])?;
            members.push((member, ty));
        }

        if self.ctx.has_local_struct(name) {
            return Err(self.ctx.error(errors::redeclaration(
                ErrorCode::E3002,
                self.span(name_node),
                self.ctx.name_str(name),
            )));
        }
        let layout = members
            .iter()
            .map(|&(_, ty)| self.ctx.backend_type(ty))
            .collect();
        let symbol = self.ctx.struct_symbol(name);
        let backend = match self.ctx.module.named_struct(&symbol, layout) {
            Ok(ty) => ty,
            Err(BackendError::DuplicateSymbol(_)) => {
                return Err(self.ctx.error(errors::redeclaration(
                    ErrorCode::E3002,
                    self.span(name_node),
                    self.ctx.name_str(name),
                )));
            }
            Err(err) => return Err(self.ctx.report_backend(&err, self.span(name_node))),
        };
        let path = self.ctx.namespace_path().to_vec();
        let ty = self.ctx.pool.named_struct(name, &path);
        self.ctx.set_backend_type(ty, backend);

        tracing::debug!(name = self.ctx.name_str(name), fields = members.len(), "declared struct");
        let s = Struct {
            linkage,
            once_tag: self.ctx.once_tag().map(str::to_owned),
            ty,
            backend,
            symbol,
            members,
        };
        let added = self.ctx.add_struct(name, s);
        debug_assert!(added, "name checked above");
        Ok(())
    }
}
