//! `(def Name (enum linkage type (element...)))`
//!
//! An element is a bare symbol (valued one past the previous member, or 0
//! first) or `(symbol integer)`. Any other list is offered to the macro
//! expander before being rejected.
//!
//! Members are collected in an [`EnumBuilder`] and nothing is registered
//! until every element has been validated and both the enum name and the
//! backing struct name are known to be free.

use kiln_backend::BackendError;
use kiln_diagnostic::{ErrorCode, ErrorGuaranteed};
use kiln_ir::{Name, NodeId, NodeKind, TokenKind};
use kiln_types::Idx;
use smallvec::smallvec;

use super::Unit;
use crate::{abi, errors, EnumBuilder, FormResult, MemberError, Struct};

impl Unit {
    /// `parts` is the body list: `enum`, linkage, type, elements. Anything
    /// after the elements is ignored.
    pub(crate) fn define_enum(
        &mut self,
        name_node: NodeId,
        name: Name,
        body: NodeId,
        parts: &[NodeId],
    ) -> FormResult<()> {
        self.check_min_arity(body, "enum", parts, 3)?;
        let linkage = self.parse_linkage(parts[1])?;
        let underlying = self.resolve_type(parts[2])?;
        if !self.ctx.pool.is_integer(underlying) {
            return Err(self.ctx.error(errors::enum_type_not_integer(
                self.span(parts[2]),
                &self.ctx.type_name(underlying),
            )));
        }
        let elements = self.expect_list(parts[3], "enum elements")?;
        let Some(bits) = self.ctx.pool.int_width(underlying) else {
            return Err(self.ctx.error(errors::internal(
                self.span(parts[2]),
                "integer type without a width",
            )));
        };

        let mut builder = EnumBuilder::new(bits, self.ctx.pool.is_signed(underlying));
        for &element in &elements {
            self.add_enum_element(&mut builder, element, underlying, 0)?;
        }

        // Both names must be free before anything is committed.
        if self.ctx.has_local_enum(name) {
            return Err(self.ctx.error(errors::redeclaration(
                ErrorCode::E3001,
                self.span(name_node),
                self.ctx.name_str(name),
            )));
        }
        if self.ctx.has_local_struct(name) {
            return Err(self.redeclared_struct(name_node, name));
        }
        let member = self.ctx.backend_type(underlying);
        let symbol = self.ctx.struct_symbol(name);
        let backing = match self.ctx.module.named_struct(&symbol, vec![member]) {
            Ok(ty) => ty,
            Err(BackendError::DuplicateSymbol(_)) => {
                return Err(self.redeclared_struct(name_node, name));
            }
            Err(err) => return Err(self.ctx.report_backend(&err, self.span(name_node))),
        };

        let path = self.ctx.namespace_path().to_vec();
        let enum_ty = self.ctx.pool.named_enum(name, &path);
        let struct_ty = self.ctx.pool.named_struct(name, &path);
        self.ctx.set_backend_type(enum_ty, backing);
        self.ctx.set_backend_type(struct_ty, backing);

        let once_tag = self.ctx.once_tag().map(str::to_owned);
        let members = builder.len();
        let e = builder.finish(linkage, once_tag.clone(), enum_ty, underlying);
        let s = Struct {
            linkage,
            once_tag,
            ty: struct_ty,
            backend: backing,
            symbol,
            members: smallvec![(self.kw.enum_value, underlying)],
        };
        let added = self.ctx.add_enum(name, e) && self.ctx.add_struct(name, s);
        debug_assert!(added, "names checked above");
        tracing::debug!(
            name = self.ctx.name_str(name),
            members,
            linkage = linkage.as_str(),
            "declared enum"
        );

        abi::register_enum(&mut self.ctx, name, enum_ty, underlying, linkage, self.arena.span(body))
    }

    fn redeclared_struct(&mut self, name_node: NodeId, name: Name) -> ErrorGuaranteed {
        self.ctx.error(errors::redeclaration(
            ErrorCode::E3002,
            self.span(name_node),
            self.ctx.name_str(name),
        ))
    }

    fn add_enum_element(
        &mut self,
        builder: &mut EnumBuilder,
        element: NodeId,
        underlying: Idx,
        depth: u32,
    ) -> FormResult<()> {
        match self.arena.kind(element) {
            NodeKind::Token(token) if token.kind == TokenKind::Symbol => {
                let result = builder.add_auto(token.text).map(|_| ());
                self.member_result(result, element, token.text, underlying)
            }
            NodeKind::Token(_) => Err(self.bad_element(element)),
            NodeKind::List(_) => {
                let items = self.items(element).unwrap_or_default();
                let explicit = match items.as_slice() {
                    [name, value] => self
                        .arena
                        .symbol(*name)
                        .zip(self.arena.token(*value).filter(|t| t.kind == TokenKind::Int)),
                    _ => None,
                };
                if let Some((name, literal)) = explicit {
                    let value = self.enum_literal(items[1], literal.text, underlying)?;
                    let result = builder.add_explicit(name, value);
                    return self.member_result(result, element, name, underlying);
                }
                match self.try_expand(element, depth)? {
                    Some(expanded) => {
                        self.add_enum_element(builder, expanded, underlying, depth + 1)
                    }
                    None => Err(self.bad_element(element)),
                }
            }
        }
    }

    /// Value of an explicit member literal, read at the underlying type's width.
    fn enum_literal(&mut self, node: NodeId, text: Name, underlying: Idx) -> FormResult<i128> {
        let text = self.ctx.name_str(text);
        let signed = self.ctx.pool.is_signed(underlying);
        let llty = self.ctx.backend_type(underlying);
        let value = match self.ctx.module.const_int_from_str(llty, signed, text) {
            Ok(value) => value,
            Err(BackendError::LiteralOutOfRange { .. }) => {
                return Err(self.out_of_range(node, text, underlying));
            }
            Err(_) => {
                return Err(self.ctx.error(errors::unexpected_element(
                    self.span(node),
                    "integer literal",
                    "enum element",
                    text,
                )));
            }
        };
        let parsed = if signed {
            self.ctx.module.const_int_value(value)
        } else {
            self.ctx
                .module
                .const_uint_value(value)
                .and_then(|raw| i128::try_from(raw).ok())
        };
        parsed.ok_or_else(|| self.out_of_range(node, text, underlying))
    }

    fn member_result(
        &mut self,
        result: Result<(), MemberError>,
        element: NodeId,
        name: Name,
        underlying: Idx,
    ) -> FormResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(MemberError::Duplicate) => Err(self.ctx.error(errors::redeclaration(
                ErrorCode::E3003,
                self.span(element),
                self.ctx.name_str(name),
            ))),
            Err(MemberError::OutOfRange(value)) => {
                Err(self.out_of_range(element, &value.to_string(), underlying))
            }
        }
    }

    fn out_of_range(
        &mut self,
        node: NodeId,
        text: &str,
        underlying: Idx,
    ) -> ErrorGuaranteed {
        self.ctx.error(errors::literal_out_of_range(
            self.span(node),
            text,
            &self.ctx.type_name(underlying),
        ))
    }

    fn bad_element(&mut self, element: NodeId) -> ErrorGuaranteed {
        self.ctx.error(errors::unexpected_element(
            self.span(element),
            "symbol or (symbol integer)",
            "enum elements",
            &self.display(element),
        ))
    }
}
