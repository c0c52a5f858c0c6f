//! `(def name (fn linkage ret ((param type)...) body...))`
//!
//! Without a body the function is only declared. Parameters are spilled to
//! stack slots on entry so the body can take their addresses.

use kiln_backend::{BlockId, FunctionId};
use kiln_diagnostic::ErrorCode;
use kiln_ir::{Name, NodeId, Span};
use kiln_types::Idx;
use smallvec::SmallVec;

use super::Unit;
use crate::{errors, FormProcessor, FormResult, Param};

impl Unit {
    pub(crate) fn define_function(
        &mut self,
        name_node: NodeId,
        name: Name,
        body: NodeId,
        parts: &[NodeId],
    ) -> FormResult<()> {
        self.check_min_arity(body, "fn", parts, 3)?;
        let linkage = self.parse_linkage(parts[1])?;
        let ret = self.resolve_type(parts[2])?;
        let param_nodes = self.expect_list(parts[3], "parameter list")?;

        let mut params: SmallVec<[Param; 4]> = SmallVec::new();
        for &node in &param_nodes {
            let pair = self.expect_list(node, "parameter")?;
            self.check_arity(node, "parameter", &pair, 1)?;
            let param = self.expect_symbol(pair[0], "parameter name")?;
            if params.iter().any(|p| p.name == param) {
                return Err(self.ctx.error(errors::redeclaration(
                    ErrorCode::E3005,
                    self.span(pair[0]),
                    self.ctx.name_str(param),
                )));
            }
            let ty = self.resolve_type(pair[1])?;
            params.push(Param { name: param, ty });
        }

        let func = self
            .ctx
            .declare_function(name, params.clone(), ret, linkage, self.arena.span(name_node))?;
        let body_forms = &parts[4..];
        if body_forms.is_empty() {
            return Ok(());
        }

        let _span = tracing::debug_span!("fn", name = self.ctx.name_str(name)).entered();
        let spans: SmallVec<[Span; 4]> = param_nodes.iter().map(|&n| self.span(n)).collect();
        let result = self.lower_body(func, &params, &spans, ret, body_forms);
        let repaired = self.ctx.module.finish_function(func);
        debug_assert!(result.is_err() || repaired == 0, "lowered body left open blocks");
        result
    }

    fn lower_body(
        &mut self,
        func: FunctionId,
        params: &[Param],
        spans: &[Span],
        ret: Idx,
        body: &[NodeId],
    ) -> FormResult<()> {
        let entry = self.ctx.module.append_block(func, "entry");
        let mut processor = FormProcessor::new(self, func);
        for (i, (param, span)) in params.iter().zip(spans).enumerate() {
            processor.spill_param(entry, i, *param, *span)?;
        }

        let mut block: BlockId = entry;
        let mut last = None;
        for (i, &form) in body.iter().enumerate() {
            let result = processor.process(block, form)?;
            block = result.block;
            if i + 1 < body.len() {
                block = processor.destruct(result)?.block;
            } else {
                last = Some((form, result));
            }
        }
        let Some((last_form, result)) = last else {
            return Ok(());
        };

        let unit = processor.into_unit();
        if unit.ctx.pool.is_void(ret) {
            let done = crate::destruct(&mut unit.ctx, result)?;
            return unit
                .ctx
                .module
                .ret(done.block, None)
                .map_err(|err| unit.ctx.report_backend(&err, unit.arena.span(last_form)));
        }
        if result.ty != ret {
            return Err(unit.ctx.error(errors::return_type_mismatch(
                unit.arena.span(last_form),
                &unit.ctx.type_name(ret),
                &unit.ctx.type_name(result.ty),
            )));
        }
        unit.ctx
            .module
            .ret(result.block, Some(result.value))
            .map_err(|err| unit.ctx.report_backend(&err, unit.arena.span(last_form)))
    }
}
