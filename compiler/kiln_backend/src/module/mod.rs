//! The module: owner of every backend entity, and the builder API.
//!
//! Follows the "emit into a block, then terminate it" pattern of LLVM's
//! `IRBuilder`, except that the insertion block is an explicit argument to
//! every emit call instead of hidden builder state. Form handlers thread
//! the current block through their results, so a stale block is visible
//! in the code rather than in a cursor.

mod display;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::constant::{mask, parse_int_literal, sign_extend};
use crate::{
    BackendError, BlockId, FunctionId, Instr, IntPredicate, LlType, LlTypeId, Terminator, ValueId,
};

/// Symbol visibility at the object level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Linkage {
    Internal,
    External,
}

impl Linkage {
    pub fn as_str(self) -> &'static str {
        match self {
            Linkage::Internal => "internal",
            Linkage::External => "external",
        }
    }
}

/// What a value is.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    /// Low `width` bits hold the constant.
    ConstInt(u128),
    ConstFloat(f64),
    Undef,
    Param { func: FunctionId, index: u32 },
    /// Result of an instruction.
    Instr,
    /// Pointer to a NUL-terminated string constant.
    GlobalString(String),
}

#[derive(Clone, Debug, PartialEq)]
struct ValueData {
    ty: LlTypeId,
    kind: ValueKind,
}

/// A basic block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrBlock {
    func: FunctionId,
    label: String,
    instrs: Vec<Instr>,
    terminator: Option<Terminator>,
}

impl IrBlock {
    pub fn func(&self) -> FunctionId {
        self.func
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn terminator(&self) -> Option<&Terminator> {
        self.terminator.as_ref()
    }
}

/// A declared function, with a body once blocks are appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrFunction {
    symbol: String,
    params: Vec<ValueId>,
    ret: LlTypeId,
    linkage: Linkage,
    blocks: Vec<BlockId>,
}

impl IrFunction {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn params(&self) -> &[ValueId] {
        &self.params
    }

    pub fn ret(&self) -> LlTypeId {
        self.ret
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Declarations have no blocks.
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// In-memory typed SSA module.
#[derive(Clone, Debug)]
pub struct IrModule {
    name: String,
    types: Vec<LlType>,
    type_intern: FxHashMap<LlType, LlTypeId>,
    struct_names: FxHashMap<String, LlTypeId>,
    values: Vec<ValueData>,
    blocks: Vec<IrBlock>,
    functions: Vec<IrFunction>,
    symbols: FxHashMap<String, FunctionId>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        IrModule {
            name: name.into(),
            types: Vec::new(),
            type_intern: FxHashMap::default(),
            struct_names: FxHashMap::default(),
            values: Vec::new(),
            blocks: Vec::new(),
            functions: Vec::new(),
            symbols: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Types ───────────────────────────────────────────────────────

    fn intern_type(&mut self, ty: LlType) -> LlTypeId {
        if let Some(&id) = self.type_intern.get(&ty) {
            return id;
        }
        let id = LlTypeId::from_len(self.types.len());
        self.types.push(ty.clone());
        self.type_intern.insert(ty, id);
        id
    }

    pub fn void_type(&mut self) -> LlTypeId {
        self.intern_type(LlType::Void)
    }

    pub fn int_type(&mut self, bits: u32) -> LlTypeId {
        self.intern_type(LlType::Int(bits))
    }

    pub fn float_type(&mut self, bits: u32) -> LlTypeId {
        self.intern_type(LlType::Float(bits))
    }

    pub fn pointer_to(&mut self, pointee: LlTypeId) -> LlTypeId {
        self.intern_type(LlType::Ptr(pointee))
    }

    /// Anonymous struct, structurally interned.
    pub fn literal_struct(&mut self, fields: Vec<LlTypeId>) -> LlTypeId {
        self.intern_type(LlType::Struct { name: None, fields })
    }

    /// Create a named struct type.
    ///
    /// Any existing struct with the same name is a collision, whatever its
    /// fields.
    pub fn named_struct(
        &mut self,
        name: &str,
        fields: Vec<LlTypeId>,
    ) -> Result<LlTypeId, BackendError> {
        if self.struct_names.contains_key(name) {
            return Err(BackendError::DuplicateSymbol(name.to_owned()));
        }
        let id = LlTypeId::from_len(self.types.len());
        self.types.push(LlType::Struct {
            name: Some(name.to_owned()),
            fields,
        });
        self.struct_names.insert(name.to_owned(), id);
        tracing::trace!(name, ?id, "named struct");
        Ok(id)
    }

    pub fn lookup_struct(&self, name: &str) -> Option<LlTypeId> {
        self.struct_names.get(name).copied()
    }

    #[inline]
    pub fn llty(&self, id: LlTypeId) -> &LlType {
        &self.types[id.index()]
    }

    pub fn pointee(&self, id: LlTypeId) -> Option<LlTypeId> {
        match self.llty(id) {
            LlType::Ptr(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn int_width(&self, id: LlTypeId) -> Option<u32> {
        match self.llty(id) {
            LlType::Int(bits) => Some(*bits),
            _ => None,
        }
    }

    fn field_type(&self, aggregate: LlTypeId, index: u32) -> Result<LlTypeId, BackendError> {
        match self.llty(aggregate) {
            LlType::Struct { fields, .. } => {
                fields
                    .get(index as usize)
                    .copied()
                    .ok_or_else(|| BackendError::IndexOutOfRange {
                        index,
                        ty: self.type_name(aggregate),
                    })
            }
            _ => Err(BackendError::IndexOutOfRange {
                index,
                ty: self.type_name(aggregate),
            }),
        }
    }

    // ── Values ──────────────────────────────────────────────────────

    fn new_value(&mut self, ty: LlTypeId, kind: ValueKind) -> ValueId {
        let id = ValueId::from_len(self.values.len());
        self.values.push(ValueData { ty, kind });
        id
    }

    #[inline]
    pub fn value_type(&self, value: ValueId) -> LlTypeId {
        self.values[value.index()].ty
    }

    pub fn value_kind(&self, value: ValueId) -> &ValueKind {
        &self.values[value.index()].kind
    }

    /// Integer constant of type `ty` from a signed value, truncated to width.
    #[allow(clippy::cast_sign_loss, reason = "two's complement bit pattern")]
    pub fn const_int(&mut self, ty: LlTypeId, value: i128) -> ValueId {
        let bits = self.int_width(ty).unwrap_or(128);
        self.new_value(ty, ValueKind::ConstInt(value as u128 & mask(bits)))
    }

    /// Parse `text` against the width of `ty` and the given signedness.
    pub fn const_int_from_str(
        &mut self,
        ty: LlTypeId,
        signed: bool,
        text: &str,
    ) -> Result<ValueId, BackendError> {
        let Some(bits) = self.int_width(ty) else {
            return Err(BackendError::TypeMismatch {
                expected: "integer type".to_owned(),
                found: self.type_name(ty),
            });
        };
        let raw = parse_int_literal(text, bits, signed)?;
        Ok(self.new_value(ty, ValueKind::ConstInt(raw)))
    }

    /// Sign-extended value of an integer constant.
    pub fn const_int_value(&self, value: ValueId) -> Option<i128> {
        match self.value_kind(value) {
            ValueKind::ConstInt(raw) => {
                let bits = self.int_width(self.value_type(value)).unwrap_or(128);
                Some(sign_extend(*raw, bits))
            }
            _ => None,
        }
    }

    /// Raw bit pattern of an integer constant, zero-extended.
    pub fn const_uint_value(&self, value: ValueId) -> Option<u128> {
        match self.value_kind(value) {
            ValueKind::ConstInt(raw) => Some(*raw),
            _ => None,
        }
    }

    pub fn const_float(&mut self, ty: LlTypeId, value: f64) -> ValueId {
        self.new_value(ty, ValueKind::ConstFloat(value))
    }

    pub fn undef(&mut self, ty: LlTypeId) -> ValueId {
        self.new_value(ty, ValueKind::Undef)
    }

    /// Pointer to a string constant, typed `i8*`.
    pub fn global_string(&mut self, text: &str) -> ValueId {
        let i8_ty = self.int_type(8);
        let ty = self.pointer_to(i8_ty);
        self.new_value(ty, ValueKind::GlobalString(text.to_owned()))
    }

    // ── Functions and blocks ────────────────────────────────────────

    /// Declare a function. A symbol may be declared once per module.
    pub fn declare_function(
        &mut self,
        symbol: &str,
        params: &[LlTypeId],
        ret: LlTypeId,
        linkage: Linkage,
    ) -> Result<FunctionId, BackendError> {
        if self.symbols.contains_key(symbol) {
            return Err(BackendError::DuplicateSymbol(symbol.to_owned()));
        }
        let func = FunctionId::from_len(self.functions.len());
        let params = params
            .iter()
            .enumerate()
            .map(|(i, &ty)| {
                let index = u32::try_from(i).unwrap_or(u32::MAX);
                self.new_value(ty, ValueKind::Param { func, index })
            })
            .collect();
        self.functions.push(IrFunction {
            symbol: symbol.to_owned(),
            params,
            ret,
            linkage,
            blocks: Vec::new(),
        });
        self.symbols.insert(symbol.to_owned(), func);
        tracing::trace!(symbol, ?func, "declared function");
        Ok(func)
    }

    pub fn lookup_function(&self, symbol: &str) -> Option<FunctionId> {
        self.symbols.get(symbol).copied()
    }

    #[inline]
    pub fn function(&self, func: FunctionId) -> &IrFunction {
        &self.functions[func.index()]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &IrFunction)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId::from_len(i), f))
    }

    pub fn param(&self, func: FunctionId, index: usize) -> Option<ValueId> {
        self.function(func).params.get(index).copied()
    }

    /// Append a new empty block to `func`.
    pub fn append_block(&mut self, func: FunctionId, label: &str) -> BlockId {
        let id = BlockId::from_len(self.blocks.len());
        self.blocks.push(IrBlock {
            func,
            label: label.to_owned(),
            instrs: Vec::new(),
            terminator: None,
        });
        self.functions[func.index()].blocks.push(id);
        id
    }

    #[inline]
    pub fn block(&self, block: BlockId) -> &IrBlock {
        &self.blocks[block.index()]
    }

    pub fn is_terminated(&self, block: BlockId) -> bool {
        self.block(block).terminator.is_some()
    }

    /// Terminate every open block of `func` with `unreachable`.
    ///
    /// Returns how many blocks needed it. Well-formed lowering leaves none.
    pub fn finish_function(&mut self, func: FunctionId) -> usize {
        let mut repaired = 0;
        for &block in &self.functions[func.index()].blocks {
            let data = &mut self.blocks[block.index()];
            if data.terminator.is_none() {
                tracing::warn!(
                    block = ?block,
                    label = %data.label,
                    "unterminated block, adding unreachable"
                );
                data.terminator = Some(Terminator::Unreachable);
                repaired += 1;
            }
        }
        repaired
    }

    // ── Instruction emission ────────────────────────────────────────

    fn push_instr(&mut self, block: BlockId, instr: Instr) -> Result<(), BackendError> {
        let data = &mut self.blocks[block.index()];
        if data.terminator.is_some() {
            return Err(BackendError::BlockTerminated(block));
        }
        data.instrs.push(instr);
        Ok(())
    }

    fn terminate(&mut self, block: BlockId, term: Terminator) -> Result<(), BackendError> {
        let data = &mut self.blocks[block.index()];
        if data.terminator.is_some() {
            return Err(BackendError::BlockTerminated(block));
        }
        data.terminator = Some(term);
        Ok(())
    }

    fn expect_type(&self, expected: LlTypeId, found: LlTypeId) -> Result<(), BackendError> {
        if expected == found {
            Ok(())
        } else {
            Err(BackendError::TypeMismatch {
                expected: self.type_name(expected),
                found: self.type_name(found),
            })
        }
    }

    fn pointee_of_value(&self, ptr: ValueId) -> Result<LlTypeId, BackendError> {
        let ty = self.value_type(ptr);
        self.pointee(ty).ok_or_else(|| BackendError::NotAPointer {
            found: self.type_name(ty),
        })
    }

    /// Stack slot for one `ty`; the result is a `ty*`.
    pub fn alloca(&mut self, block: BlockId, ty: LlTypeId) -> Result<ValueId, BackendError> {
        if self.is_terminated(block) {
            return Err(BackendError::BlockTerminated(block));
        }
        let ptr_ty = self.pointer_to(ty);
        let dst = self.new_value(ptr_ty, ValueKind::Instr);
        self.push_instr(block, Instr::Alloca { dst, ty })?;
        Ok(dst)
    }

    pub fn load(&mut self, block: BlockId, ptr: ValueId) -> Result<ValueId, BackendError> {
        let pointee = self.pointee_of_value(ptr)?;
        if self.is_terminated(block) {
            return Err(BackendError::BlockTerminated(block));
        }
        let dst = self.new_value(pointee, ValueKind::Instr);
        self.push_instr(block, Instr::Load { dst, ptr })?;
        Ok(dst)
    }

    pub fn store(
        &mut self,
        block: BlockId,
        value: ValueId,
        ptr: ValueId,
    ) -> Result<(), BackendError> {
        let pointee = self.pointee_of_value(ptr)?;
        self.expect_type(pointee, self.value_type(value))?;
        self.push_instr(block, Instr::Store { value, ptr })
    }

    /// Call `callee`. Returns the result value, or `None` for void callees.
    pub fn call(
        &mut self,
        block: BlockId,
        callee: FunctionId,
        args: &[ValueId],
    ) -> Result<Option<ValueId>, BackendError> {
        let func = self.function(callee);
        if func.params.len() != args.len() {
            return Err(BackendError::ArgumentCount {
                callee: func.symbol.clone(),
                expected: func.params.len(),
                found: args.len(),
            });
        }
        for (&param, &arg) in func.params.iter().zip(args) {
            self.expect_type(self.value_type(param), self.value_type(arg))?;
        }
        if self.is_terminated(block) {
            return Err(BackendError::BlockTerminated(block));
        }
        let ret = func.ret;
        let dst = if matches!(self.llty(ret), LlType::Void) {
            None
        } else {
            Some(self.new_value(ret, ValueKind::Instr))
        };
        self.push_instr(
            block,
            Instr::Call {
                dst,
                callee,
                args: SmallVec::from_slice(args),
            },
        )?;
        Ok(dst)
    }

    pub fn extract_value(
        &mut self,
        block: BlockId,
        aggregate: ValueId,
        index: u32,
    ) -> Result<ValueId, BackendError> {
        let field = self.field_type(self.value_type(aggregate), index)?;
        if self.is_terminated(block) {
            return Err(BackendError::BlockTerminated(block));
        }
        let dst = self.new_value(field, ValueKind::Instr);
        self.push_instr(
            block,
            Instr::ExtractValue {
                dst,
                aggregate,
                index,
            },
        )?;
        Ok(dst)
    }

    pub fn insert_value(
        &mut self,
        block: BlockId,
        aggregate: ValueId,
        value: ValueId,
        index: u32,
    ) -> Result<ValueId, BackendError> {
        let agg_ty = self.value_type(aggregate);
        let field = self.field_type(agg_ty, index)?;
        self.expect_type(field, self.value_type(value))?;
        if self.is_terminated(block) {
            return Err(BackendError::BlockTerminated(block));
        }
        let dst = self.new_value(agg_ty, ValueKind::Instr);
        self.push_instr(
            block,
            Instr::InsertValue {
                dst,
                aggregate,
                value,
                index,
            },
        )?;
        Ok(dst)
    }

    /// Integer comparison producing an `i1`.
    pub fn icmp(
        &mut self,
        block: BlockId,
        pred: IntPredicate,
        lhs: ValueId,
        rhs: ValueId,
    ) -> Result<ValueId, BackendError> {
        let lhs_ty = self.value_type(lhs);
        if self.int_width(lhs_ty).is_none() {
            return Err(BackendError::TypeMismatch {
                expected: "integer type".to_owned(),
                found: self.type_name(lhs_ty),
            });
        }
        self.expect_type(lhs_ty, self.value_type(rhs))?;
        if self.is_terminated(block) {
            return Err(BackendError::BlockTerminated(block));
        }
        let i1 = self.int_type(1);
        let dst = self.new_value(i1, ValueKind::Instr);
        self.push_instr(
            block,
            Instr::ICmp {
                dst,
                pred,
                lhs,
                rhs,
            },
        )?;
        Ok(dst)
    }

    /// Phi node merging `incoming` values. All inputs must share one type.
    pub fn phi(
        &mut self,
        block: BlockId,
        incoming: &[(ValueId, BlockId)],
    ) -> Result<ValueId, BackendError> {
        let Some(&(first, _)) = incoming.first() else {
            return Err(BackendError::ArgumentCount {
                callee: "phi".to_owned(),
                expected: 1,
                found: 0,
            });
        };
        let ty = self.value_type(first);
        for &(value, _) in &incoming[1..] {
            self.expect_type(ty, self.value_type(value))?;
        }
        if self.is_terminated(block) {
            return Err(BackendError::BlockTerminated(block));
        }
        let dst = self.new_value(ty, ValueKind::Instr);
        self.push_instr(
            block,
            Instr::Phi {
                dst,
                incoming: SmallVec::from_slice(incoming),
            },
        )?;
        Ok(dst)
    }

    // ── Terminators ─────────────────────────────────────────────────

    pub fn ret(&mut self, block: BlockId, value: Option<ValueId>) -> Result<(), BackendError> {
        let func = self.block(block).func;
        let ret_ty = self.function(func).ret;
        match value {
            Some(v) => self.expect_type(ret_ty, self.value_type(v))?,
            None => {
                let void = self.void_type();
                self.expect_type(ret_ty, void)?;
            }
        }
        self.terminate(block, Terminator::Ret(value))
    }

    pub fn br(&mut self, block: BlockId, target: BlockId) -> Result<(), BackendError> {
        self.terminate(block, Terminator::Br(target))
    }

    pub fn cond_br(
        &mut self,
        block: BlockId,
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    ) -> Result<(), BackendError> {
        let i1 = self.int_type(1);
        self.expect_type(i1, self.value_type(cond))?;
        self.terminate(
            block,
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            },
        )
    }

    pub fn unreachable(&mut self, block: BlockId) -> Result<(), BackendError> {
        self.terminate(block, Terminator::Unreachable)
    }
}
