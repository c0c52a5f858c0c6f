//! Instructions and terminators.

use smallvec::SmallVec;

use crate::{BlockId, FunctionId, LlTypeId, ValueId};

/// Integer comparison predicate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl IntPredicate {
    pub fn as_str(self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
        }
    }
}

/// Non-terminating instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    Alloca {
        dst: ValueId,
        ty: LlTypeId,
    },
    Load {
        dst: ValueId,
        ptr: ValueId,
    },
    Store {
        value: ValueId,
        ptr: ValueId,
    },
    Call {
        dst: Option<ValueId>,
        callee: FunctionId,
        args: SmallVec<[ValueId; 4]>,
    },
    ExtractValue {
        dst: ValueId,
        aggregate: ValueId,
        index: u32,
    },
    InsertValue {
        dst: ValueId,
        aggregate: ValueId,
        value: ValueId,
        index: u32,
    },
    ICmp {
        dst: ValueId,
        pred: IntPredicate,
        lhs: ValueId,
        rhs: ValueId,
    },
    /// Merge of one value per predecessor block.
    Phi {
        dst: ValueId,
        incoming: SmallVec<[(ValueId, BlockId); 2]>,
    },
}

impl Instr {
    /// Value defined by this instruction, if any.
    pub fn dst(&self) -> Option<ValueId> {
        match self {
            Instr::Alloca { dst, .. }
            | Instr::Load { dst, .. }
            | Instr::ExtractValue { dst, .. }
            | Instr::InsertValue { dst, .. }
            | Instr::ICmp { dst, .. }
            | Instr::Phi { dst, .. } => Some(*dst),
            Instr::Call { dst, .. } => *dst,
            Instr::Store { .. } => None,
        }
    }
}

/// Block exit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    Ret(Option<ValueId>),
    Br(BlockId),
    CondBr {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Unreachable,
}

impl Terminator {
    /// Blocks this terminator can transfer control to.
    pub fn successors(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            Terminator::Br(target) => smallvec::smallvec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => smallvec::smallvec![*then_block, *else_block],
            Terminator::Ret(_) | Terminator::Unreachable => SmallVec::new(),
        }
    }
}
