//! Typed SSA backend for the kiln compiler.
//!
//! [`IrModule`] plays the part of an LLVM-style module plus builder: it owns
//! types, functions, basic blocks and values, and exposes the operations the
//! form handlers need (block creation, `alloca`/`load`/`store`, calls,
//! aggregate access, constants and symbol interning).
//!
//! Everything is ID-based. Handlers hold [`ValueId`], [`BlockId`],
//! [`FunctionId`] and [`LlTypeId`] handles; the module is the only owner.
//! Instructions are emitted into an explicit block, and emitting into a
//! block that already has a terminator is an error rather than a silent
//! append.

mod constant;
mod error;
mod ids;
mod instr;
mod module;
mod types;

pub use constant::parse_int_literal;
pub use error::BackendError;
pub use ids::{BlockId, FunctionId, LlTypeId, ValueId};
pub use instr::{Instr, IntPredicate, Terminator};
pub use module::{IrBlock, IrFunction, IrModule, Linkage, ValueKind};
pub use types::LlType;
