use thiserror::Error;

use crate::BlockId;

/// Failure reported by the backend to the form handlers.
///
/// None of these abort the module; the caller turns them into diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("symbol `{0}` already has a distinct definition")]
    DuplicateSymbol(String),

    #[error("block {0:?} is already terminated")]
    BlockTerminated(BlockId),

    #[error("expected a pointer operand, found `{found}`")]
    NotAPointer { found: String },

    #[error("expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("index {index} is out of range for `{ty}`")]
    IndexOutOfRange { index: u32, ty: String },

    #[error("`{callee}` takes {expected} argument(s), {found} supplied")]
    ArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid integer literal `{0}`")]
    InvalidLiteral(String),

    /// `ty` is written `i<bits>` or `u<bits>`.
    #[error("integer literal `{text}` is out of range for `{ty}`")]
    LiteralOutOfRange { text: String, ty: String },
}
