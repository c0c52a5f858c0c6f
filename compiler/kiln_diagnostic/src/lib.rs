//! Diagnostic reporting for the kiln compiler.
//!
//! Form handlers never unwind on user errors. They build a [`Diagnostic`],
//! push it to the unit's [`DiagnosticQueue`], and return the
//! [`ErrorGuaranteed`] they get back as the `Err` side of their result:
//!
//! ```text
//! let guar = queue.emit_error(
//!     Diagnostic::error(ErrorCode::E2001)
//!         .with_message("cannot dereference non-pointer `int`")
//!         .with_label(span, "not a pointer"),
//! );
//! return Err(guar);
//! ```
//!
//! The queue lives for one compilation unit; it is owned by that unit's
//! context and never shared.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
