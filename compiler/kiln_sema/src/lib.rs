//! Semantic analysis and IR emission for kiln forms.
//!
//! A [`Unit`] owns everything one translation unit needs: the node arena,
//! the [`Context`] (type pool, namespaces, diagnostics, backend module) and
//! the macro expander. Top-level declarations go through
//! [`Unit::process_top_level`]; expressions inside function bodies go
//! through a [`FormProcessor`], whose [`process`](FormProcessor::process)
//! is the single recursive entry point for every form.
//!
//! Every handler returns [`FormResult`]. The `Err` side is an
//! [`ErrorGuaranteed`](kiln_diagnostic::ErrorGuaranteed): the diagnostic
//! has already been queued, and the caller only has to stop.

mod abi;
mod context;
mod decl;
mod destruct;
mod dispatch;
mod enum_def;
mod errors;
mod forms;
mod linkage;
mod macros;
mod mangle;
mod namespace;
mod options;
mod parse_result;
mod scope;
mod stack;
#[cfg(test)]
mod test_support;
mod unit;

use std::sync::Once;

pub use context::Context;
pub use decl::{Function, Param, Struct};
pub use destruct::destruct;
pub use dispatch::FormProcessor;
pub use enum_def::{Enum, EnumBuilder, MemberError};
pub use forms::CoreForm;
pub use linkage::Linkage;
pub use macros::{Expansion, MacroExpander, NoMacros};
pub use mangle::Mangler;
pub use namespace::{Namespace, NamespaceId};
pub use options::CompileOptions;
pub use parse_result::ParseResult;
pub use scope::{LocalScope, Storage, Variable};
pub use unit::Unit;

/// Result of processing a form. Errors have already been reported.
pub type FormResult<T = ParseResult> = Result<T, kiln_diagnostic::ErrorGuaranteed>;

/// Name of the synthetic member holding an enum's underlying value.
pub const ENUM_VALUE_MEMBER: &str = "_enum_value";

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical tracing subscriber.
///
/// Only active when `KILN_LOG` (or `RUST_LOG`) is set; the variable is read
/// as an `EnvFilter` directive, e.g. `KILN_LOG=kiln_sema=trace`. Safe to
/// call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env("KILN_LOG").or_else(|_| EnvFilter::try_from_default_env());
        if let Ok(filter) = filter {
            let _ = tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .try_init();
        }
    });
}
