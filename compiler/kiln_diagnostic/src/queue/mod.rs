//! Per-unit diagnostic queue.
//!
//! Features:
//! - Error limit, past which errors are counted but not stored
//! - Deduplication of exact repeats (same code, primary span and message)
//! - Stable ordering by source position on flush
//! - `ErrorGuaranteed` proof that errors were emitted

use kiln_ir::Span;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of stored errors (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Accumulates the diagnostics of one compilation unit.
///
/// Adding a diagnostic never aborts anything; callers propagate the
/// returned [`ErrorGuaranteed`] themselves.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// Errors past the configured limit, and exact duplicates, are counted
    /// but not stored. The proof is returned either way.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a non-error");
        let dropped = self.limit_reached() || self.is_duplicate(&diag);
        self.error_count += 1;
        if dropped {
            self.suppressed += 1;
        } else {
            self.diagnostics.push(diag);
        }
        ErrorGuaranteed::new()
    }

    /// Queue a warning or note. Returns `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if diag.is_error() {
            let _ = self.emit_error(diag);
            return true;
        }
        if self.is_duplicate(&diag) {
            return false;
        }
        self.diagnostics.push(diag);
        true
    }

    fn is_duplicate(&self, diag: &Diagnostic) -> bool {
        self.config.deduplicate
            && self.diagnostics.iter().any(|d| {
                d.code == diag.code
                    && d.primary_span() == diag.primary_span()
                    && d.message == diag.message
            })
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        let stored = self.error_count - self.suppressed;
        self.config.error_limit > 0 && stored >= self.config.error_limit
    }

    /// Number of errors emitted, including suppressed ones.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of errors that were counted but not stored.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    /// Proof of failure if any error was emitted.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Queued diagnostics in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Sort diagnostics by position and return them, resetting the queue.
    ///
    /// Diagnostics without a primary span sort last; ties keep emission order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| d.primary_span().map_or((1, Span::DUMMY), |s| (0, s)));
        self.error_count = 0;
        self.suppressed = 0;
        result
    }
}
