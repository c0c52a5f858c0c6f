use kiln_diagnostic::DiagnosticConfig;
use kiln_types::TargetInfo;

/// Per-unit compiler configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Name given to the backend module.
    pub module_name: String,
    pub target: TargetInfo,
    pub diagnostics: DiagnosticConfig,
    /// Deduplication key recorded on the unit's enums and structs.
    pub once_tag: Option<String>,
    /// Maximum number of consecutive macro rewrites of one node.
    pub max_expansion_depth: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            module_name: "main".to_owned(),
            target: TargetInfo::default(),
            diagnostics: DiagnosticConfig::default(),
            once_tag: None,
            max_expansion_depth: 128,
        }
    }
}
