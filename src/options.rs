//! Driver configuration.

use fjs_analyzer::{LifecycleConfig, RebuildThresholds};
use fjs_emitter::{EmitOptions, ModuleFormat};

/// Everything the pipeline can be tuned with. The default is the
/// collect-and-proceed configuration: analysis issues are reported but never
/// block code generation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Skip code generation for a file once an error-severity issue was
    /// reported against it. Diagnostics are still collected in full.
    pub fail_on_error: bool,
    /// Prefix emitted members with `// <file>:<line>`.
    pub emit_source_comments: bool,
    pub target_module_format: ModuleFormat,
    pub lifecycle: LifecycleConfig,
    pub rebuild_thresholds: RebuildThresholds,
}

impl CompileOptions {
    pub(crate) fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            module_format: self.target_module_format,
            emit_source_comments: self.emit_source_comments,
            ..EmitOptions::default()
        }
    }
}
