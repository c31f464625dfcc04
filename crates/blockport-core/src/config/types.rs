//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::render::StyleOptions;

/// Default number of files above which a multi-file export is zipped
pub const DEFAULT_BUNDLE_THRESHOLD: usize = 5;

/// Settings read from `blockport.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export output settings
    #[serde(default)]
    pub export: OutputConfig,

    /// Styled HTML parameters
    #[serde(default)]
    pub style: StyleOptions,

    /// Tags offered as quick filters
    #[serde(default)]
    pub favorite_tags: Vec<String>,
}

/// The `[export]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prepend the `# Export: #tag` header to filter exports
    #[serde(default = "default_true")]
    pub header: bool,

    /// More files than this are written as one ZIP bundle
    #[serde(default = "default_bundle_threshold")]
    pub bundle_threshold: usize,

    /// Convert `**`, `__` and `^^` markup in plain HTML output
    #[serde(default = "default_true")]
    pub inline_markup: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            header: true,
            bundle_threshold: DEFAULT_BUNDLE_THRESHOLD,
            inline_markup: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bundle_threshold() -> usize {
    DEFAULT_BUNDLE_THRESHOLD
}
