//! Export configuration
//!
//! Read from `blockport.toml` in the working directory or from an explicit
//! path. A missing default file means defaults; command-line flags override
//! what the file sets.

pub mod types;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{BlockportError, Result};
use crate::naming::clean_tag_input;

pub use types::{ExportConfig, OutputConfig, DEFAULT_BUNDLE_THRESHOLD};

/// Config file looked up in the working directory
pub const CONFIG_FILENAME: &str = "blockport.toml";

impl ExportConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BlockportError::io_operation("read config", path.display(), e))?;
        let mut config: ExportConfig = toml::from_str(&content)?;
        config.normalize_tags();
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given (it must exist), otherwise `blockport.toml` in
    /// `dir` if present, otherwise defaults
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = dir.join(CONFIG_FILENAME);
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| BlockportError::Other(format!("failed to serialize config: {}", e)))
    }

    fn normalize_tags(&mut self) {
        let mut tags: Vec<String> = self
            .favorite_tags
            .iter()
            .filter_map(|t| clean_tag_input(t))
            .collect();
        let mut seen = std::collections::HashSet::new();
        tags.retain(|t| seen.insert(t.clone()));
        self.favorite_tags = tags;
    }

    fn validate(&self) -> Result<()> {
        if self.export.bundle_threshold == 0 {
            crate::bail_invalid!("bundle_threshold", "must be at least 1");
        }
        Ok(())
    }
}
