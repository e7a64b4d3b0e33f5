//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::CetConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file, workspace files and environment.
    pub fn load(workspace_root: &Path) -> Result<CetConfig, ConfigError> {
        MergeService::load(workspace_root)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<CetConfig, ConfigError> {
        MergeService::load_from_file(path)
    }
}
