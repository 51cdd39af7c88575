//! Configuration file discovery and loading

use super::EngineConfig;
use crate::error::RemapError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// File names looked up in each directory, in priority order
pub const CONFIG_FILE_NAMES: [&str; 4] = [".remaprc.json", "remap.yaml", "remap.yml", "remap.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by walking upward from `start_path`
    ///
    /// Each directory is searched for [`CONFIG_FILE_NAMES`] in order; the
    /// search stops at the first hit or at the filesystem root.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| RemapError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<EngineConfig> {
        EngineConfig::load(path).map_err(|e| {
            RemapError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load an explicit config, or discover one from `start_dir`
    /// (default: current directory). Defaults apply when nothing is found.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<EngineConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(RemapError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(EngineConfig::default())
            }
        }
    }
}
