//! Engine configuration
//!
//! All sections are optional; a missing file or section means defaults.
//!
//! ```yaml
//! recommendations:
//!   implicitSliceChildren: true
//!   baseTypeFallback: true
//!   polymorphicValueFallback: true
//!   zeroCardinalityNotUse: true
//!   inheritUseNotUse: true
//!   copyConflictDetection: true
//! propagation:
//!   maxListedChildren: 5
//! ```
//!
//! Files are discovered by walking up from the working directory, see
//! [`ConfigLoader::auto_discover`].

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::RemapError;
use crate::result::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn enabled() -> bool {
    true
}

fn default_max_listed_children() -> usize {
    5
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub recommendations: RecommendationConfig,
    pub propagation: PropagationConfig,
}

/// Switches for the optional recommendation producers and partner fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationConfig {
    /// Children of a slice are valid copy partners without explicit definition
    #[serde(default = "enabled")]
    pub implicit_slice_children: bool,
    /// Accept a partner whose unsliced base element defines the same child
    #[serde(default = "enabled")]
    pub base_type_fallback: bool,
    /// Resolve `value[x]` partners to their first defined type alternative
    #[serde(default = "enabled")]
    pub polymorphic_value_fallback: bool,
    #[serde(default = "enabled")]
    pub zero_cardinality_not_use: bool,
    #[serde(default = "enabled")]
    pub inherit_use_not_use: bool,
    #[serde(default = "enabled")]
    pub copy_conflict_detection: bool,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            implicit_slice_children: true,
            base_type_fallback: true,
            polymorphic_value_fallback: true,
            zero_cardinality_not_use: true,
            inherit_use_not_use: true,
            copy_conflict_detection: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationConfig {
    /// Upper bound on child paths listed in a propagated reason
    #[serde(default = "default_max_listed_children")]
    pub max_listed_children: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_listed_children: default_max_listed_children(),
        }
    }
}

impl EngineConfig {
    /// Load from a YAML (`.yaml`, `.yml`) or JSON (`.json`) file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RemapError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        match ext {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| RemapError::config_error(e.to_string())),
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| RemapError::config_error(e.to_string()))
            }
            _ => Err(RemapError::config_error(format!(
                "Unsupported file extension for '{}' (expected .yaml, .yml, or .json)",
                path.display()
            ))),
        }
    }
}
