//! Result type alias for remap operations

use crate::error::RemapError;

/// Standard Result type for remap operations
pub type Result<T> = std::result::Result<T, RemapError>;
