// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image validation performed before any provider call

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{CaptionsError, Result};

/// Extensions accepted for analysis (`jpeg` is the long spelling of `jpg`)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Check if a path has a supported image extension
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Validate that `path` names an existing image file of a supported format
pub fn validate_image(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(CaptionsError::InvalidInput(format!(
            "Image file not found: {}",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(CaptionsError::InvalidInput(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    if !has_supported_extension(path) {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("none");
        return Err(CaptionsError::InvalidInput(format!(
            "Unsupported image format '{}' (supported: {})",
            ext,
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    debug!("Validated image: {:?}", path);
    Ok(path.to_path_buf())
}
