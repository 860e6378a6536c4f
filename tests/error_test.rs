// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error conditions surfaced through the public API

use std::collections::HashMap;
use tempfile::tempdir;

use captionsai::pipeline::ContentPipeline;
use captionsai::validator::validate_image;
use captionsai::{AppConfig, CaptionsError, ErrorKind};

fn config(vars: &[(&str, &str)]) -> captionsai::Result<AppConfig> {
    let map: HashMap<&str, &str> = vars.iter().copied().collect();
    AppConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
}

/// Missing file
#[test]
fn test_validate_missing_file() {
    let err = validate_image("/nonexistent/path/12345.jpg".as_ref()).unwrap_err();
    assert!(matches!(err, CaptionsError::InvalidInput(_)));
    assert!(err.to_string().contains("not found"));
}

/// A directory named like an image is still rejected
#[test]
fn test_validate_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let fake = dir.path().join("album.jpg");
    std::fs::create_dir(&fake).unwrap();

    let err = validate_image(&fake).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInputError);
}

/// Upper-case and long-form extensions are accepted
#[test]
fn test_validate_extension_case() {
    let dir = tempdir().expect("Failed to create temp dir");
    for name in ["A.JPG", "b.Jpeg", "c.webp", "d.GIF"] {
        let path = dir.path().join(name);
        std::fs::write(&path, b"x").unwrap();
        assert!(validate_image(&path).is_ok(), "{}", name);
    }
}

/// Building a pipeline without an API key is a configuration error
#[test]
fn test_pipeline_requires_api_key() {
    let config = config(&[]).unwrap();
    let err = ContentPipeline::from_config(config).err().expect("expected error");
    assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

/// Out-of-range settings are rejected when loading
#[test]
fn test_invalid_settings() {
    for vars in [
        [("TEMPERATURE", "-0.1")],
        [("MAX_HASHTAGS", "0")],
        [("CAPTION_API_PORT", "70000")],
        [("SUPPORTED_PLATFORMS", " , ")],
    ] {
        let err = config(&vars).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError, "{:?}", vars);
    }
}
