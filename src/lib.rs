// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! CaptionsAI: social media captions and hashtags from images
//!
//! An image is validated, described by a vision model, categorized, and
//! turned into a caption plus ranked hashtags that fit the target
//! platform's limits. The same pipeline backs the CLI and the two REST
//! services.

pub mod analyzer;
pub mod caption;
pub mod categorizer;
pub mod config;
pub mod error;
pub mod hashtag;
pub mod pipeline;
pub mod platform;
pub mod provider;
pub mod trending;
pub mod validator;
pub mod web;

pub use config::AppConfig;
pub use error::{CaptionsError, ErrorKind, Result};
pub use pipeline::{ContentPipeline, ContentRequest, ContentResult};
pub use platform::Platform;
