// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for CaptionsAI
//!
//! Everything is read from environment variables. [`AppConfig::from_lookup`]
//! accepts any lookup function so callers (and tests) can supply their own
//! source instead of the process environment.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::caption::CaptionStyle;
use crate::platform::Platform;
use crate::{CaptionsError, Result};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// AI provider configuration
    pub ai: AiConfig,

    /// Platform and hashtag defaults
    pub platforms: PlatformConfig,

    /// Trending hashtag feed settings
    #[serde(default)]
    pub trending: TrendingConfig,

    /// REST service settings
    #[serde(default)]
    pub web: WebConfig,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AiConfig {
    /// API key; `None` until provided. Required before any provider call.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Vision model used for image analysis
    #[serde(default = "default_model")]
    pub model: String,
    /// Text model used for caption generation
    #[serde(default = "default_model")]
    pub text_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlatformConfig {
    pub supported: Vec<Platform>,
    #[serde(default = "default_max_hashtags")]
    pub max_hashtags: usize,
    #[serde(default)]
    pub default_style: CaptionStyle,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TrendingConfig {
    /// JSON feed of trending hashtags; the curated table is used when unset
    pub feed_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_caption_port")]
    pub caption_port: u16,
    #[serde(default = "default_hashtag_port")]
    pub hashtag_port: u16,
}

// Default value functions
fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_model() -> String { "gpt-4o".to_string() }
fn default_max_tokens() -> u32 { 500 }
fn default_temperature() -> f32 { 0.7 }
fn default_timeout() -> u64 { 120 }
fn default_max_hashtags() -> usize { 15 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_caption_port() -> u16 { 8000 }
fn default_hashtag_port() -> u16 { 8001 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            platforms: PlatformConfig::default(),
            trending: TrendingConfig::default(),
            web: WebConfig::default(),
            debug: false,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            text_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            supported: vec![Platform::Instagram, Platform::Facebook],
            max_hashtags: default_max_hashtags(),
            default_style: CaptionStyle::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            caption_port: default_caption_port(),
            hashtag_port: default_hashtag_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        config.ai.api_key = get("OPENAI_API_KEY");
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.ai.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("AI_MODEL") {
            config.ai.text_model = model.clone();
            config.ai.model = model;
        }
        if let Some(model) = get("TEXT_MODEL") {
            config.ai.text_model = model;
        }
        if let Some(v) = get("MAX_TOKENS") {
            config.ai.max_tokens = parse_var("MAX_TOKENS", &v)?;
        }
        if let Some(v) = get("TEMPERATURE") {
            config.ai.temperature = parse_var("TEMPERATURE", &v)?;
        }
        if let Some(v) = get("TIMEOUT_SECS") {
            config.ai.timeout_secs = parse_var("TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = get("MAX_HASHTAGS") {
            config.platforms.max_hashtags = parse_var("MAX_HASHTAGS", &v)?;
        }
        if let Some(v) = get("DEFAULT_CAPTION_STYLE") {
            config.platforms.default_style = parse_var("DEFAULT_CAPTION_STYLE", &v)?;
        }
        if let Some(v) = get("SUPPORTED_PLATFORMS") {
            config.platforms.supported = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| parse_var("SUPPORTED_PLATFORMS", p))
                .collect::<Result<Vec<Platform>>>()?;
        }

        config.trending.feed_url = get("TRENDING_FEED_URL");

        if let Some(host) = get("API_HOST") {
            config.web.host = host;
        }
        if let Some(v) = get("CAPTION_API_PORT") {
            config.web.caption_port = parse_var("CAPTION_API_PORT", &v)?;
        }
        if let Some(v) = get("HASHTAG_API_PORT") {
            config.web.hashtag_port = parse_var("HASHTAG_API_PORT", &v)?;
        }
        if let Some(v) = get("DEBUG") {
            config.debug = parse_bool(&v)
                .ok_or_else(|| CaptionsError::Configuration(format!("DEBUG: invalid boolean '{}'", v)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the environment parser cannot express
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(CaptionsError::Configuration(format!(
                "TEMPERATURE must be between 0 and 2, got {}",
                self.ai.temperature
            )));
        }
        if self.ai.max_tokens == 0 {
            return Err(CaptionsError::Configuration("MAX_TOKENS must be positive".to_string()));
        }
        if self.platforms.max_hashtags == 0 {
            return Err(CaptionsError::Configuration("MAX_HASHTAGS must be positive".to_string()));
        }
        if self.platforms.supported.is_empty() {
            return Err(CaptionsError::Configuration(
                "SUPPORTED_PLATFORMS must name at least one platform".to_string(),
            ));
        }
        Ok(())
    }

    /// The API key, or a configuration error when it was never set
    pub fn api_key(&self) -> Result<&str> {
        self.ai.api_key.as_deref().ok_or_else(|| {
            CaptionsError::Configuration("OPENAI_API_KEY environment variable is required".to_string())
        })
    }

    /// Whether requests for this platform are accepted
    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms.supported.contains(&platform)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| CaptionsError::Configuration(format!("{}: invalid value '{}': {}", key, value, e)))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
