// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Content pipeline: validate, analyze, categorize, caption, hashtags, adapt

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::analyzer::AiAnalyzer;
use crate::caption::{
    score_caption, CaptionContext, CaptionGenerator, CaptionInput, CaptionMetrics, CaptionStyle,
    Personalization,
};
use crate::categorizer::categorize;
use crate::hashtag::HashtagGenerator;
use crate::platform::{adapt, Platform, Post, PostDraft};
use crate::provider::{OpenAiClient, VisionProvider};
use crate::trending::{self, TrendingSource};
use crate::validator::validate_image;
use crate::{AppConfig, CaptionsError, ErrorKind, Result};

fn default_platform() -> Platform { Platform::Instagram }
fn default_variants() -> usize { 1 }
fn default_true() -> bool { true }

/// One request for content about an image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub image_path: PathBuf,
    #[serde(default = "default_platform")]
    pub platform: Platform,
    /// Caption style; the configured default when unset
    #[serde(default)]
    pub style: Option<CaptionStyle>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    /// Hashtag count; the configured maximum when unset
    #[serde(default)]
    pub hashtag_count: Option<usize>,
    /// Number of caption variants; more than one yields alternatives
    #[serde(default = "default_variants")]
    pub variants: usize,
    #[serde(default = "default_true")]
    pub include_trending: bool,
    #[serde(default = "default_true")]
    pub include_emojis: bool,
    /// Brand voice, industry, interests and keyword preferences
    #[serde(flatten)]
    pub personalization: Personalization,
    /// Occasion, goal and mood of this particular post
    #[serde(flatten)]
    pub context: CaptionContext,
}

impl ContentRequest {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            platform: default_platform(),
            style: None,
            brand: None,
            target_audience: None,
            hashtag_count: None,
            variants: default_variants(),
            include_trending: true,
            include_emojis: true,
            personalization: Personalization::default(),
            context: CaptionContext::default(),
        }
    }

    /// The same request aimed at another platform
    pub fn for_platform(&self, platform: Platform) -> Self {
        Self {
            platform,
            ..self.clone()
        }
    }
}

/// Scores reported alongside a successful post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<CaptionMetrics>,
    pub category_confidence: f64,
    pub hashtag_engagement: f64,
    pub trending_score: f64,
    pub trending_available: bool,
}

/// Terminal output of one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    #[serde(default)]
    pub alternative_captions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ContentMetrics>,
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

impl ContentResult {
    fn success(post: Post, alternative_captions: Vec<String>, metrics: ContentMetrics, request_id: Uuid) -> Self {
        Self {
            success: true,
            post: Some(post),
            alternative_captions,
            error: None,
            error_kind: None,
            metrics: Some(metrics),
            request_id,
            generated_at: Utc::now(),
        }
    }

    fn failure(err: &CaptionsError, request_id: Uuid) -> Self {
        Self {
            success: false,
            post: None,
            alternative_captions: Vec::new(),
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            metrics: None,
            request_id,
            generated_at: Utc::now(),
        }
    }
}

/// Orchestrates one request through every stage
pub struct ContentPipeline {
    config: AppConfig,
    analyzer: AiAnalyzer,
    captions: CaptionGenerator,
    hashtags: HashtagGenerator,
}

impl ContentPipeline {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn VisionProvider>,
        trending: Arc<dyn TrendingSource>,
    ) -> Self {
        Self {
            config,
            analyzer: AiAnalyzer::new(provider.clone()),
            captions: CaptionGenerator::new(provider),
            hashtags: HashtagGenerator::new(trending),
        }
    }

    /// Build a pipeline talking to the configured provider and trending source
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let provider = Arc::new(OpenAiClient::new(&config.ai)?);
        let trending = trending::from_config(&config.trending)?;
        Ok(Self::new(config, provider, trending))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generate a captioned post for one platform
    pub async fn generate(&self, request: &ContentRequest) -> ContentResult {
        self.run_reported(request, true).await
    }

    /// Generate hashtags only; the post caption is left empty
    pub async fn generate_hashtags(&self, request: &ContentRequest) -> ContentResult {
        self.run_reported(request, false).await
    }

    /// Run one independent pipeline per platform, concurrently.
    ///
    /// Results are keyed by platform name; one platform failing does not
    /// affect the others.
    pub async fn generate_multi(
        &self,
        request: &ContentRequest,
        platforms: &[Platform],
    ) -> BTreeMap<String, ContentResult> {
        let mut targets: Vec<Platform> = platforms.to_vec();
        targets.sort();
        targets.dedup();
        if targets.is_empty() {
            targets.push(request.platform);
        }

        info!("Generating content for {} platform(s)", targets.len());

        let requests: Vec<ContentRequest> = targets.iter().map(|p| request.for_platform(*p)).collect();
        let results = join_all(requests.iter().map(|r| self.generate(r))).await;

        targets
            .iter()
            .map(|p| p.as_str().to_string())
            .zip(results)
            .collect()
    }

    async fn run_reported(&self, request: &ContentRequest, with_caption: bool) -> ContentResult {
        let request_id = Uuid::new_v4();
        info!(
            "Request {}: {:?} for {}",
            request_id, request.image_path, request.platform
        );

        match self.run(request, with_caption).await {
            Ok((post, alternatives, metrics)) => {
                info!("Request {} completed", request_id);
                ContentResult::success(post, alternatives, metrics, request_id)
            }
            Err(e) => {
                error!("Request {} failed: {}", request_id, e);
                ContentResult::failure(&e, request_id)
            }
        }
    }

    async fn run(
        &self,
        request: &ContentRequest,
        with_caption: bool,
    ) -> Result<(Post, Vec<String>, ContentMetrics)> {
        let platform = request.platform;
        if !self.config.supports(platform) {
            return Err(CaptionsError::InvalidInput(format!(
                "platform '{}' is not enabled",
                platform
            )));
        }

        let path = validate_image(&request.image_path)?;
        let analysis = self.analyzer.analyze(&path).await?;
        let category = categorize(&analysis);

        let captions: Vec<String> = if with_caption {
            let input = CaptionInput {
                analysis: &analysis,
                category: &category,
                style: request.style.unwrap_or(self.config.platforms.default_style),
                platform,
                brand: request.brand.as_deref(),
                audience: request.target_audience.as_deref(),
                personalization: &request.personalization,
                context: &request.context,
                include_emojis: request.include_emojis,
                variants: request.variants,
            };
            self.captions
                .generate(&input)
                .await?
                .into_iter()
                .map(|c| c.text)
                .collect()
        } else {
            Vec::new()
        };

        let mut captions = captions.into_iter();
        let caption = captions.next().unwrap_or_default();
        let alternatives: Vec<String> = captions.collect();

        let max = request.hashtag_count.unwrap_or(self.config.platforms.max_hashtags);
        let hashtags = self
            .hashtags
            .generate(
                &analysis,
                &category,
                max,
                platform,
                request.include_trending,
                request.brand.as_deref(),
            )
            .await;

        let post = adapt(
            PostDraft {
                caption,
                hashtags: hashtags.hashtags,
                category: category.category,
                topic: category.topic,
            },
            platform,
        );

        let metrics = ContentMetrics {
            caption: with_caption.then(|| score_caption(&post.caption, platform)),
            category_confidence: category.confidence,
            hashtag_engagement: hashtags.engagement_potential,
            trending_score: hashtags.trending_score,
            trending_available: hashtags.trending_available,
        };

        Ok((post, alternatives, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_from_json() {
        let request: ContentRequest = serde_json::from_str(r#"{"image_path": "photo.jpg"}"#).unwrap();
        assert_eq!(request.platform, Platform::Instagram);
        assert!(request.style.is_none());
        assert_eq!(request.variants, 1);
        assert!(request.include_trending);
        assert!(request.include_emojis);
        assert!(request.hashtag_count.is_none());
        assert_eq!(request.personalization, Personalization::default());
        assert_eq!(request.context, CaptionContext::default());
    }

    #[test]
    fn test_request_personalization_is_flat() {
        let request: ContentRequest = serde_json::from_str(
            r#"{"image_path": "photo.jpg", "brand_voice": "warm", "industry": "food",
                "interests": ["pasta", "wine"], "avoid_keywords": ["cheap"],
                "occasion": "sunday dinner", "content_goal": "engagement", "mood": "cozy"}"#,
        )
        .unwrap();
        assert_eq!(request.personalization.brand_voice.as_deref(), Some("warm"));
        assert_eq!(request.personalization.industry.as_deref(), Some("food"));
        assert_eq!(request.personalization.interests, vec!["pasta", "wine"]);
        assert_eq!(request.personalization.avoid_keywords, vec!["cheap"]);
        assert!(request.personalization.brand_keywords.is_empty());
        assert_eq!(request.context.occasion.as_deref(), Some("sunday dinner"));
        assert_eq!(request.context.content_goal.as_deref(), Some("engagement"));
        assert_eq!(request.context.mood.as_deref(), Some("cozy"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["brand_voice"], "warm");
        assert_eq!(json["mood"], "cozy");
    }

    #[test]
    fn test_request_rejects_unknown_platform() {
        let parsed = serde_json::from_str::<ContentRequest>(r#"{"image_path": "a.jpg", "platform": "myspace"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_failure_result_serialization() {
        let err = CaptionsError::InvalidInput("missing file".to_string());
        let result = ContentResult::failure(&err, Uuid::new_v4());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "InvalidInputError");
        assert!(json.get("post").is_none());
    }
}
