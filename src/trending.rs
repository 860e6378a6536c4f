// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Trending hashtag sources
//!
//! Trending data is best effort. [`fetch_trending`] never fails; a source
//! error is logged and reported as [`TrendingFetch::Unavailable`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TrendingConfig;
use crate::platform::Platform;
use crate::{CaptionsError, Result};

/// Engagement assumed for a hashtag whose source reports none
const DEFAULT_ENGAGEMENT: f64 = 500.0;

/// A hashtag reported as trending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingHashtag {
    pub hashtag: String,
    #[serde(default)]
    pub engagement_score: Option<f64>,
}

/// Outcome of asking a source for trending hashtags
#[derive(Debug, Clone, PartialEq)]
pub enum TrendingFetch {
    Available(Vec<TrendingHashtag>),
    Unavailable { reason: String },
}

impl TrendingFetch {
    pub fn is_available(&self) -> bool {
        matches!(self, TrendingFetch::Available(_))
    }

    /// The hashtags, empty when unavailable
    pub fn hashtags(&self) -> &[TrendingHashtag] {
        match self {
            TrendingFetch::Available(tags) => tags,
            TrendingFetch::Unavailable { .. } => &[],
        }
    }
}

/// A source of trending hashtags
#[async_trait]
pub trait TrendingSource: Send + Sync {
    /// Short name for logs and insights
    fn name(&self) -> &str;

    /// Fetch up to `max` trending hashtags for a topic on a platform
    async fn fetch(&self, topic: &str, platform: Platform, max: usize) -> Result<Vec<TrendingHashtag>>;
}

/// Ask a source for trending hashtags, turning any failure into `Unavailable`
pub async fn fetch_trending(
    source: &dyn TrendingSource,
    topic: &str,
    platform: Platform,
    max: usize,
) -> TrendingFetch {
    match source.fetch(topic, platform, max).await {
        Ok(tags) if tags.is_empty() => TrendingFetch::Unavailable {
            reason: format!("{} has no trending hashtags for '{}'", source.name(), topic),
        },
        Ok(tags) => {
            debug!("{} returned {} trending hashtags for '{}'", source.name(), tags.len(), topic);
            TrendingFetch::Available(tags)
        }
        Err(e) => {
            warn!("Trending hashtags unavailable from {}: {}", source.name(), e);
            TrendingFetch::Unavailable { reason: e.to_string() }
        }
    }
}

/// Build the trending source described by the configuration
pub fn from_config(config: &TrendingConfig) -> Result<Arc<dyn TrendingSource>> {
    match &config.feed_url {
        Some(url) => Ok(Arc::new(FeedTrending::new(url)?)),
        None => Ok(Arc::new(CuratedTrending)),
    }
}

type PlatformTags = (&'static str, &'static [&'static str], &'static [&'static str]);

/// Curated per-topic lists: (topic, instagram, facebook)
const CURATED: &[PlatformTags] = &[
    (
        "food",
        &["#foodie2025", "#healthyrecipes", "#plantbasedmeals", "#foodphotography", "#homecooking"],
        &["#familymeals", "#cookingathome", "#healthyliving", "#foodblog"],
    ),
    (
        "travel",
        &["#wanderlust2025", "#solotravel", "#sustainabletravel", "#hiddenplaces", "#localcuisine"],
        &["#familytravel", "#roadtrip", "#vacation2025", "#traveltips"],
    ),
    (
        "fashion",
        &["#ootd2025", "#sustainablefashion", "#vintagestyle", "#thriftfinds", "#styleinspo"],
        &["#fashionadvice", "#styletrends", "#outfitideas", "#fashion2025"],
    ),
    (
        "fitness",
        &["#fitnessjourney", "#homeworkout", "#mentalhealthfitness", "#strongwomen", "#fitnessmotivation"],
        &["#healthylifestyle", "#workoutmotivation", "#wellness", "#fitnessgoals"],
    ),
    (
        "business",
        &["#entrepreneur2025", "#businessowner", "#digitalnomad", "#hustle", "#mindset"],
        &["#smallbusiness", "#entrepreneurship", "#businesstips", "#success"],
    ),
    (
        "events",
        &[
            "#celebration2025", "#festivalstoday", "#culturalheritage", "#festivalvibes",
            "#communitylove", "#festivemood",
        ],
        &["#familyfestival", "#culturalevent", "#traditioncelebration", "#festivalmemories"],
    ),
    (
        "lifestyle",
        &["#mindfuliving", "#dailyinspo", "#gratitudepractice", "#selfcaresunday", "#positivevibes"],
        &["#lifelessons", "#inspiration", "#motivation", "#wellbeing", "#mindfulness"],
    ),
    (
        "art",
        &["#artistsoninstagram", "#creativeminds", "#artoftheday", "#digitalart2025", "#arttherapy"],
        &["#localartists", "#artcommunity", "#creativeexpression", "#artlovers", "#inspiration"],
    ),
];

/// Built-in curated table; works offline
pub struct CuratedTrending;

#[async_trait]
impl TrendingSource for CuratedTrending {
    fn name(&self) -> &str {
        "curated"
    }

    async fn fetch(&self, topic: &str, platform: Platform, max: usize) -> Result<Vec<TrendingHashtag>> {
        let topic = topic.trim().to_lowercase();
        let tags = CURATED
            .iter()
            .find(|(name, _, _)| *name == topic)
            .map(|(_, instagram, facebook)| match platform {
                Platform::Instagram => *instagram,
                Platform::Facebook => *facebook,
            })
            .unwrap_or(&[]);

        Ok(tags
            .iter()
            .take(max)
            .enumerate()
            .map(|(i, tag)| TrendingHashtag {
                hashtag: tag.to_string(),
                engagement_score: Some(800.0 - i as f64 * 50.0),
            })
            .collect())
    }
}

/// Source that never has trending data
pub struct NoTrending;

#[async_trait]
impl TrendingSource for NoTrending {
    fn name(&self) -> &str {
        "none"
    }

    async fn fetch(&self, _topic: &str, _platform: Platform, _max: usize) -> Result<Vec<TrendingHashtag>> {
        Err(CaptionsError::Configuration("trending hashtags are disabled".to_string()))
    }
}

#[derive(Deserialize)]
struct FeedResponse {
    hashtags: Vec<TrendingHashtag>,
}

/// Remote JSON feed: `GET {url}?topic=..&platform=..`
pub struct FeedTrending {
    client: Client,
    url: String,
}

impl FeedTrending {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CaptionsError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl TrendingSource for FeedTrending {
    fn name(&self) -> &str {
        "feed"
    }

    async fn fetch(&self, topic: &str, platform: Platform, max: usize) -> Result<Vec<TrendingHashtag>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("topic", topic), ("platform", platform.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptionsError::Provider {
                status: Some(status.as_u16()),
                message: format!("trending feed returned {}", status),
            });
        }

        let feed: FeedResponse = response.json().await?;
        Ok(feed.hashtags.into_iter().take(max).collect())
    }
}

/// Average engagement of the trending hashtags on a 1-10 scale
pub fn trending_score(tags: &[TrendingHashtag]) -> f64 {
    if tags.is_empty() {
        return 3.0;
    }
    let total: f64 = tags
        .iter()
        .map(|t| t.engagement_score.unwrap_or(DEFAULT_ENGAGEMENT))
        .sum();
    let average = total / tags.len() as f64;
    (average / 1000.0 * 10.0).clamp(1.0, 10.0)
}

/// Summary of what is trending for a topic
#[derive(Debug, Clone, Serialize)]
pub struct TrendingInsights {
    pub topic: String,
    pub platform: Platform,
    pub source: String,
    pub available: bool,
    pub hashtags: Vec<TrendingHashtag>,
    pub trending_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Collect trending insights for a topic
pub async fn trending_insights(
    source: &dyn TrendingSource,
    topic: &str,
    platform: Platform,
    max: usize,
) -> TrendingInsights {
    let fetch = fetch_trending(source, topic, platform, max).await;
    let score = trending_score(fetch.hashtags());

    let (available, hashtags, reason) = match fetch {
        TrendingFetch::Available(tags) => (true, tags, None),
        TrendingFetch::Unavailable { reason } => (false, Vec::new(), Some(reason)),
    };

    TrendingInsights {
        topic: topic.to_string(),
        platform,
        source: source.name().to_string(),
        available,
        hashtags,
        trending_score: score,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    /// Serve `app` on an ephemeral local port and return the feed URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/trending", addr)
    }

    #[tokio::test]
    async fn test_curated_food_instagram() {
        let tags = CuratedTrending.fetch("food", Platform::Instagram, 3).await.unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].hashtag, "#foodie2025");
        assert_eq!(tags[0].engagement_score, Some(800.0));
        assert_eq!(tags[2].engagement_score, Some(700.0));
    }

    #[tokio::test]
    async fn test_unknown_topic_is_unavailable() {
        let fetch = fetch_trending(&CuratedTrending, "astrophysics", Platform::Facebook, 5).await;
        assert!(!fetch.is_available());
        assert!(fetch.hashtags().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_source_never_fails() {
        let fetch = fetch_trending(&NoTrending, "food", Platform::Instagram, 5).await;
        match fetch {
            TrendingFetch::Unavailable { reason } => assert!(reason.contains("disabled")),
            other => panic!("expected unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_unavailable() {
        let feed = FeedTrending::new("http://127.0.0.1:1/trending").unwrap();
        let fetch = fetch_trending(&feed, "food", Platform::Instagram, 5).await;
        assert!(!fetch.is_available());
    }

    #[tokio::test]
    async fn test_feed_parses_hashtags_and_applies_max() {
        let app = Router::new().route(
            "/trending",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("topic").map(String::as_str), Some("food"));
                assert_eq!(params.get("platform").map(String::as_str), Some("instagram"));
                Json(serde_json::json!({
                    "hashtags": [
                        { "hashtag": "#pastanight", "engagement_score": 900 },
                        { "hashtag": "#homecooking" },
                        { "hashtag": "#foodie", "engagement_score": 400.5 }
                    ]
                }))
            }),
        );
        let feed = FeedTrending::new(&serve(app).await).unwrap();

        let tags = feed.fetch("food", Platform::Instagram, 2).await.unwrap();
        assert_eq!(
            tags,
            vec![
                TrendingHashtag { hashtag: "#pastanight".to_string(), engagement_score: Some(900.0) },
                TrendingHashtag { hashtag: "#homecooking".to_string(), engagement_score: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_feed_error_status_is_unavailable() {
        let app = Router::new().route(
            "/trending",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "feed down") }),
        );
        let feed = FeedTrending::new(&serve(app).await).unwrap();

        match feed.fetch("food", Platform::Instagram, 5).await.unwrap_err() {
            CaptionsError::Provider { status, .. } => assert_eq!(status, Some(500)),
            other => panic!("unexpected error: {:?}", other),
        }
        let fetch = fetch_trending(&feed, "food", Platform::Instagram, 5).await;
        assert!(!fetch.is_available());
    }

    #[test]
    fn test_trending_score() {
        assert_eq!(trending_score(&[]), 3.0);

        let tags = vec![
            TrendingHashtag { hashtag: "#a".to_string(), engagement_score: Some(800.0) },
            TrendingHashtag { hashtag: "#b".to_string(), engagement_score: None },
        ];
        assert!((trending_score(&tags) - 6.5).abs() < 1e-9);

        let hot = vec![TrendingHashtag { hashtag: "#c".to_string(), engagement_score: Some(50_000.0) }];
        assert_eq!(trending_score(&hot), 10.0);
    }

    #[tokio::test]
    async fn test_insights_report_source() {
        let insights = trending_insights(&CuratedTrending, "travel", Platform::Facebook, 10).await;
        assert!(insights.available);
        assert_eq!(insights.source, "curated");
        assert_eq!(insights.hashtags.len(), 4);
        assert!(insights.reason.is_none());
    }
}
