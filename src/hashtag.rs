// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Hashtag generation from analysis keywords and trending data

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analyzer::{keywords, AnalysisResult};
use crate::categorizer::CategoryResult;
use crate::platform::Platform;
use crate::trending::{fetch_trending, trending_score, TrendingFetch, TrendingSource};

/// Leading slots reserved for each source before the remainder is appended
const LEAD_SLOTS: usize = 5;

const MIN_TAG_CHARS: usize = 3;
const MAX_TAG_CHARS: usize = 100;

/// Generated hashtags with their provenance and scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagSet {
    /// Final ranked list
    pub hashtags: Vec<String>,
    /// Candidates derived from the analysis
    pub keyword: Vec<String>,
    /// Candidates reported as trending
    pub trending: Vec<String>,
    pub trending_available: bool,
    pub engagement_potential: f64,
    pub trending_score: f64,
}

/// Normalize any text into `#lowercasealnum`, or `None` if too short or long
pub fn normalize_hashtag(raw: &str) -> Option<String> {
    let body: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    let len = body.chars().count() + 1;
    if (MIN_TAG_CHARS..=MAX_TAG_CHARS).contains(&len) {
        Some(format!("#{}", body))
    } else {
        None
    }
}

/// Keyword hashtag candidates: tags, then objects, then description words, then the topic.
///
/// Duplicates are dropped case-insensitively, keeping the first occurrence.
pub fn keyword_candidates(analysis: &AnalysisResult, category: &CategoryResult) -> Vec<String> {
    let description_words = keywords(&analysis.description);

    let mut seen = HashSet::new();
    analysis
        .tags
        .iter()
        .chain(analysis.objects.iter())
        .chain(description_words.iter())
        .map(String::as_str)
        .chain(category.topic.as_deref())
        .filter_map(normalize_hashtag)
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect()
}

/// Merge keyword and trending candidates into one ranked list.
///
/// Order: up to five keyword tags, up to five trending tags, the remaining
/// keyword tags, the remaining trending tags, then the brand tag. Duplicates
/// are dropped case-insensitively, keeping the first occurrence, and the
/// result holds at most `cap` tags.
pub fn merge_hashtags(
    keyword: &[String],
    trending: &TrendingFetch,
    brand: Option<&str>,
    cap: usize,
) -> Vec<String> {
    let trending: Vec<String> = trending
        .hashtags()
        .iter()
        .filter_map(|t| normalize_hashtag(&t.hashtag))
        .collect();

    let keyword_split = keyword.len().min(LEAD_SLOTS);
    let trending_split = trending.len().min(LEAD_SLOTS);
    let brand_tag = brand.and_then(normalize_hashtag);

    let ordered = keyword[..keyword_split]
        .iter()
        .chain(&trending[..trending_split])
        .chain(&keyword[keyword_split..])
        .chain(&trending[trending_split..])
        .chain(brand_tag.iter());

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for tag in ordered {
        if merged.len() == cap {
            break;
        }
        if seen.insert(tag.to_lowercase()) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// Estimated engagement of a hashtag list on a 1-10 scale
pub fn engagement_potential(hashtags: &[String], trending: &TrendingFetch) -> f64 {
    let trending_set: HashSet<String> = trending
        .hashtags()
        .iter()
        .map(|t| t.hashtag.to_lowercase())
        .collect();
    let matches = hashtags
        .iter()
        .filter(|h| trending_set.contains(&h.to_lowercase()))
        .count();

    let count = hashtags.len();
    let mut score = 5.0 + matches as f64 * 0.5;
    if count >= 8 {
        score += 1.0;
    }
    if (10..=15).contains(&count) {
        score += 0.5;
    }
    if count < 5 {
        score -= 1.0;
    } else if count > 25 {
        score -= 0.5;
    }
    score.clamp(1.0, 10.0)
}

/// Hashtag generator combining analysis keywords with a trending source
pub struct HashtagGenerator {
    trending: Arc<dyn TrendingSource>,
}

impl HashtagGenerator {
    pub fn new(trending: Arc<dyn TrendingSource>) -> Self {
        Self { trending }
    }

    /// Generate hashtags; never fails, trending problems degrade to keyword-only
    pub async fn generate(
        &self,
        analysis: &AnalysisResult,
        category: &CategoryResult,
        max: usize,
        platform: Platform,
        include_trending: bool,
        brand: Option<&str>,
    ) -> HashtagSet {
        let cap = max.min(platform.limits().max_hashtags);
        let keyword = keyword_candidates(analysis, category);

        let trending = if include_trending {
            let topic = category.topic.as_deref().unwrap_or(category.category.as_str());
            fetch_trending(self.trending.as_ref(), topic, platform, cap).await
        } else {
            TrendingFetch::Unavailable {
                reason: "trending hashtags not requested".to_string(),
            }
        };

        let hashtags = merge_hashtags(&keyword, &trending, brand, cap);
        debug!(
            "Merged {} keyword and {} trending candidates into {} hashtags",
            keyword.len(),
            trending.hashtags().len(),
            hashtags.len()
        );

        let set = HashtagSet {
            engagement_potential: engagement_potential(&hashtags, &trending),
            trending_score: trending_score(trending.hashtags()),
            trending_available: trending.is_available(),
            trending: trending.hashtags().iter().map(|t| t.hashtag.clone()).collect(),
            keyword,
            hashtags,
        };

        info!("Generated {} hashtags for {}", set.hashtags.len(), platform);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::categorize;
    use crate::trending::{CuratedTrending, NoTrending, TrendingHashtag};

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn available(list: &[&str]) -> TrendingFetch {
        TrendingFetch::Available(
            list.iter()
                .map(|t| TrendingHashtag { hashtag: t.to_string(), engagement_score: None })
                .collect(),
        )
    }

    #[test]
    fn test_normalize_hashtag() {
        assert_eq!(normalize_hashtag("Wooden Table!").as_deref(), Some("#woodentable"));
        assert_eq!(normalize_hashtag("#Foodie2025").as_deref(), Some("#foodie2025"));
        assert_eq!(normalize_hashtag("a"), None);
        assert_eq!(normalize_hashtag("###"), None);
        assert_eq!(normalize_hashtag(&"x".repeat(120)), None);
    }

    #[test]
    fn test_keyword_candidates_dedupe() {
        let analysis = AnalysisResult {
            description: "Pasta on a plate".to_string(),
            objects: tags(&["Plate", "fork"]),
            tags: tags(&["pasta", "PASTA"]),
            mood: None,
        };
        let category = categorize(&analysis);
        let candidates = keyword_candidates(&analysis, &category);
        assert_eq!(candidates, tags(&["#pasta", "#plate", "#fork", "#food"]));
    }

    #[test]
    fn test_keyword_candidates_from_mistyped_reply() {
        let raw = r#"{"description": "a plate of pasta", "objects": "plate, fork", "tags": {"a": 1}, "mood": 3}"#;
        let analysis = crate::analyzer::parse_analysis(raw).unwrap();
        let candidates = keyword_candidates(&analysis, &categorize(&analysis));
        for field in ["#description", "#objects", "#tags", "#mood"] {
            assert!(!candidates.iter().any(|c| c == field), "{} leaked", field);
        }
        assert_eq!(&candidates[..3], &tags(&["#plate", "#pasta", "#fork"])[..]);
    }

    #[test]
    fn test_merge_slot_order() {
        let keyword = tags(&["#k1", "#k2", "#k3", "#k4", "#k5", "#k6", "#k7"]);
        let trending = available(&["#t1", "#t2", "#t3", "#t4", "#t5", "#t6"]);
        let merged = merge_hashtags(&keyword, &trending, Some("Acme Co"), 30);
        assert_eq!(
            merged,
            tags(&[
                "#k1", "#k2", "#k3", "#k4", "#k5", "#t1", "#t2", "#t3", "#t4", "#t5", "#k6",
                "#k7", "#t6", "#acmeco"
            ])
        );
    }

    #[test]
    fn test_merge_dedupes_keeping_first() {
        let keyword = tags(&["#pasta", "#food"]);
        let trending = available(&["#Pasta", "#dinner"]);
        let merged = merge_hashtags(&keyword, &trending, Some("pasta"), 10);
        assert_eq!(merged, tags(&["#pasta", "#food", "#dinner"]));
    }

    #[test]
    fn test_merge_respects_cap() {
        let keyword = tags(&["#a1", "#a2", "#a3", "#a4"]);
        let merged = merge_hashtags(&keyword, &available(&["#b1", "#b2"]), None, 3);
        assert_eq!(merged, tags(&["#a1", "#a2", "#a3"]));
        assert!(merge_hashtags(&keyword, &available(&[]), None, 0).is_empty());
    }

    #[test]
    fn test_unavailable_trending_is_keyword_only() {
        let keyword = tags(&["#plate", "#pasta"]);
        let fetch = TrendingFetch::Unavailable { reason: "offline".to_string() };
        assert_eq!(merge_hashtags(&keyword, &fetch, None, 15), keyword);
    }

    #[test]
    fn test_engagement_potential() {
        let few = tags(&["#a", "#b"]);
        assert_eq!(engagement_potential(&few, &available(&[])), 4.0);

        let twelve: Vec<String> = (0..12).map(|i| format!("#tag{}", i)).collect();
        let score = engagement_potential(&twelve, &available(&["#tag0", "#TAG1"]));
        assert_eq!(score, 7.5);
    }

    #[tokio::test]
    async fn test_generate_capped_by_platform() {
        let analysis = AnalysisResult {
            description: "a plate of pasta with basil, tomato, parmesan and garlic bread".to_string(),
            objects: tags(&["plate", "fork", "glass", "napkin"]),
            tags: tags(&["pasta", "italian", "dinner", "homemade"]),
            mood: None,
        };
        let category = categorize(&analysis);
        let generator = HashtagGenerator::new(Arc::new(CuratedTrending));

        let set = generator
            .generate(&analysis, &category, 30, Platform::Facebook, true, Some("Nonna"))
            .await;
        assert!(set.trending_available);
        assert_eq!(set.hashtags.len(), Platform::Facebook.limits().max_hashtags);
        assert_eq!(set.hashtags[0], "#pasta");
        assert_eq!(set.hashtags[5], "#familymeals");
    }

    #[tokio::test]
    async fn test_generate_without_trending() {
        let analysis = AnalysisResult::from_description("a plate of pasta on a wooden table");
        let category = categorize(&analysis);
        let generator = HashtagGenerator::new(Arc::new(NoTrending));

        let set = generator
            .generate(&analysis, &category, 15, Platform::Instagram, true, None)
            .await;
        assert!(!set.trending_available);
        assert!(set.trending.is_empty());
        assert_eq!(set.hashtags, tags(&["#plate", "#pasta", "#wooden", "#table", "#food"]));
        assert_eq!(set.trending_score, 3.0);
    }
}
