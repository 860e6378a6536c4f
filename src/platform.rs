// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Social media platforms, their limits, and post adaptation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::categorizer::Category;

/// Supported target platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
}

/// Caption and hashtag limits of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformLimits {
    pub max_caption_chars: usize,
    pub optimal_caption_chars: usize,
    pub max_hashtags: usize,
    pub optimal_hashtags: usize,
}

/// Static posting guidance for a platform
#[derive(Debug, Clone, Serialize)]
pub struct PlatformGuidelines {
    pub platform: Platform,
    pub limits: PlatformLimits,
    pub engagement_tips: Vec<&'static str>,
    pub best_posting_times: Vec<&'static str>,
}

type TopicTips = &'static [(&'static str, [&'static str; 2])];

const INSTAGRAM_TIPS: &[&str] = &[
    "Ask a question to encourage comments",
    "Use relevant Instagram Story stickers",
    "Post when your audience is most active",
    "Use a mix of popular and niche hashtags",
];

const INSTAGRAM_TIMES: &[&str] = &[
    "6 AM - 9 AM (morning commute)",
    "12 PM - 2 PM (lunch break)",
    "5 PM - 7 PM (evening commute)",
    "7 PM - 9 PM (evening leisure)",
];

const INSTAGRAM_TOPIC_TIPS: TopicTips = &[
    ("food", ["Tag the location", "Share the recipe in comments"]),
    ("travel", ["Use location tags", "Share travel tips"]),
    ("fashion", ["Tag brands and stores", "Create outfit details"]),
    ("fitness", ["Share your workout routine", "Motivate with transformation stories"]),
    ("business", ["Share valuable insights", "Use professional hashtags"]),
];

const FACEBOOK_TIPS: &[&str] = &[
    "Ask questions to start conversations",
    "Share personal stories and experiences",
    "Use Facebook Groups for niche communities",
    "Post at times when your friends are online",
];

const FACEBOOK_TIMES: &[&str] = &[
    "9 AM - 10 AM (morning check-in)",
    "1 PM - 3 PM (lunch and afternoon)",
    "7 PM - 9 PM (evening leisure)",
];

const FACEBOOK_TOPIC_TIPS: TopicTips = &[
    ("business", ["Join relevant Facebook Groups", "Share valuable industry insights"]),
    ("family", ["Tag family members", "Share memories and stories"]),
    ("events", ["Create Facebook Events", "Encourage RSVPs and shares"]),
    ("travel", ["Check in to locations", "Share travel experiences"]),
    ("food", ["Share recipes and cooking tips", "Tag restaurants"]),
];

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Instagram, Platform::Facebook];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
        }
    }

    /// Display name used in prompts
    pub fn title(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
        }
    }

    pub fn limits(&self) -> PlatformLimits {
        match self {
            Platform::Instagram => PlatformLimits {
                max_caption_chars: 2200,
                optimal_caption_chars: 125,
                max_hashtags: 30,
                optimal_hashtags: 11,
            },
            Platform::Facebook => PlatformLimits {
                max_caption_chars: 63206,
                optimal_caption_chars: 80,
                max_hashtags: 10,
                optimal_hashtags: 3,
            },
        }
    }

    /// Engagement tips and posting times, with topic-specific extras
    pub fn guidelines(&self, topic: Option<&str>) -> PlatformGuidelines {
        let (base_tips, times, topic_tips) = match self {
            Platform::Instagram => (INSTAGRAM_TIPS, INSTAGRAM_TIMES, INSTAGRAM_TOPIC_TIPS),
            Platform::Facebook => (FACEBOOK_TIPS, FACEBOOK_TIMES, FACEBOOK_TOPIC_TIPS),
        };

        let mut tips = base_tips.to_vec();
        if let Some(topic) = topic {
            if let Some((_, extra)) = topic_tips.iter().find(|(name, _)| *name == topic) {
                tips.extend(extra.iter().copied());
            }
        }
        tips.truncate(5);

        PlatformGuidelines {
            platform: *self,
            limits: self.limits(),
            engagement_tips: tips,
            best_posting_times: times.to_vec(),
        }
    }

    /// Content warnings for a caption and hashtag set
    pub fn content_warnings(&self, caption: &str, hashtags: &[String]) -> Vec<String> {
        let mut warnings = Vec::new();
        let caption_lower = caption.to_lowercase();

        match self {
            Platform::Instagram => {
                if ["sale", "buy now", "discount", "promo"]
                    .iter()
                    .any(|t| caption_lower.contains(t))
                {
                    warnings.push("Promotional content detected - may affect reach".to_string());
                }
                if hashtags
                    .iter()
                    .any(|h| h.eq_ignore_ascii_case("#follow") || h.eq_ignore_ascii_case("#like"))
                {
                    warnings.push("Avoid engagement-baiting hashtags like #follow #like".to_string());
                }
            }
            Platform::Facebook => {
                let promo = ["buy", "sale", "discount", "offer", "deal"]
                    .iter()
                    .filter(|t| caption_lower.contains(*t))
                    .count();
                if promo > 2 {
                    warnings.push("High promotional content may reduce organic reach".to_string());
                }
                if caption_lower.contains("http") || caption_lower.contains("www.") {
                    warnings.push(
                        "External links may reduce organic reach - consider native content".to_string(),
                    );
                }
            }
        }

        warnings
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            other => Err(format!("unsupported platform '{}'", other)),
        }
    }
}

/// Caption and hashtags before platform limits are applied
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub category: Category,
    pub topic: Option<String>,
}

/// A post ready for one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub category: Category,
    pub topic: Option<String>,
    pub platform: Platform,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Post {
    /// Caption followed by hashtags, when both fit within the caption limit
    pub fn render(&self) -> String {
        if self.hashtags.is_empty() {
            return self.caption.clone();
        }
        let tags = self.hashtags.join(" ");
        let joined = if self.caption.is_empty() {
            tags
        } else {
            format!("{}\n\n{}", self.caption, tags)
        };
        if joined.chars().count() <= self.platform.limits().max_caption_chars {
            joined
        } else {
            self.caption.clone()
        }
    }
}

/// Enforce platform limits on a draft by truncation
pub fn adapt(draft: PostDraft, platform: Platform) -> Post {
    let limits = platform.limits();

    let caption = truncate_caption(draft.caption.trim(), limits.max_caption_chars);
    let mut hashtags = draft.hashtags;
    if hashtags.len() > limits.max_hashtags {
        debug!(
            "Dropping {} hashtags over the {} limit",
            hashtags.len() - limits.max_hashtags,
            platform
        );
        hashtags.truncate(limits.max_hashtags);
    }

    let warnings = platform.content_warnings(&caption, &hashtags);

    Post {
        caption,
        hashtags,
        category: draft.category,
        topic: draft.topic,
        platform,
        warnings,
    }
}

/// Cut `text` to at most `max_chars` characters, ending on a word boundary with an ellipsis
pub fn truncate_caption(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let kept: String = text.chars().take(max_chars - 1).collect();
    let cut = match kept.rfind(char::is_whitespace) {
        Some(idx) if idx > kept.len() / 2 => &kept[..idx],
        _ => kept.as_str(),
    };

    format!("{}…", cut.trim_end())
}
