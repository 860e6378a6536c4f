// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Content categorization by keyword matching

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::analyzer::AnalysisResult;

/// Fixed set of content categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Lifestyle,
    Professional,
    Creative,
    Personal,
    Entertainment,
    Commercial,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Lifestyle,
        Category::Professional,
        Category::Creative,
        Category::Personal,
        Category::Entertainment,
        Category::Commercial,
    ];

    /// Category used when no keyword matches
    pub const DEFAULT: Category = Category::Lifestyle;

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Lifestyle => "lifestyle",
            Category::Professional => "professional",
            Category::Creative => "creative",
            Category::Personal => "personal",
            Category::Entertainment => "entertainment",
            Category::Commercial => "commercial",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fine-grained topic and the keywords that indicate it
pub struct Topic {
    pub name: &'static str,
    pub category: Category,
    pub keywords: &'static [&'static str],
}

/// Topic table, in tie-break order
pub const TOPICS: &[Topic] = &[
    Topic {
        name: "food",
        category: Category::Lifestyle,
        keywords: &[
            "food", "cooking", "dining", "recipe", "restaurant", "meal", "dish", "plate",
            "pasta", "pizza", "salad", "dessert", "cake", "bread", "breakfast", "lunch",
            "dinner", "coffee", "drink", "beverage", "fruit", "vegetable", "kitchen", "sushi",
            "burger", "soup",
        ],
    },
    Topic {
        name: "travel",
        category: Category::Lifestyle,
        keywords: &[
            "travel", "destination", "adventure", "landmark", "vacation", "holiday", "trip",
            "airport", "beach", "hotel", "tourist", "sightseeing", "passport", "monument",
        ],
    },
    Topic {
        name: "fashion",
        category: Category::Lifestyle,
        keywords: &[
            "fashion", "outfit", "style", "accessory", "accessories", "clothing", "dress",
            "shoes", "jacket", "handbag", "jewelry", "sunglasses",
        ],
    },
    Topic {
        name: "fitness",
        category: Category::Lifestyle,
        keywords: &[
            "fitness", "workout", "gym", "yoga", "running", "exercise", "training", "sport",
            "sports", "weights", "bicycle", "athlete",
        ],
    },
    Topic {
        name: "beauty",
        category: Category::Lifestyle,
        keywords: &["beauty", "skincare", "makeup", "haircare", "cosmetics", "lipstick", "nails", "spa"],
    },
    Topic {
        name: "business",
        category: Category::Professional,
        keywords: &[
            "business", "corporate", "meeting", "office", "networking", "productivity",
            "conference", "presentation", "desk", "suit", "team", "entrepreneur",
        ],
    },
    Topic {
        name: "technology",
        category: Category::Professional,
        keywords: &[
            "technology", "gadget", "software", "computer", "laptop", "phone", "smartphone",
            "robot", "code", "screen", "keyboard", "digital",
        ],
    },
    Topic {
        name: "education",
        category: Category::Professional,
        keywords: &[
            "education", "learning", "teaching", "book", "books", "course", "classroom",
            "school", "university", "student", "study", "library",
        ],
    },
    Topic {
        name: "art",
        category: Category::Creative,
        keywords: &[
            "art", "painting", "drawing", "sculpture", "design", "canvas", "gallery", "mural",
            "sketch", "artwork", "illustration",
        ],
    },
    Topic {
        name: "photography",
        category: Category::Creative,
        keywords: &["photography", "portrait", "landscape", "camera", "macro", "lens", "silhouette"],
    },
    Topic {
        name: "music",
        category: Category::Creative,
        keywords: &[
            "music", "instrument", "guitar", "piano", "drums", "singer", "recording", "studio",
            "microphone", "violin",
        ],
    },
    Topic {
        name: "family",
        category: Category::Personal,
        keywords: &[
            "family", "children", "child", "kids", "baby", "parents", "mother", "father",
            "grandmother", "grandfather", "siblings", "reunion",
        ],
    },
    Topic {
        name: "pets",
        category: Category::Personal,
        keywords: &["pet", "pets", "dog", "puppy", "cat", "kitten", "hamster", "parrot", "leash"],
    },
    Topic {
        name: "home",
        category: Category::Personal,
        keywords: &[
            "home", "interior", "decoration", "decor", "diy", "gardening", "garden", "sofa",
            "living room", "bedroom", "furniture", "houseplant",
        ],
    },
    Topic {
        name: "events",
        category: Category::Entertainment,
        keywords: &[
            "party", "celebration", "festival", "concert", "wedding", "birthday", "fireworks",
            "parade", "ceremony", "crowd", "stage",
        ],
    },
    Topic {
        name: "hobbies",
        category: Category::Entertainment,
        keywords: &["hobby", "crafts", "collection", "game", "games", "puzzle", "board game", "fishing", "knitting"],
    },
    Topic {
        name: "nature",
        category: Category::Entertainment,
        keywords: &[
            "nature", "outdoors", "wildlife", "plants", "forest", "mountain", "mountains",
            "lake", "river", "sunset", "sunrise", "flowers", "trees", "ocean",
        ],
    },
    Topic {
        name: "products",
        category: Category::Commercial,
        keywords: &[
            "product", "products", "review", "unboxing", "shopping", "deal", "sale", "package",
            "packaging", "bottle", "price",
        ],
    },
    Topic {
        name: "services",
        category: Category::Commercial,
        keywords: &["service", "services", "consulting", "tutorial", "demonstration", "support", "repair"],
    },
    Topic {
        name: "brand",
        category: Category::Commercial,
        keywords: &["brand", "logo", "marketing", "promotion", "advertisement", "billboard", "storefront"],
    },
];

/// Result of content categorization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    /// Best matching topic, if any keyword matched
    pub topic: Option<String>,
    /// Keywords of the winning topic found in the analysis
    pub matched_keywords: Vec<String>,
    /// Share of all keyword hits that belong to the winning topic
    pub confidence: f64,
}

/// Map an analysis to one of the fixed categories.
///
/// The topic with the most distinct keyword hits wins; ties go to the
/// topic listed first in [`TOPICS`].
pub fn categorize(analysis: &AnalysisResult) -> CategoryResult {
    let text = analysis.searchable_text();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let normalized = words.join(" ");

    let mut best: Option<(&Topic, Vec<String>)> = None;
    let mut total_hits = 0usize;

    for topic in TOPICS {
        let hits: Vec<String> = topic
            .keywords
            .iter()
            .filter(|kw| matches_keyword(kw, &words, &normalized))
            .map(|kw| kw.to_string())
            .collect();

        total_hits += hits.len();

        let better = match &best {
            Some((_, best_hits)) => hits.len() > best_hits.len(),
            None => !hits.is_empty(),
        };
        if better {
            best = Some((topic, hits));
        }
    }

    let result = match best {
        Some((topic, hits)) => CategoryResult {
            category: topic.category,
            topic: Some(topic.name.to_string()),
            confidence: hits.len() as f64 / total_hits.max(1) as f64,
            matched_keywords: hits,
        },
        None => CategoryResult {
            category: Category::DEFAULT,
            topic: None,
            matched_keywords: Vec::new(),
            confidence: 0.0,
        },
    };

    debug!(
        "Categorized as {} (topic: {:?}, confidence: {:.2})",
        result.category, result.topic, result.confidence
    );
    result
}

/// Single words match whole words or their plural; phrases match as a run of words
fn matches_keyword(keyword: &str, words: &[&str], normalized: &str) -> bool {
    if keyword.contains(' ') {
        return format!(" {} ", normalized).contains(&format!(" {} ", keyword));
    }
    words.iter().any(|w| {
        *w == keyword || w.strip_suffix('s') == Some(keyword) || w.strip_suffix("es") == Some(keyword)
    })
}
