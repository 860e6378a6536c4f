// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Caption generation through the language model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analyzer::AnalysisResult;
use crate::categorizer::CategoryResult;
use crate::platform::Platform;
use crate::provider::{strip_code_fences, VisionProvider};
use crate::{CaptionsError, Result};

/// Upper bound on captions produced for one request
pub const MAX_VARIANTS: usize = 5;

/// Tone modifiers applied to alternative captions, in order
const VARIANT_TONES: [&[&str]; MAX_VARIANTS - 1] = [
    &["authentic", "conversational"],
    &["educational", "informative"],
    &["storytelling", "personal"],
    &["trendy", "current"],
];

/// Caption writing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    #[default]
    Casual,
    Professional,
    Funny,
    Inspirational,
    Storytelling,
    Educational,
}

impl CaptionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionStyle::Casual => "casual",
            CaptionStyle::Professional => "professional",
            CaptionStyle::Funny => "funny",
            CaptionStyle::Inspirational => "inspirational",
            CaptionStyle::Storytelling => "storytelling",
            CaptionStyle::Educational => "educational",
        }
    }

    fn guidance(&self) -> (&'static str, &'static [&'static str], &'static [&'static str]) {
        match self {
            CaptionStyle::Casual => (
                "Write a relaxed, conversational caption that feels like talking to a friend",
                &["contractions", "casual language", "relatable tone"],
                &["overly formal language", "corporate speak"],
            ),
            CaptionStyle::Professional => (
                "Write a polished, business-appropriate caption that establishes authority",
                &["industry expertise", "professional insights", "valuable information"],
                &["casual slang", "overly personal details"],
            ),
            CaptionStyle::Funny => (
                "Write a humorous caption that entertains and brings joy",
                &["witty observations", "playful language", "light humor"],
                &["offensive content", "inside jokes", "forced humor"],
            ),
            CaptionStyle::Inspirational => (
                "Write an uplifting caption that motivates and inspires action",
                &["positive messaging", "empowering language"],
                &["negative language", "discouraging content"],
            ),
            CaptionStyle::Storytelling => (
                "Write a narrative caption that tells a compelling story",
                &["personal anecdotes", "narrative structure", "emotional connection"],
                &["dry facts", "impersonal content"],
            ),
            CaptionStyle::Educational => (
                "Write an informative caption that teaches something valuable",
                &["useful tips", "how-to information", "educational value"],
                &["overwhelming detail", "boring presentation"],
            ),
        }
    }
}

impl fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptionStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "casual" => Ok(CaptionStyle::Casual),
            "professional" => Ok(CaptionStyle::Professional),
            "funny" => Ok(CaptionStyle::Funny),
            "inspirational" => Ok(CaptionStyle::Inspirational),
            "storytelling" => Ok(CaptionStyle::Storytelling),
            "educational" => Ok(CaptionStyle::Educational),
            other => Err(format!("unknown caption style '{}'", other)),
        }
    }
}

/// Who the post speaks for and to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personalization {
    #[serde(default)]
    pub brand_voice: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Words the caption should work in
    #[serde(default)]
    pub brand_keywords: Vec<String>,
    /// Words the caption must not use
    #[serde(default)]
    pub avoid_keywords: Vec<String>,
}

/// The situation the post is written for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionContext {
    #[serde(default)]
    pub occasion: Option<String>,
    /// e.g. engagement, awareness, sales, education
    #[serde(default)]
    pub content_goal: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
}

/// Everything a caption prompt is built from
#[derive(Debug, Clone)]
pub struct CaptionInput<'a> {
    pub analysis: &'a AnalysisResult,
    pub category: &'a CategoryResult,
    pub style: CaptionStyle,
    pub platform: Platform,
    pub brand: Option<&'a str>,
    pub audience: Option<&'a str>,
    pub personalization: &'a Personalization,
    pub context: &'a CaptionContext,
    pub include_emojis: bool,
    /// Number of captions wanted, clamped to `1..=MAX_VARIANTS`
    pub variants: usize,
}

/// A generated caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    #[serde(alias = "caption")]
    pub text: String,
    #[serde(default)]
    pub hook: Option<String>,
    #[serde(default)]
    pub call_to_action: Option<String>,
    #[serde(default)]
    pub engagement_score: Option<f64>,
}

/// Heuristic performance estimate of a caption, each on a 1-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptionMetrics {
    pub engagement_score: f64,
    pub readability_score: f64,
    pub shareability_score: f64,
    pub platform_optimization: f64,
}

/// Caption generator backed by a language model
pub struct CaptionGenerator {
    provider: Arc<dyn VisionProvider>,
}

impl CaptionGenerator {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Generate one caption per requested variant.
    ///
    /// Any failed call fails the whole generation; partial results are dropped.
    pub async fn generate(&self, input: &CaptionInput<'_>) -> Result<Vec<Caption>> {
        let count = input.variants.clamp(1, MAX_VARIANTS);
        let mut captions = Vec::with_capacity(count);

        for index in 0..count {
            let tones: &[&str] = if index == 0 { &[] } else { VARIANT_TONES[index - 1] };
            let prompt = build_prompt(input, tones);

            debug!("Requesting caption {}/{}", index + 1, count);
            let response = self.provider.generate_text(&prompt).await?;
            captions.push(parse_caption(&response)?);
        }

        info!("Generated {} caption(s) in {} style", captions.len(), input.style);
        Ok(captions)
    }
}

/// Build the language-model prompt for one caption
pub fn build_prompt(input: &CaptionInput<'_>, tones: &[&str]) -> String {
    let (base, include, avoid) = input.style.guidance();
    let analysis = input.analysis;

    let mut prompt = format!(
        "Create an engaging social media caption for this image.\n\n\
         IMAGE ANALYSIS:\n\
         Description: {}\n",
        analysis.description
    );
    if !analysis.objects.is_empty() {
        prompt.push_str(&format!("Objects: {}\n", analysis.objects.join(", ")));
    }
    if let Some(mood) = &analysis.mood {
        prompt.push_str(&format!("Mood: {}\n", mood));
    }

    prompt.push_str(&format!(
        "\nSTYLE REQUIREMENTS:\n\
         - Style: {}\n\
         - Include: {}\n\
         - Avoid: {}\n\
         - Platform: {}\n\
         - Length: around {} characters\n\
         - Content Category: {}\n",
        base,
        include.join(", "),
        avoid.join(", "),
        input.platform.title(),
        input.platform.limits().optimal_caption_chars,
        input.category.category,
    ));
    if let Some(topic) = &input.category.topic {
        prompt.push_str(&format!("- Topic: {}\n", topic));
    }
    if let Some(brand) = input.brand {
        prompt.push_str(&format!("- Brand: {}\n", brand));
    }
    if let Some(audience) = input.audience {
        prompt.push_str(&format!("- Target Audience: {}\n", audience));
    }
    push_personalization(&mut prompt, input.personalization, input.context);
    if input.include_emojis {
        prompt.push_str("- Include: subtle call-to-action, engaging question, relevant emojis\n");
    } else {
        prompt.push_str("- Include: subtle call-to-action, engaging question\n");
        prompt.push_str("- IMPORTANT: Do NOT use any emojis in the caption. Write plain text only.\n");
    }
    if !tones.is_empty() {
        prompt.push_str(&format!("- Tone Modifiers: {}\n", tones.join(", ")));
    }

    prompt.push_str(
        "\nStart with a hook that is specific to what is in the image. \
         Write like a real person, not a marketing bot. Do not include hashtags.\n\n\
         Respond with JSON only:\n\
         {\"caption\": \"the complete caption\", \"hook\": \"the first line\", \
         \"call_to_action\": \"the engagement element\", \"engagement_score\": 7.5}",
    );

    prompt
}

fn push_personalization(prompt: &mut String, p: &Personalization, c: &CaptionContext) {
    let lines = [
        ("Industry", p.industry.clone()),
        ("Brand Voice", p.brand_voice.clone()),
        ("Location", p.location.clone()),
        ("User Interests", join_nonempty(&p.interests)),
        ("Include Keywords", join_nonempty(&p.brand_keywords)),
        ("Avoid Keywords", join_nonempty(&p.avoid_keywords)),
        ("Occasion", c.occasion.clone()),
        ("Goal", c.content_goal.clone()),
        ("Desired Mood", c.mood.clone()),
    ];
    for (label, value) in lines {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            prompt.push_str(&format!("- {}: {}\n", label, value.trim()));
        }
    }
}

fn join_nonempty(list: &[String]) -> Option<String> {
    let items: Vec<&str> = list.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    (!items.is_empty()).then(|| items.join(", "))
}

/// Parse a caption reply.
///
/// A JSON object must carry a string `caption`; other fields are read when
/// they have the expected type and ignored otherwise. Replies that are not
/// JSON are used verbatim.
pub fn parse_caption(raw: &str) -> Result<Caption> {
    let text = strip_code_fences(raw);

    let caption = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => caption_from_fields(&fields)?,
        Ok(Value::String(s)) => plain_caption(&s),
        _ => {
            debug!("Caption reply was not a JSON object, using entire text as caption");
            plain_caption(text)
        }
    };

    let text = caption.text.trim().trim_matches('"').trim().to_string();
    if text.is_empty() {
        return Err(CaptionsError::provider("Provider returned an empty caption"));
    }

    Ok(Caption { text, ..caption })
}

fn caption_from_fields(fields: &Map<String, Value>) -> Result<Caption> {
    let text = fields
        .get("caption")
        .or_else(|| fields.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| CaptionsError::provider("Caption reply JSON has no string 'caption' field"))?;

    let string_field = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(Caption {
        text: text.to_string(),
        hook: string_field("hook"),
        call_to_action: string_field("call_to_action"),
        engagement_score: fields.get("engagement_score").and_then(Value::as_f64),
    })
}

fn plain_caption(text: &str) -> Caption {
    Caption {
        text: text.to_string(),
        hook: text.lines().next().map(str::to_string),
        call_to_action: None,
        engagement_score: None,
    }
}

/// Estimate how well a caption might perform on a platform
pub fn score_caption(caption: &str, platform: Platform) -> CaptionMetrics {
    let word_count = caption.split_whitespace().count();
    let char_count = caption.chars().count();

    let has_question = caption.contains('?');
    let has_emoji = caption.chars().any(|c| !c.is_ascii() && !c.is_alphanumeric());
    let has_hashtag = caption.contains('#');
    let line_breaks = caption.matches('\n').count();

    let mut engagement: f64 = 5.0;
    if has_question {
        engagement += 1.5;
    }
    if has_emoji {
        engagement += 1.0;
    }
    if line_breaks > 0 {
        engagement += 0.5;
    }
    if (50..=150).contains(&char_count) {
        engagement += 1.0;
    } else if char_count > 300 {
        engagement -= 0.5;
    }

    match platform {
        Platform::Instagram => {
            if has_hashtag {
                engagement += 0.5;
            }
            if word_count > 50 {
                engagement -= 0.5;
            }
        }
        Platform::Facebook => {
            if (20..=80).contains(&word_count) {
                engagement += 0.5;
            }
        }
    }

    CaptionMetrics {
        engagement_score: engagement.clamp(1.0, 10.0),
        readability_score: if line_breaks > 0 { 8.0 } else { 6.0 },
        shareability_score: if has_question || has_emoji { 7.5 } else { 5.0 },
        platform_optimization: if char_count <= 150 { 8.0 } else { 6.0 },
    }
}
