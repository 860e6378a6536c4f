// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image analysis using a vision model

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::provider::{strip_code_fences, VisionProvider};
use crate::{CaptionsError, Result};

/// Longest side, in pixels, of the image sent to the provider
const MAX_IMAGE_SIDE: u32 = 1024;

const ANALYSIS_PROMPT: &str = "Describe this image for a social media post. \
Focus on the main subjects, activity, setting, style and mood. \
Respond with JSON only, in this shape: \
{\"description\": \"one or two sentences\", \"objects\": [\"visible objects\"], \
\"tags\": [\"short single-word topics\"], \"mood\": \"one word\"}";

/// Result of image analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Natural language description of the image
    pub description: String,
    /// Objects detected in the image
    #[serde(default)]
    pub objects: Vec<String>,
    /// Short topical tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Overall mood, when the model reports one
    #[serde(default)]
    pub mood: Option<String>,
}

impl AnalysisResult {
    /// Build an analysis from free text, deriving tags from its words
    pub fn from_description(description: impl Into<String>) -> Self {
        let description = description.into();
        let tags = keywords(&description);
        Self {
            description,
            objects: Vec::new(),
            tags,
            mood: None,
        }
    }

    /// All text of the analysis, lowercased, for keyword matching
    pub fn searchable_text(&self) -> String {
        let mut text = self.description.to_lowercase();
        for word in self.objects.iter().chain(self.tags.iter()) {
            text.push(' ');
            text.push_str(&word.to_lowercase());
        }
        text
    }
}

/// Analyzer that turns an image into an [`AnalysisResult`]
pub struct AiAnalyzer {
    provider: Arc<dyn VisionProvider>,
}

impl AiAnalyzer {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Analyze a validated image with exactly one provider call
    pub async fn analyze(&self, path: &Path) -> Result<AnalysisResult> {
        info!("Analyzing image: {:?}", path);

        // Resize when decodable, otherwise send the raw bytes
        let image_data = match prepare_image(path) {
            Ok(data) => general_purpose::STANDARD.encode(&data),
            Err(e) => {
                debug!("Could not re-encode {:?} ({}), sending raw bytes", path, e);
                encode_image(path)?
            }
        };

        let response = self.provider.describe_image(ANALYSIS_PROMPT, &image_data).await?;
        let analysis = parse_analysis(&response)?;

        debug!(
            "Analysis: {} objects, {} tags",
            analysis.objects.len(),
            analysis.tags.len()
        );
        Ok(analysis)
    }
}

/// Convert image to base64 for vision model
fn encode_image(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    Ok(general_purpose::STANDARD.encode(&data))
}

/// Resize large images and re-encode them as JPEG
fn prepare_image(path: &Path) -> Result<Vec<u8>> {
    let img = image::open(path)?;

    let img = if img.width() > MAX_IMAGE_SIDE || img.height() > MAX_IMAGE_SIDE {
        img.resize(MAX_IMAGE_SIDE, MAX_IMAGE_SIDE, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel
    let img = image::DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    img.write_to(&mut cursor, image::ImageFormat::Jpeg)?;

    Ok(buffer)
}

/// Parse the provider reply.
///
/// A JSON object must carry a string `description`; `objects` and `tags`
/// may be arrays or comma-separated strings, and fields of any other type
/// are ignored. Replies that are not JSON become a plain description.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(CaptionsError::provider("Empty analysis from provider"));
    }

    let fields = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => fields,
        Ok(Value::String(s)) => return Ok(AnalysisResult::from_description(s)),
        _ => {
            debug!("Analysis reply was not a JSON object, using it as description");
            return Ok(AnalysisResult::from_description(text));
        }
    };

    let description = fields
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| CaptionsError::provider("Analysis reply JSON has no string 'description' field"))?;

    let mut analysis = AnalysisResult {
        description: description.to_string(),
        objects: string_list(fields.get("objects")),
        tags: string_list(fields.get("tags")),
        mood: fields
            .get("mood")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
    };
    if analysis.tags.is_empty() {
        analysis.tags = keywords(&analysis.description);
    }
    Ok(analysis)
}

/// Strings of a JSON array, or the items of a comma-separated string
fn string_list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<&str> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => s.split(',').collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Content words of a text: lowercase, alphabetic, no stop words, first-seen order
pub fn keywords(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();

    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
    {
        if word.len() >= 3 && !is_stop_word(&word) && !words.contains(&word) {
            words.push(word);
        }
    }

    words
}

fn is_stop_word(word: &str) -> bool {
    matches!(
        word,
        "the" | "and" | "for" | "with" | "from" | "this" | "that" | "are" | "was" | "were"
            | "has" | "have" | "its" | "into" | "onto" | "over" | "under" | "some" | "there"
            | "their" | "they" | "while" | "which" | "image" | "photo" | "picture" | "shows"
            | "showing" | "features" | "featuring" | "appears" | "visible" | "can" | "seen"
            | "very" | "also" | "near" | "next" | "top" | "front" | "background"
    )
}
