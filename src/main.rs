// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! CaptionsAI command line interface
//!
//! Generates captions and hashtags for an image, inspects trending
//! hashtags and platform guidelines, and reports provider status.

use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

use captionsai::caption::{CaptionContext, CaptionStyle, Personalization};
use captionsai::config::AppConfig;
use captionsai::pipeline::{ContentPipeline, ContentRequest, ContentResult};
use captionsai::platform::Platform;
use captionsai::provider::OpenAiClient;
use captionsai::trending::{self, trending_insights};
use captionsai::Result;

/// CaptionsAI CLI - social media captions and hashtags from images
#[derive(Parser, Debug)]
#[command(name = "captionsai")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered social media captions and hashtags from images", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a caption and hashtags for an image
    Generate {
        /// Image file (jpg, jpeg, png, gif, bmp, webp)
        image: PathBuf,

        /// Target platform; repeat for several platforms
        #[arg(short, long, value_enum)]
        platform: Vec<Platform>,

        /// Caption style (default from DEFAULT_CAPTION_STYLE)
        #[arg(short, long, value_enum)]
        style: Option<CaptionStyle>,

        /// Brand name to mention and tag
        #[arg(short, long)]
        brand: Option<String>,

        /// Target audience description
        #[arg(short, long)]
        audience: Option<String>,

        /// Maximum number of hashtags (default from MAX_HASHTAGS)
        #[arg(long)]
        max_hashtags: Option<usize>,

        /// Number of caption variants (1-5)
        #[arg(long, default_value = "1")]
        variants: usize,

        /// Skip trending hashtags
        #[arg(long)]
        no_trending: bool,

        /// Ask for captions without emojis
        #[arg(long)]
        no_emojis: bool,

        #[command(flatten)]
        personalization: PersonalizationArgs,

        /// Also write the JSON result to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show trending hashtags for a topic
    Trending {
        /// Topic or category, e.g. food, travel, lifestyle
        topic: String,

        /// Platform to look up
        #[arg(short, long, value_enum, default_value = "instagram")]
        platform: Platform,

        /// Maximum hashtags to show
        #[arg(short, long, default_value = "15")]
        max: usize,
    },

    /// Show limits and guidelines for each platform
    Platforms {
        /// Include topic-specific tips
        #[arg(short, long)]
        topic: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show AI provider status
    Status,
}

/// Brand and post context written into the caption prompt
#[derive(Args, Debug)]
struct PersonalizationArgs {
    /// Brand voice, e.g. "warm and witty"
    #[arg(long)]
    voice: Option<String>,

    /// Industry the brand works in
    #[arg(long)]
    industry: Option<String>,

    /// Location to reference
    #[arg(long)]
    location: Option<String>,

    /// Audience interests, comma separated
    #[arg(long, value_delimiter = ',')]
    interests: Vec<String>,

    /// Keywords to work in, comma separated
    #[arg(long, value_delimiter = ',')]
    keywords: Vec<String>,

    /// Keywords to avoid, comma separated
    #[arg(long, value_delimiter = ',')]
    avoid: Vec<String>,

    /// Occasion, e.g. "sunday dinner"
    #[arg(long)]
    occasion: Option<String>,

    /// Content goal: engagement, awareness, sales, education
    #[arg(long)]
    goal: Option<String>,

    /// Desired mood of the caption
    #[arg(long)]
    mood: Option<String>,
}

impl PersonalizationArgs {
    fn into_parts(self) -> (Personalization, CaptionContext) {
        let personalization = Personalization {
            brand_voice: self.voice,
            industry: self.industry,
            location: self.location,
            interests: self.interests,
            brand_keywords: self.keywords,
            avoid_keywords: self.avoid,
        };
        let context = CaptionContext {
            occasion: self.occasion,
            content_goal: self.goal,
            mood: self.mood,
        };
        (personalization, context)
    }
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration (API key redacted)
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    let debug = config.as_ref().map(|c| c.debug).unwrap_or(false);

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose || debug {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(cli, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Dispatch a command; configuration errors only matter to commands that use it
async fn run(cli: Cli, config: Result<AppConfig>) -> Result<()> {
    let json = cli.format == "json";

    match cli.command {
        Commands::Generate {
            image,
            platform,
            style,
            brand,
            audience,
            max_hashtags,
            variants,
            no_trending,
            no_emojis,
            personalization,
            output,
        } => {
            let (personalization, context) = personalization.into_parts();
            let request = ContentRequest {
                image_path: image,
                platform: platform.first().copied().unwrap_or(Platform::Instagram),
                style,
                brand,
                target_audience: audience,
                hashtag_count: max_hashtags,
                variants,
                include_trending: !no_trending,
                include_emojis: !no_emojis,
                personalization,
                context,
            };
            run_generate(config?, request, platform, output, json).await
        }
        Commands::Trending { topic, platform, max } => run_trending(config?, topic, platform, max, json).await,
        Commands::Platforms { topic } => run_platforms(topic, json),
        Commands::Config { action } => run_config_command(config?, action),
        Commands::Status => run_status(config?).await,
    }
}

/// Generate content for one or more platforms
async fn run_generate(
    config: AppConfig,
    request: ContentRequest,
    platforms: Vec<Platform>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let pipeline = ContentPipeline::from_config(config)?;

    let results: BTreeMap<String, ContentResult> = if platforms.len() > 1 {
        pipeline.generate_multi(&request, &platforms).await
    } else {
        let result = pipeline.generate(&request).await;
        BTreeMap::from([(request.platform.as_str().to_string(), result)])
    };

    if let Some(path) = &output {
        std::fs::write(path, results_json(&results)?)?;
        info!("Wrote result to {:?}", path);
    }

    if json {
        println!("{}", results_json(&results)?);
    } else {
        for (platform, result) in &results {
            print_result(platform, result);
        }
    }

    let failed: Vec<&str> = results
        .iter()
        .filter(|(_, r)| !r.success)
        .map(|(p, _)| p.as_str())
        .collect();
    if !failed.is_empty() {
        error!("Generation failed for: {}", failed.join(", "));
        std::process::exit(1);
    }

    Ok(())
}

/// A single result as-is, several keyed by platform
fn results_json(results: &BTreeMap<String, ContentResult>) -> Result<String> {
    let json = match results.values().next() {
        Some(result) if results.len() == 1 => serde_json::to_string_pretty(result)?,
        _ => serde_json::to_string_pretty(results)?,
    };
    Ok(json)
}

fn print_result(platform: &str, result: &ContentResult) {
    println!("=== {} ===", platform);

    let post = match (&result.post, result.success) {
        (Some(post), true) => post,
        _ => {
            println!(
                "✗ {}: {}",
                result.error_kind.map(|k| k.to_string()).unwrap_or_default(),
                result.error.as_deref().unwrap_or("unknown error")
            );
            println!();
            return;
        }
    };

    println!("Category: {}", post.category);
    if let Some(topic) = &post.topic {
        println!("Topic:    {}", topic);
    }
    println!("\n{}\n", post.caption);
    println!("{}", post.hashtags.join(" "));

    for (i, alternative) in result.alternative_captions.iter().enumerate() {
        println!("\nAlternative {}:\n{}", i + 1, alternative);
    }

    if let Some(metrics) = &result.metrics {
        println!();
        if let Some(caption) = &metrics.caption {
            println!("Caption engagement:  {:.1}/10", caption.engagement_score);
        }
        println!("Hashtag engagement:  {:.1}/10", metrics.hashtag_engagement);
        if metrics.trending_available {
            println!("Trending score:      {:.1}/10", metrics.trending_score);
        } else {
            println!("Trending score:      unavailable");
        }
    }

    for warning in &post.warnings {
        warn!("{}", warning);
    }
    println!();
}

/// Show trending hashtags for a topic
async fn run_trending(config: AppConfig, topic: String, platform: Platform, max: usize, json: bool) -> Result<()> {
    let source = trending::from_config(&config.trending)?;
    let insights = trending_insights(source.as_ref(), &topic, platform, max).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    println!("Trending for '{}' on {} (source: {})", insights.topic, platform.title(), insights.source);
    if !insights.available {
        println!("  Unavailable: {}", insights.reason.as_deref().unwrap_or("no data"));
        return Ok(());
    }
    for tag in &insights.hashtags {
        match tag.engagement_score {
            Some(score) => println!("  {:<30} {:>8.0}", tag.hashtag, score),
            None => println!("  {}", tag.hashtag),
        }
    }
    println!("\nTrending score: {:.1}/10", insights.trending_score);

    Ok(())
}

/// Show limits and guidelines per platform
fn run_platforms(topic: Option<String>, json: bool) -> Result<()> {
    let guidelines: Vec<_> = Platform::ALL
        .iter()
        .map(|p| p.guidelines(topic.as_deref()))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&guidelines)?);
        return Ok(());
    }

    for g in &guidelines {
        println!("{}", g.platform.title());
        println!("  Caption: up to {} chars (optimal {})", g.limits.max_caption_chars, g.limits.optimal_caption_chars);
        println!("  Hashtags: up to {} (optimal {})", g.limits.max_hashtags, g.limits.optimal_hashtags);
        println!("  Tips:");
        for tip in &g.engagement_tips {
            println!("    - {}", tip);
        }
        println!("  Best times:");
        for time in &g.best_posting_times {
            println!("    - {}", time);
        }
        println!();
    }

    Ok(())
}

fn run_config_command(config: AppConfig, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
            let key = if config.ai.api_key.is_some() { "set" } else { "not set" };
            println!("OPENAI_API_KEY: {}", key);
        }
    }

    Ok(())
}

async fn run_status(config: AppConfig) -> Result<()> {
    println!("CaptionsAI v1.0.0 Status");
    println!("========================");
    println!("Provider: {}", config.ai.base_url);
    println!("Vision model: {}", config.ai.model);
    println!("Text model: {}", config.ai.text_model);

    let client = OpenAiClient::new(&config.ai)?;

    if let Err(e) = client.health_check().await {
        println!("\nProvider: Error - {}", e);
        return Err(e);
    }
    println!("\nProvider: Reachable");

    match client.list_models().await {
        Ok(models) => {
            let marker = |m: &str| if m == config.ai.model || m == config.ai.text_model { "→" } else { " " };
            println!("Available models:");
            for m in &models {
                println!("  {} {}", marker(m), m);
            }
        }
        Err(e) => warn!("Could not list models: {}", e),
    }

    let trending = match &config.trending.feed_url {
        Some(url) => format!("feed ({})", url),
        None => "curated".to_string(),
    };
    println!("\nTrending source: {}", trending);
    println!(
        "Platforms: {}",
        config
            .platforms
            .supported
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
