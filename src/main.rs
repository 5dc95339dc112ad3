mod api_types;
mod classify;
mod export;
mod fetch;
mod lexicon;
mod models;
mod pipeline;
mod segment;
mod sentiment;
mod tokenize;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};

/// Review Vibes - venue review insight pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Venue name to look up on the listing service
    venue: String,

    /// How many reviews to request from the scraper
    #[arg(short = 'n', long, default_value_t = 60)]
    count: u32,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Base URL of the review scraping service (overrides REVIEW_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Path to the tokenizer user dictionary (overrides REVIEW_USERDICT)
    #[arg(long)]
    userdict: Option<String>,

    /// Path to the stopword list (overrides REVIEW_STOPWORDS)
    #[arg(long)]
    stopwords: Option<String>,
}

// CLI flag > env var > repo default
fn resolve(cli: Option<String>, env_key: &str, default: &str) -> String {
    if let Some(v) = cli {
        return v;
    }
    std::env::var(env_key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting review_vibes");

    let args = Args::parse();

    let api_base = resolve(args.api_base, "REVIEW_API_BASE", "http://localhost:8787");
    let dict_path = PathBuf::from(resolve(
        args.userdict,
        "REVIEW_USERDICT",
        "resources/userdict.txt",
    ));
    let stop_path = PathBuf::from(resolve(
        args.stopwords,
        "REVIEW_STOPWORDS",
        "resources/stopwords.txt",
    ));
    debug!(
        "Resource paths - userdict={}, stopwords={}, api_base={}",
        dict_path.display(),
        stop_path.display(),
        api_base
    );

    // Friendlier errors than a bare io::Error if either file is missing
    if !dict_path.exists() {
        return Err(anyhow::anyhow!(
            "tokenizer dictionary not found at {}\n\
             Use --userdict to point at one, or set REVIEW_USERDICT.\n\
             Format: one entry per line, `詞 [frequency] [tag]`.",
            dict_path.display()
        ));
    }
    if !stop_path.exists() {
        return Err(anyhow::anyhow!(
            "stopword list not found at {}\n\
             Use --stopwords to point at one, or set REVIEW_STOPWORDS.\n\
             Format: one stopword per line, UTF-8.",
            stop_path.display()
        ));
    }

    let resources =
        pipeline::Resources::load(&dict_path, &stop_path, lexicon::TopicLexicon::restaurant())?;

    let client = reqwest::Client::builder().build()?;
    let tables = pipeline::run_analysis(
        &client,
        &api_base,
        &args.venue,
        args.count,
        &resources,
        &args.output_dir,
    )
    .await?;

    if tables.reviews.is_empty() {
        warn!(
            "No reviews collected - venue={}, the dashboard will show a no-data state",
            args.venue
        );
    } else {
        info!(
            "Analysis complete - venue={}, reviews={}, sentences={}, skipped={}",
            tables.venue.name,
            tables.reviews.len(),
            tables.sentences.len(),
            tables.sentences_skipped
        );
    }

    Ok(())
}
