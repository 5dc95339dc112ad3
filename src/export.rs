use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Serialize;
use serde_json::json;
use std::{collections::HashMap, fs, path::Path};
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{AnalysisTables, Polarity};

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Write the two tables and the dashboard-ready aggregate JSONs into
/// `out/<venue>/`. Everything here is derived from the finished tables;
/// nothing feeds back into the pipeline.
pub fn write_all(out_dir: &Path, tables: &AnalysisTables) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    // 1) The tables themselves, venue columns denormalized per row
    let reviews = build_review_rows(tables);
    write_json(out_dir.join("reviews.json"), &reviews)?;

    let sentences = build_sentence_rows(tables);
    write_json(out_dir.join("sentences.json"), &sentences)?;

    // 2) Star-rating distribution (scraped reviews, not the whole listing)
    let ratings = build_ratings(tables);
    write_json(out_dir.join("viz.ratings.json"), &ratings)?;

    // 3) Topic volume + per-topic token frequencies (fallback label excluded)
    let topics = build_topics(tables);
    write_json(out_dir.join("viz.topics.json"), &topics)?;

    // 4) Hottest tokens across all sentences
    let keywords = build_keywords(tables);
    write_json(out_dir.join("viz.keywords.json"), &keywords)?;

    // 5) Per-topic sentiment aggregates
    let sentiment = build_sentiment(tables);
    write_json(out_dir.join("viz.sentiment.json"), &sentiment)?;

    // 6) Venue summary incl. promo-activity detection
    let summary = build_summary(tables);
    write_json(out_dir.join("summary.json"), &summary)?;

    // 7) Per-run index
    let idx = json!({
        "date": chrono::Utc::now().format("%Y-%m-%d").to_string(),
        "venue": tables.venue.name,
        "version": 1,
        "counts": {
            "reviews": tables.reviews.len(),
            "sentences": tables.sentences.len(),
            "sentences_skipped": tables.sentences_skipped,
        },
        "files": [
            "reviews.json",
            "sentences.json",
            "viz.ratings.json",
            "viz.topics.json",
            "viz.keywords.json",
            "viz.sentiment.json",
            "summary.json"
        ]
    });
    write_json(out_dir.join("index.json"), &idx)?;

    Ok(())
}

/// Directory-safe venue name: path separators and whitespace runs collapse
/// to single underscores.
pub fn venue_dir_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '.') {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .join("_")
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .map(|_| ())
        .map_err(|e| e.into())
}

fn record_id(parts: &[&str]) -> String {
    format!("{:016x}", xxh3_64(parts.join("|").as_bytes()))
}

/* -------------------------------------------------------------------------- */
/* 1) Tables                                                                  */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct ReviewRow {
    id: String, // stable across runs for identical input
    index: usize,
    venue: String,
    venue_rating: Option<f32>,
    venue_review_count: Option<u32>,
    text: String,
    rating: Option<u8>,
    keywords: String,
}

fn build_review_rows(tables: &AnalysisTables) -> Vec<ReviewRow> {
    tables
        .reviews
        .iter()
        .map(|r| ReviewRow {
            id: record_id(&[&tables.venue.name, &r.index.to_string(), &r.text]),
            index: r.index,
            venue: tables.venue.name.clone(),
            venue_rating: tables.venue.rating,
            venue_review_count: tables.venue.review_count,
            text: r.text.clone(),
            rating: r.rating,
            keywords: r.keywords.clone(),
        })
        .collect()
}

#[derive(Serialize)]
struct SentenceRow {
    id: String,
    review_index: usize,
    review_text: String, // denormalized for the dashboard
    rating: Option<u8>,
    sentence: String,
    words: String,
    topic: String,
    keywords: String,
    sentiment_score: f64,
    sentiment: Polarity,
}

fn build_sentence_rows(tables: &AnalysisTables) -> Vec<SentenceRow> {
    let text_of: HashMap<usize, &str> = tables
        .reviews
        .iter()
        .map(|r| (r.index, r.text.as_str()))
        .collect();

    tables
        .sentences
        .iter()
        .enumerate()
        .map(|(seq, s)| SentenceRow {
            id: record_id(&[
                &tables.venue.name,
                &s.review_index.to_string(),
                &seq.to_string(),
                &s.sentence,
            ]),
            review_index: s.review_index,
            review_text: text_of
                .get(&s.review_index)
                .copied()
                .unwrap_or_default()
                .to_string(),
            rating: s.rating,
            sentence: s.sentence.clone(),
            words: s.words.clone(),
            topic: s.topic.clone(),
            keywords: s.keywords.clone(),
            sentiment_score: s.sentiment_score,
            sentiment: s.sentiment,
        })
        .collect()
}

/* -------------------------------------------------------------------------- */
/* 2) Rating distribution                                                     */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VRatings {
    stars: Vec<u8>,      // always 1..=5
    counts: Vec<usize>,  // scraped reviews per star
    unrated: usize,      // star parsing failed upstream
    scraped_avg: Option<f32>,
    listing_rating: Option<f32>,
}

fn build_ratings(tables: &AnalysisTables) -> VRatings {
    let mut counts = vec![0usize; 5];
    let mut unrated = 0usize;
    for r in &tables.reviews {
        match r.rating {
            Some(stars @ 1..=5) => counts[stars as usize - 1] += 1,
            _ => unrated += 1,
        }
    }

    let rated: Vec<u8> = tables.reviews.iter().filter_map(|r| r.rating).collect();
    let scraped_avg = if rated.is_empty() {
        None
    } else {
        Some(rated.iter().map(|&s| s as f32).sum::<f32>() / rated.len() as f32)
    };

    VRatings {
        stars: vec![1, 2, 3, 4, 5],
        counts,
        unrated,
        scraped_avg,
        listing_rating: tables.venue.rating,
    }
}

/* -------------------------------------------------------------------------- */
/* 3) Topic volume + per-topic token frequency                                */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct WordCount {
    word: String,
    count: usize,
}

#[derive(Serialize)]
struct VTopic {
    topic: String,
    volume: usize,          // sentence rows labeled with this topic
    top_words: Vec<WordCount>, // most frequent tokens inside the topic
}

fn top_words<'a>(words: impl Iterator<Item = &'a str>, limit: usize) -> Vec<WordCount> {
    words
        .filter(|w| w.chars().count() > 1) // single chars are too noisy to chart
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(limit)
        .map(|(word, count)| WordCount {
            word: word.to_string(),
            count,
        })
        .collect()
}

fn build_topics(tables: &AnalysisTables) -> Vec<VTopic> {
    let mut order: Vec<&str> = Vec::new();
    let mut volume: HashMap<&str, usize> = HashMap::new();
    for s in &tables.sentences {
        if !volume.contains_key(s.topic.as_str()) {
            order.push(&s.topic);
        }
        *volume.entry(&s.topic).or_insert(0) += 1;
    }

    // The fallback bucket is deliberately left off the chart
    order
        .into_iter()
        .filter(|t| *t != "其他")
        .map(|topic| VTopic {
            topic: topic.to_string(),
            volume: volume[topic],
            top_words: top_words(
                tables
                    .sentences
                    .iter()
                    .filter(|s| s.topic == topic)
                    .flat_map(|s| s.words.split_whitespace()),
                10,
            ),
        })
        .sorted_by(|a, b| b.volume.cmp(&a.volume))
        .collect()
}

/* -------------------------------------------------------------------------- */
/* 4) Hottest tokens overall                                                  */
/* -------------------------------------------------------------------------- */

fn build_keywords(tables: &AnalysisTables) -> Vec<WordCount> {
    top_words(
        tables
            .sentences
            .iter()
            .flat_map(|s| s.words.split_whitespace()),
        10,
    )
}

/* -------------------------------------------------------------------------- */
/* 5) Per-topic sentiment aggregates                                          */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VSentiment {
    topic: String,
    sentences: usize,
    positive: usize,
    negative: usize,
    mean_score: f64,
}

fn build_sentiment(tables: &AnalysisTables) -> Vec<VSentiment> {
    let mut order: Vec<&str> = Vec::new();
    let mut buckets: HashMap<&str, (usize, usize, f64)> = HashMap::new();
    for s in &tables.sentences {
        if !buckets.contains_key(s.topic.as_str()) {
            order.push(&s.topic);
        }
        let entry = buckets.entry(&s.topic).or_insert((0, 0, 0.0));
        match s.sentiment {
            Polarity::Positive => entry.0 += 1,
            Polarity::Negative => entry.1 += 1,
        }
        entry.2 += s.sentiment_score;
    }

    order
        .into_iter()
        .map(|topic| {
            let (positive, negative, score_sum) = buckets[topic];
            let sentences = positive + negative;
            VSentiment {
                topic: topic.to_string(),
                sentences,
                positive,
                negative,
                mean_score: score_sum / sentences as f64,
            }
        })
        .collect()
}

/* -------------------------------------------------------------------------- */
/* 6) Venue summary                                                           */
/* -------------------------------------------------------------------------- */

// Reviews mentioning these suggest check-in-for-freebie campaigns inflating
// the rating.
const PROMO_MARKERS: [&str; 2] = ["打卡", "送"];

#[derive(Serialize)]
struct VSummary {
    venue: String,
    listing_rating: Option<f32>,
    listing_review_count: Option<u32>,
    scraped_reviews: usize,
    scraped_avg_rating: Option<f32>,
    rating_trend: Option<String>, // "higher" | "lower" | "flat" vs the listing
    promo_mentions: usize,
    promo_suspected: bool,
}

fn build_summary(tables: &AnalysisTables) -> VSummary {
    let rated: Vec<u8> = tables.reviews.iter().filter_map(|r| r.rating).collect();
    let scraped_avg = if rated.is_empty() {
        None
    } else {
        Some(rated.iter().map(|&s| s as f32).sum::<f32>() / rated.len() as f32)
    };

    let rating_trend = match (scraped_avg, tables.venue.rating) {
        (Some(avg), Some(overall)) => {
            // one decimal, like the listing displays ratings
            let avg = (avg * 10.0).round() / 10.0;
            Some(if avg > overall {
                "higher".to_string()
            } else if avg < overall {
                "lower".to_string()
            } else {
                "flat".to_string()
            })
        }
        _ => None,
    };

    let promo_mentions = tables
        .reviews
        .iter()
        .filter(|r| PROMO_MARKERS.iter().any(|m| r.text.contains(m)))
        .count();

    VSummary {
        venue: tables.venue.name.clone(),
        listing_rating: tables.venue.rating,
        listing_review_count: tables.venue.review_count,
        scraped_reviews: tables.reviews.len(),
        scraped_avg_rating: scraped_avg,
        rating_trend,
        promo_mentions,
        promo_suspected: promo_mentions >= 3,
    }
}
