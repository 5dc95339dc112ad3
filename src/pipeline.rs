use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use jieba_rs::Jieba;
use rayon::prelude::*;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::classify::classify_sentence;
use crate::export;
use crate::fetch::fetch_venue_reviews_opt;
use crate::lexicon::{self, TopicLexicon};
use crate::models::{AnalysisTables, Polarity, RawReview, ReviewRecord, SentenceRecord, VenueMeta};
use crate::segment::split_sentences;
use crate::sentiment::SentimentModel;
use crate::tokenize::{extract_keywords, tokenize_sentence, ExtractParams};

/// Read-only per-run resources: the segmenter with its user dictionary, the
/// stopword set, the topic lexicon and the sentiment model. Nothing here is
/// mutated after load, so one instance serves concurrent runs.
pub struct Resources {
    pub jieba: Jieba,
    pub stopwords: HashSet<String>,
    pub lexicon: TopicLexicon,
    pub sentiment: SentimentModel,
    pub params: ExtractParams,
}

impl Resources {
    /// Missing dictionary or stopword files abort here: startup precondition,
    /// not a per-review failure.
    pub fn load(dict_path: &Path, stopword_path: &Path, lexicon: TopicLexicon) -> Result<Self> {
        let start = std::time::Instant::now();

        let mut jieba = Jieba::new();
        let dict_entries = lexicon::load_tokenizer_dictionary(&mut jieba, dict_path)?;
        let stopwords = lexicon::load_stopwords(stopword_path)?;

        info!(
            "Resources loaded - duration={:.2}s, dict_entries={}, stopwords={}, topics={}",
            start.elapsed().as_secs_f32(),
            dict_entries,
            stopwords.len(),
            lexicon.topic_names().len()
        );

        Ok(Self {
            jieba,
            stopwords,
            lexicon,
            sentiment: SentimentModel::new(),
            params: ExtractParams::default(),
        })
    }
}

/// Full run against the scraping service: fetch, analyze, write the
/// dashboard bundle. An unresolvable venue or zero reviews produces empty
/// tables (and an empty bundle), not an error.
pub async fn run_analysis(
    client: &Client,
    api_base: &str,
    venue_query: &str,
    desired: u32,
    res: &Resources,
    output_dir: &str,
) -> Result<AnalysisTables> {
    let (venue, raw) = match fetch_venue_reviews_opt(client, api_base, venue_query, desired).await? {
        Some(fetched) => fetched,
        None => (
            VenueMeta {
                name: venue_query.to_string(),
                rating: None,
                review_count: None,
            },
            Vec::new(),
        ),
    };

    let tables = run_pipeline(venue, raw, res);

    let venue_dir = Path::new(output_dir).join(export::venue_dir_name(&tables.venue.name));
    export::write_all(&venue_dir, &tables)?;
    info!("Output written - directory={}", venue_dir.display());

    Ok(tables)
}

/// The review-to-insight expansion. Output order of both tables matches the
/// arrival order of `raw`; sentence rows keep source order within a review.
pub fn run_pipeline(venue: VenueMeta, raw: Vec<RawReview>, res: &Resources) -> AnalysisTables {
    let pipeline_start = std::time::Instant::now();

    if raw.is_empty() {
        info!("No reviews to analyze - venue={}, returning empty tables", venue.name);
        return AnalysisTables {
            venue,
            reviews: Vec::new(),
            sentences: Vec::new(),
            sentences_skipped: 0,
        };
    }

    // 1) one ReviewRecord per RawReview: 1-based index in arrival order plus
    //    the review-level keyword string. Indexed rayon iterators keep order.
    let kw_start = std::time::Instant::now();
    let reviews: Vec<ReviewRecord> = raw
        .par_iter()
        .enumerate()
        .map(|(i, r)| ReviewRecord {
            index: i + 1,
            text: r.text.clone(),
            rating: r.rating,
            keywords: extract_keywords(&res.jieba, &r.text, res.params),
        })
        .collect();
    info!(
        "Keyword extraction completed - duration={:.2}s, reviews={}",
        kw_start.elapsed().as_secs_f32(),
        reviews.len()
    );

    // 2) segment every review up front so sentiment can batch over distinct
    //    sentence texts. A review segmenting to nothing contributes no rows.
    let segmented: Vec<Vec<String>> = reviews.iter().map(|r| split_sentences(&r.text)).collect();
    let sentence_total: usize = segmented.iter().map(Vec::len).sum();
    debug!(
        "Segmentation - reviews={}, sentences={}",
        reviews.len(),
        sentence_total
    );

    // 3) score distinct sentences in parallel; duplicates share one score
    let score_start = std::time::Instant::now();
    let all_sentences: Vec<&str> = segmented
        .iter()
        .flat_map(|v| v.iter().map(String::as_str))
        .collect();
    let scores = res.sentiment.score_all(&res.jieba, &all_sentences);
    info!(
        "Sentiment scoring completed - duration={:.2}s, distinct_sentences={}",
        score_start.elapsed().as_secs_f32(),
        scores.len()
    );

    // 4) expand: tokenize, classify, attach sentiment
    let mut sentences = Vec::with_capacity(sentence_total);
    let mut skipped = 0usize;
    for (record, review_sentences) in reviews.iter().zip(&segmented) {
        for sentence in review_sentences {
            let words = tokenize_sentence(&res.jieba, sentence, &res.stopwords);
            let topic = classify_sentence(&words, &res.lexicon);

            // A sentence the scorer refused is skipped, never fatal.
            let Some(&score) = scores.get(sentence.as_str()) else {
                skipped += 1;
                continue;
            };

            sentences.push(SentenceRecord {
                review_index: record.index,
                rating: record.rating,
                sentence: sentence.clone(),
                words,
                topic,
                keywords: record.keywords.clone(),
                sentiment_score: score,
                sentiment: Polarity::from_score(score),
            });
        }
    }
    if skipped > 0 {
        warn!("Sentences skipped by sentiment scorer - count={}", skipped);
    }

    info!(
        "Pipeline completed - duration={:.2}s, reviews={}, sentences={}, skipped={}",
        pipeline_start.elapsed().as_secs_f32(),
        reviews.len(),
        sentences.len(),
        skipped
    );

    AnalysisTables {
        venue,
        reviews,
        sentences,
        sentences_skipped: skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_resources() -> Resources {
        let mut jieba = Jieba::new();
        for w in ["餐點", "好吃", "服務", "態度", "分鐘"] {
            jieba.add_word(w, Some(10_000), Some("n"));
        }
        Resources {
            jieba,
            stopwords: HashSet::new(),
            lexicon: TopicLexicon::new(
                vec![
                    ("食物", vec!["好吃"]),
                    ("服務", vec!["態度"]),
                    ("時間", vec!["分鐘"]),
                ],
                "其他",
            ),
            sentiment: SentimentModel::new(),
            params: ExtractParams::default(),
        }
    }

    fn venue() -> VenueMeta {
        VenueMeta {
            name: "測試餐廳".to_string(),
            rating: Some(4.2),
            review_count: Some(100),
        }
    }

    #[test]
    fn expands_review_into_classified_sentences() {
        let res = test_resources();
        let raw = vec![RawReview {
            text: "餐點好吃。服務態度差，等了20分鐘。".to_string(),
            rating: Some(3),
        }];

        let tables = run_pipeline(venue(), raw, &res);

        assert_eq!(tables.reviews.len(), 1);
        assert_eq!(tables.reviews[0].index, 1);
        assert_eq!(tables.sentences.len(), 3);
        assert_eq!(tables.sentences_skipped, 0);

        let topics: Vec<&str> = tables.sentences.iter().map(|s| s.topic.as_str()).collect();
        assert_eq!(topics, vec!["食物", "服務", "時間"]);

        for s in &tables.sentences {
            assert_eq!(s.review_index, 1);
            assert_eq!(s.rating, Some(3));
            assert!((0.0..=1.0).contains(&s.sentiment_score));
            assert_eq!(s.sentiment, Polarity::from_score(s.sentiment_score));
        }
        assert_eq!(tables.sentences[0].sentence, "餐點好吃");
        assert_eq!(tables.sentences[0].sentiment, Polarity::Positive);
        assert_eq!(tables.sentences[1].sentiment, Polarity::Negative);
    }

    #[test]
    fn row_count_matches_segmentation() {
        let res = test_resources();
        let raw = vec![
            RawReview {
                text: "好吃！推薦。".to_string(),
                rating: Some(5),
            },
            RawReview {
                text: "".to_string(),
                rating: Some(5),
            },
            RawReview {
                text: "態度差".to_string(),
                rating: Some(1),
            },
        ];

        let expected: usize = raw.iter().map(|r| split_sentences(&r.text).len()).sum();
        let tables = run_pipeline(venue(), raw, &res);

        assert_eq!(tables.sentences.len() + tables.sentences_skipped, expected);
        assert_eq!(tables.reviews.len(), 3);
    }

    #[test]
    fn empty_body_yields_no_sentences() {
        let res = test_resources();
        let raw = vec![RawReview {
            text: "".to_string(),
            rating: Some(5),
        }];

        let tables = run_pipeline(venue(), raw, &res);
        assert_eq!(tables.reviews.len(), 1);
        assert!(tables.sentences.is_empty());
        assert_eq!(tables.sentences_skipped, 0);
    }

    #[test]
    fn zero_reviews_yield_empty_tables() {
        let res = test_resources();
        let tables = run_pipeline(venue(), Vec::new(), &res);
        assert!(tables.reviews.is_empty());
        assert!(tables.sentences.is_empty());
    }

    #[test]
    fn indices_are_sequential_and_order_preserving() {
        let res = test_resources();
        let raw: Vec<RawReview> = (0..12)
            .map(|i| RawReview {
                text: format!("第{}則：好吃。", i),
                rating: Some(4),
            })
            .collect();

        let tables = run_pipeline(venue(), raw.clone(), &res);
        for (i, (record, source)) in tables.reviews.iter().zip(&raw).enumerate() {
            assert_eq!(record.index, i + 1);
            assert_eq!(record.text, source.text);
        }

        // every sentence row resolves to an existing review record
        let max_index = tables.reviews.len();
        for s in &tables.sentences {
            assert!(s.review_index >= 1 && s.review_index <= max_index);
        }
    }
}
