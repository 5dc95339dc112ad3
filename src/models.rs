use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueMeta {
    pub name: String,              // resolved listing name, may differ from the query
    pub rating: Option<f32>,       // overall listing rating, None if unparseable
    pub review_count: Option<u32>, // total review count shown on the listing
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReview {
    pub text: String,
    pub rating: Option<u8>, // 1-5 stars, None when star parsing failed upstream
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub index: usize, // 1-based, assignment order = scrape arrival order
    pub text: String,
    pub rating: Option<u8>,
    pub keywords: String, // top-K ranked terms, ", "-joined, may be empty
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub review_index: usize, // parent ReviewRecord.index
    pub rating: Option<u8>,  // denormalized from the parent review
    pub sentence: String,
    pub words: String,    // stopword-filtered tokens, space-joined, may be empty
    pub topic: String,    // one lexicon topic or the fallback label
    pub keywords: String, // denormalized review-level keyword string
    pub sentiment_score: f64, // [0, 1], higher = more positive
    pub sentiment: Polarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Strict threshold: a score of exactly 0.5 classifies negative.
    pub fn from_score(score: f64) -> Self {
        if score > 0.5 {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

/// The pipeline's two output tables plus run-level bookkeeping. Handed to the
/// presentation layer as a read-only snapshot; nothing downstream mutates or
/// re-derives these fields.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisTables {
    pub venue: VenueMeta,
    pub reviews: Vec<ReviewRecord>,
    pub sentences: Vec<SentenceRecord>,
    pub sentences_skipped: usize, // dropped on sentiment scorer failure
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_threshold_is_strict() {
        assert_eq!(Polarity::from_score(0.51), Polarity::Positive);
        assert_eq!(Polarity::from_score(0.5), Polarity::Negative);
        assert_eq!(Polarity::from_score(0.49), Polarity::Negative);
        assert_eq!(Polarity::from_score(0.0), Polarity::Negative);
        assert_eq!(Polarity::from_score(1.0), Polarity::Positive);
    }
}
