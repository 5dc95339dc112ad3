use std::collections::HashSet;

use itertools::Itertools;
use jieba_rs::{Jieba, KeywordExtract, TextRank};

/// Knobs for review-level keyword extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractParams {
    pub candidates: usize,     // TextRank pool size before filtering
    pub weight_threshold: f64, // keep terms scoring at least this
    pub max_keywords: usize,   // cap after threshold filtering
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            candidates: 20,
            weight_threshold: 0.1,
            max_keywords: 5,
        }
    }
}

// Parts of speech eligible for keyword ranking: place nouns, nouns,
// verb-nouns, verbs.
const KEYWORD_POS: [&str; 4] = ["ns", "n", "vn", "v"];

/// Segment a sentence, drop stopwords, re-join with single spaces. The result
/// may be empty when every token was a stopword.
pub fn tokenize_sentence(jieba: &Jieba, sentence: &str, stopwords: &HashSet<String>) -> String {
    jieba
        .cut(sentence, true)
        .into_iter()
        .filter(|w| !stopwords.contains(*w))
        .join(" ")
}

/// Graph-ranked salient terms for a whole review body, weight-descending,
/// ", "-joined. Terms below the weight threshold are discarded before the
/// count cap; no terms clearing it is an empty string, not an error.
pub fn extract_keywords(jieba: &Jieba, text: &str, params: ExtractParams) -> String {
    let allowed: Vec<String> = KEYWORD_POS.iter().map(|s| s.to_string()).collect();
    TextRank::default()
        .extract_keywords(jieba, text, params.candidates, allowed)
        .into_iter()
        .filter(|k| k.weight >= params.weight_threshold)
        .take(params.max_keywords)
        .map(|k| k.keyword)
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jieba_with_domain_words() -> Jieba {
        let mut jieba = Jieba::new();
        for w in ["餐點", "好吃", "服務", "態度", "分鐘", "薯條", "難吃"] {
            jieba.add_word(w, Some(10_000), Some("n"));
        }
        jieba
    }

    #[test]
    fn tokenizes_and_space_joins() {
        let jieba = jieba_with_domain_words();
        let words = tokenize_sentence(&jieba, "餐點好吃", &HashSet::new());
        assert_eq!(words, "餐點 好吃");
    }

    #[test]
    fn filters_stopwords() {
        let jieba = jieba_with_domain_words();
        let stopwords: HashSet<String> = ["的", "很"].iter().map(|s| s.to_string()).collect();
        let words = tokenize_sentence(&jieba, "這裡的薯條很好吃", &stopwords);
        assert!(!words.split(' ').any(|w| w == "的" || w == "很"));
        assert!(words.contains("薯條"));
        assert!(words.contains("好吃"));
    }

    #[test]
    fn all_stopword_sentence_tokenizes_to_empty() {
        let jieba = jieba_with_domain_words();
        let stopwords: HashSet<String> = ["餐點", "好吃"].iter().map(|s| s.to_string()).collect();
        assert_eq!(tokenize_sentence(&jieba, "餐點好吃", &stopwords), "");
    }

    #[test]
    fn keyword_extraction_respects_cap_and_threshold() {
        let jieba = jieba_with_domain_words();
        let params = ExtractParams::default();
        let text = "薯條好吃，服務態度好，餐點出餐快，薯條新鮮，薯條必點，服務親切，餐點豐富";
        let joined = extract_keywords(&jieba, text, params);

        if !joined.is_empty() {
            let terms: Vec<&str> = joined.split(", ").collect();
            assert!(terms.len() <= params.max_keywords);
            assert!(terms.iter().all(|t| !t.is_empty()));
        }
    }

    #[test]
    fn keyword_extraction_on_empty_text_is_empty() {
        let jieba = jieba_with_domain_words();
        assert_eq!(extract_keywords(&jieba, "", ExtractParams::default()), "");
    }

    #[test]
    fn tight_threshold_filters_everything() {
        let jieba = jieba_with_domain_words();
        let params = ExtractParams {
            weight_threshold: 1e9,
            ..ExtractParams::default()
        };
        assert_eq!(extract_keywords(&jieba, "薯條好吃，服務親切", params), "");
    }
}
