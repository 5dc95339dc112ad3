use crate::lexicon::TopicLexicon;

/// Assign one topic to a sentence from its space-joined token string.
/// First-match rule: topics are tried in lexicon order and the first with any
/// trigger keyword present wins; triggers match by substring of the token
/// string, not whole-token equality. Sentences matching nothing get the
/// lexicon's fallback label.
pub fn classify_sentence(words: &str, lexicon: &TopicLexicon) -> String {
    for (topic, triggers) in lexicon.topics() {
        if triggers.iter().any(|kw| words.contains(kw.as_str())) {
            return topic.to_string();
        }
    }
    lexicon.fallback().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> TopicLexicon {
        TopicLexicon::new(
            vec![
                ("食物", vec!["好吃", "難吃"]),
                ("服務", vec!["態度"]),
                ("時間", vec!["分鐘", "等"]),
            ],
            "其他",
        )
    }

    #[test]
    fn first_listed_topic_wins_shared_triggers() {
        let lex = TopicLexicon::new(vec![("A", vec!["x"]), ("B", vec!["x"])], "other");
        assert_eq!(classify_sentence("x y", &lex), "A");
    }

    #[test]
    fn declared_order_breaks_multi_topic_ties() {
        // Both 態度 (服務) and 分鐘 (時間) present; 服務 is listed first.
        assert_eq!(classify_sentence("服務 態度 差 等 了 20 分鐘", &lexicon()), "服務");
    }

    #[test]
    fn unmatched_sentence_gets_fallback() {
        assert_eq!(classify_sentence("今天 天氣 不錯", &lexicon()), "其他");
        assert_eq!(classify_sentence("", &lexicon()), "其他");
    }

    #[test]
    fn matches_by_substring_of_token_string() {
        // 好吃 stays findable even when segmentation glued it into 超好吃.
        assert_eq!(classify_sentence("超好吃", &lexicon()), "食物");
    }

    #[test]
    fn classification_is_total_over_lexicon_labels() {
        let lex = lexicon();
        let mut labels: Vec<&str> = lex.topic_names();
        labels.push(lex.fallback());

        for words in ["好吃", "態度", "分鐘", "隨便 說 點 什麼", ""] {
            let got = classify_sentence(words, &lex);
            assert!(labels.contains(&got.as_str()));
        }
    }
}
