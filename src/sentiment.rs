use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use jieba_rs::Jieba;
use rayon::prelude::*;
use tracing::warn;

// Seed word-frequency tables for the two classes, distilled from venue-review
// text. Counts are per-class occurrence totals; words may appear in both
// tables with different weights (態度 shows up far more often in complaints).
const POSITIVE: &[(&str, u32)] = &[
    ("好吃", 180),
    ("好", 150),
    ("不錯", 110),
    ("美味", 90),
    ("推薦", 85),
    ("親切", 75),
    ("新鮮", 70),
    ("讚", 65),
    ("好喝", 60),
    ("棒", 60),
    ("喜歡", 55),
    ("乾淨", 50),
    ("滿意", 45),
    ("香", 45),
    ("快", 40),
    ("便宜", 35),
    ("貼心", 35),
    ("舒適", 35),
    ("很棒", 30),
    ("值得", 30),
    ("划算", 30),
    ("友善", 26),
    ("愛", 25),
    ("熱情", 24),
    ("濃郁", 22),
    ("服務", 20),
    ("舒服", 20),
    ("脆", 20),
    ("推", 20),
    ("實惠", 20),
    ("專業", 18),
    ("用心", 18),
    ("嫩", 18),
    ("酥", 18),
    ("招牌", 16),
    ("豐富", 16),
    ("快速", 15),
    ("溫馨", 15),
    ("必點", 14),
    ("耐心", 14),
    ("效率", 14),
    ("優惠", 14),
    ("享受", 14),
    ("多汁", 12),
    ("完美", 12),
    ("超值", 12),
    ("悠閒", 12),
    ("飽", 12),
    ("細心", 10),
    ("驚豔", 10),
    ("回訪", 10),
    ("誠意", 8),
    ("微笑", 8),
    ("佛心", 6),
    ("態度", 6),
];

const NEGATIVE: &[(&str, u32)] = &[
    ("不", 160),
    ("難吃", 140),
    ("差", 130),
    ("貴", 75),
    ("等", 70),
    ("失望", 70),
    ("慢", 65),
    ("久", 55),
    ("態度", 50),
    ("糟糕", 45),
    ("髒", 45),
    ("沒有", 45),
    ("不好", 45),
    ("沒", 40),
    ("少", 40),
    ("普通", 35),
    ("鹹", 35),
    ("吵", 35),
    ("爛", 30),
    ("難", 30),
    ("冷", 30),
    ("排隊", 28),
    ("油膩", 25),
    ("雷", 25),
    ("臭", 25),
    ("錯", 22),
    ("小", 22),
    ("可惜", 20),
    ("兇", 20),
    ("油", 20),
    ("噁心", 18),
    ("浪費", 18),
    ("淡", 15),
    ("不耐煩", 15),
    ("傻眼", 14),
    ("後悔", 14),
    ("隨便", 14),
    ("漲價", 12),
    ("踩雷", 12),
    ("敷衍", 12),
    ("頭髮", 10),
    ("地雷", 10),
    ("冷淡", 10),
    ("蟑螂", 10),
    ("抱怨", 10),
    ("漏", 10),
    ("失誤", 8),
    ("蒼蠅", 8),
    ("嫌", 8),
    ("忘", 8),
];

/// Probability-based short-text sentiment: per-class word log-probabilities
/// with Laplace smoothing over the shared vocabulary, equal class priors,
/// two-class posterior as the score. Read-only after construction, safe to
/// share across threads.
pub struct SentimentModel {
    pos: HashMap<&'static str, f64>, // ln P(word | positive)
    neg: HashMap<&'static str, f64>, // ln P(word | negative)
    pos_unseen: f64,                 // ln P(word | positive) for unlisted words
    neg_unseen: f64,
}

impl SentimentModel {
    pub fn new() -> Self {
        let vocab: HashSet<&str> = POSITIVE
            .iter()
            .chain(NEGATIVE)
            .map(|(w, _)| *w)
            .collect();
        let v = vocab.len() as f64;

        let pos_total: f64 = POSITIVE.iter().map(|(_, c)| *c as f64).sum();
        let neg_total: f64 = NEGATIVE.iter().map(|(_, c)| *c as f64).sum();

        let pos = POSITIVE
            .iter()
            .map(|(w, c)| (*w, ((*c as f64 + 1.0) / (pos_total + v)).ln()))
            .collect();
        let neg = NEGATIVE
            .iter()
            .map(|(w, c)| (*w, ((*c as f64 + 1.0) / (neg_total + v)).ln()))
            .collect();

        Self {
            pos,
            neg,
            pos_unseen: (1.0 / (pos_total + v)).ln(),
            neg_unseen: (1.0 / (neg_total + v)).ln(),
        }
    }

    /// Score one sentence's raw text in [0, 1] (higher = more positive).
    /// Blank input, or input that segments to nothing scoreable, is an error;
    /// the caller decides whether to skip or abort.
    pub fn score_text(&self, jieba: &Jieba, text: &str) -> Result<f64> {
        if text.trim().is_empty() {
            bail!("cannot score a blank sentence");
        }

        let words: Vec<&str> = jieba
            .cut(text, true)
            .into_iter()
            .filter(|w| !w.trim().is_empty())
            .collect();
        if words.is_empty() {
            bail!("sentence segmented to no scoreable tokens: {:?}", text);
        }

        Ok(self.score_words(&words))
    }

    fn score_words(&self, words: &[&str]) -> f64 {
        let mut lp = 0.0f64;
        let mut ln = 0.0f64;
        for w in words {
            lp += self.pos.get(*w).copied().unwrap_or(self.pos_unseen);
            ln += self.neg.get(*w).copied().unwrap_or(self.neg_unseen);
        }
        // P(pos | words) with equal priors, computed without leaving log space
        // until the final ratio: 1 / (1 + exp(ln - lp)).
        1.0 / (1.0 + (ln - lp).exp())
    }

    /// Score every distinct sentence text once, in parallel. Scoring is a
    /// pure function of text, so duplicate sentences (common across reviews)
    /// share one entry. Failures are logged and absent from the map.
    pub fn score_all<'a>(&self, jieba: &Jieba, sentences: &[&'a str]) -> HashMap<&'a str, f64> {
        let mut unique: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for &s in sentences {
            if seen.insert(s) {
                unique.push(s);
            }
        }

        let scored: Vec<(&str, Result<f64>)> = unique
            .par_iter()
            .map(|&s| (s, self.score_text(jieba, s)))
            .collect();

        let mut out = HashMap::with_capacity(scored.len());
        for (s, result) in scored {
            match result {
                Ok(score) => {
                    out.insert(s, score);
                }
                Err(e) => warn!("Sentiment scoring failed - sentence dropped: {}", e),
            }
        }
        out
    }
}

impl Default for SentimentModel {
    fn default() -> Self {
        Self::new()
    }
}
