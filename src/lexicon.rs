use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use jieba_rs::Jieba;

/// Ordered topic -> trigger keyword mapping. Declaration order is part of the
/// classification contract: the first topic with any trigger present wins, so
/// reordering topics (or their keywords) changes output for sentences that
/// match more than one topic.
#[derive(Debug, Clone)]
pub struct TopicLexicon {
    topics: Vec<(String, Vec<String>)>,
    fallback: String,
}

impl TopicLexicon {
    pub fn new<T, K>(topics: Vec<(T, Vec<K>)>, fallback: impl Into<String>) -> Self
    where
        T: Into<String>,
        K: Into<String>,
    {
        Self {
            topics: topics
                .into_iter()
                .map(|(name, kws)| (name.into(), kws.into_iter().map(Into::into).collect()))
                .collect(),
            fallback: fallback.into(),
        }
    }

    pub fn topics(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.topics.iter().map(|(n, k)| (n.as_str(), k.as_slice()))
    }

    pub fn topic_names(&self) -> Vec<&str> {
        self.topics.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// The restaurant-review lexicon the dashboard is built around. Trigger
    /// lists are ordered most-specific-first within each topic; topic order
    /// itself resolves ties for sentences touching several topics.
    pub fn restaurant() -> Self {
        Self::new(
            vec![
                (
                    "食物",
                    vec![
                        "爆漿", "拿鐵", "熱騰騰", "融化", "薯條", "美乃滋", "醬", "冰", "蜂蜜",
                        "抹茶", "巧克力", "餡料", "內餡", "餡", "肉", "雞", "雞肉", "豬", "豬肉",
                        "牛", "牛肉", "蔬菜", "飲料", "美食", "調味", "點心", "早餐", "午餐",
                        "中餐", "下午茶", "晚餐", "宵夜", "消夜", "用料", "小氣", "大方", "香",
                        "軟", "脆", "品質", "口味", "嚼勁", "冷", "酥", "材料", "套餐", "東西",
                        "食物", "鬆餅", "華夫餅", "食材", "餐點", "好吃", "難吃", "吃", "喝",
                        "油", "鹹", "甜", "苦", "辣", "酸", "味道", "份量", "飽", "味口", "甜點",
                        "湯", "麵", "飯", "炸物", "烤肉", "燒烤", "料理", "小吃", "健康", "營養",
                        "新鮮", "美味", "口感", "濃", "清淡", "微辣", "重口味", "淡", "鮮",
                        "醇厚", "濃郁",
                    ],
                ),
                (
                    "服務",
                    vec![
                        "作業", "流程", "加強", "訓練", "傻眼", "人手不足", "語氣", "邏輯",
                        "規定", "抱歉", "道歉", "工讀生", "臉", "欠", "櫃檯", "點餐", "吼",
                        "服務", "態度", "笑", "臭", "糟糕", "店員", "貼心", "友善", "員工",
                        "店家", "兇", "忙", "專業", "親切", "耐心", "效率", "反應", "收銀",
                        "推薦", "滿意", "不滿意", "失望", "慢", "不專業", "差", "熱情", "不耐煩",
                    ],
                ),
                (
                    "時間",
                    vec![
                        "上菜", "出單", "出餐", "一早", "人潮", "等待", "時間", "分鐘", "等",
                        "慢", "久", "快", "排", "排隊", "一下", "速度",
                    ],
                ),
                (
                    "價格",
                    vec![
                        "折扣", "打折", "漲", "漲價", "價格", "偏高", "貴", "cp值", "CP值",
                        "划算", "便宜", "$", "新台幣", "台幣", "實惠", "錢", "性價比", "不划算",
                        "優惠", "套餐", "過高", "不值", "低價", "高價",
                    ],
                ),
                (
                    "環境",
                    vec![
                        "整潔", "氛圍", "清幽", "溫馨", "髒", "乾淨", "吵", "安靜", "蟑螂",
                        "老鼠", "蚊子", "蟲", "蒼蠅", "衛生", "悠閒", "亂", "擠", "舒適", "氣氛",
                        "清潔", "噪音", "空氣", "冷氣", "光線", "佈置", "擁擠", "空間", "座位",
                        "陰暗", "清新", "宜人", "涼爽", "美觀", "裝潢", "餐具", "廁所", "清理",
                        "消毒", "垃圾", "異味", "手部消毒",
                    ],
                ),
            ],
            "其他",
        )
    }
}

/// Register domain vocabulary with the segmenter so multi-character terms
/// (menu items, local slang) are not split by the generic dictionary.
/// Missing file is a startup error, not a per-review one.
pub fn load_tokenizer_dictionary(jieba: &mut Jieba, path: &Path) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Missing tokenizer dictionary: {}", path.display()))?;

    let entries = content.lines().filter(|l| !l.trim().is_empty()).count();
    jieba
        .load_dict(&mut content.as_bytes())
        .map_err(|e| anyhow!("Malformed tokenizer dictionary {}: {}", path.display(), e))?;

    Ok(entries)
}

/// One stopword per line, UTF-8. Blank lines are skipped and duplicate lines
/// collapse into the set.
pub fn load_stopwords(path: &Path) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Missing stopword file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
