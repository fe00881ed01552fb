use async_trait::async_trait;

use crate::app::ports::{QualityClassifierPort, SentimentClassifierPort};
use crate::domain::QualityLabel;
use crate::error::Result;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "fantastic", "helpful", "friendly", "love",
    "loved", "perfect", "fast", "clean", "happy", "recommend", "wonderful", "best", "nice", "quick",
    "pleasant", "satisfied",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "terrible", "awful", "horrible", "rude", "slow", "dirty", "hate", "hated",
    "worst", "broken", "late", "disappointed", "disappointing", "unhelpful", "angry", "refund",
    "never", "wrong", "cold",
];

/// Texts with at least this many words count as detailed feedback
const DETAILED_WORD_COUNT: usize = 20;
/// Texts with fewer words than this carry little signal
const TERSE_WORD_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Polarity {
    pub positive: usize,
    pub negative: usize,
    pub words: usize,
}

pub fn polarity(text: &str) -> Polarity {
    let mut result = Polarity::default();
    for word in text.split_whitespace() {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_ascii_lowercase();
        if word.is_empty() {
            continue;
        }
        result.words += 1;
        if POSITIVE_WORDS.contains(&word.as_str()) {
            result.positive += 1;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            result.negative += 1;
        }
    }
    result
}

/// Offline 3-class quality model: lexical cues scored per class, argmax.
#[derive(Debug, Default, Clone)]
pub struct LexiconQualityClassifier;

impl LexiconQualityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Unnormalized scores for Low, Medium, High
    pub fn scores(&self, text: &str) -> [f64; 3] {
        let p = polarity(text);
        let terse = if p.words < TERSE_WORD_COUNT { 0.5 } else { 0.0 };
        let detailed = if p.words >= DETAILED_WORD_COUNT { 0.5 } else { 0.0 };
        [
            p.negative as f64 + terse,
            1.0,
            p.positive as f64 + detailed,
        ]
    }

    pub fn predict(&self, text: &str) -> QualityLabel {
        let scores = self.scores(text);
        let mut best = 0;
        for (index, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = index;
            }
        }
        QualityLabel::from_index(best).unwrap_or(QualityLabel::Medium)
    }
}

#[async_trait]
impl QualityClassifierPort for LexiconQualityClassifier {
    async fn classify(&self, text: &str) -> Result<QualityLabel> {
        Ok(self.predict(text))
    }
}

/// Offline sentiment model with the binary POSITIVE / NEGATIVE vocabulary.
#[derive(Debug, Default, Clone)]
pub struct LexiconSentimentClassifier;

impl LexiconSentimentClassifier {
    pub const POSITIVE: &'static str = "POSITIVE";
    pub const NEGATIVE: &'static str = "NEGATIVE";

    pub fn new() -> Self {
        Self
    }

    pub fn label(&self, text: &str) -> &'static str {
        let p = polarity(text);
        if p.negative > p.positive {
            Self::NEGATIVE
        } else {
            Self::POSITIVE
        }
    }
}

#[async_trait]
impl SentimentClassifierPort for LexiconSentimentClassifier {
    async fn sentiment(&self, text: &str) -> Result<String> {
        Ok(self.label(text).to_string())
    }
}
