// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Text analytics attached to every analysis report
//!
//! Provides:
//! - Lexicon-based sentiment polarity
//! - Heuristic source-domain trust scoring
//! - Basic readability statistics

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

/// Polarity lexicon: word -> score in [-1, 1]
const LEXICON: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("happy", 0.8),
    ("safe", 0.5),
    ("success", 0.6),
    ("successful", 0.75),
    ("positive", 0.23),
    ("improved", 0.5),
    ("win", 0.8),
    ("wins", 0.8),
    ("benefit", 0.5),
    ("free", 0.4),
    ("new", 0.14),
    ("amazing", 0.6),
    ("wonderful", 1.0),
    ("true", 0.35),
    ("hope", 0.5),
    ("peace", 0.5),
    ("growth", 0.4),
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("horrible", -1.0),
    ("sad", -0.5),
    ("dangerous", -0.6),
    ("danger", -0.6),
    ("fake", -0.5),
    ("false", -0.4),
    ("wrong", -0.5),
    ("fail", -0.5),
    ("failed", -0.5),
    ("crisis", -0.5),
    ("death", -0.6),
    ("dead", -0.2),
    ("killed", -0.6),
    ("destroyed", -0.7),
    ("shocking", -0.5),
    ("scam", -0.8),
    ("fraud", -0.8),
    ("angry", -0.5),
    ("fear", -0.6),
    ("panic", -0.6),
    ("loss", -0.4),
    ("poor", -0.4),
];

/// Words that invert the polarity of the following word
const NEGATIONS: &[&str] = &["not", "no", "never", "nobody", "none", "isn't", "wasn't", "don't", "didn't"];

/// Host suffixes treated as trusted
const TRUSTED_TLDS: &[&str] = &[".gov", ".edu", ".org"];
/// Hosts of established news outlets
const REPUTABLE_NEWS: &[&str] = &["bbc.com", "reuters.com", "apnews.com", "nytimes.com", "theguardian.com"];
/// Host fragments typical of clickbait sites
const SUSPICIOUS_PATTERNS: &[&str] = &["daily-truth", "breaking-fast", "real-news-only", "truth-bomb"];

fn lexicon() -> &'static HashMap<&'static str, f64> {
    static MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    MAP.get_or_init(|| LEXICON.iter().copied().collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Polarity in [-1, 1]
    pub score: f64,
    pub label: SentimentLabel,
}

/// Average polarity of the lexicon words in `text`
///
/// A negation word directly before a lexicon word scales it by -0.5.
pub fn sentiment(text: &str) -> Sentiment {
    let lexicon = lexicon();
    let tokens: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'').to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let mut total = 0.0;
    let mut hits = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if let Some(&polarity) = lexicon.get(token.as_str()) {
            let negated = i > 0 && NEGATIONS.contains(&tokens[i - 1].as_str());
            total += if negated { polarity * -0.5 } else { polarity };
            hits += 1;
        }
    }

    let score = if hits == 0 {
        0.0
    } else {
        (total / hits as f64).clamp(-1.0, 1.0)
    };
    let label = if score > 0.1 {
        SentimentLabel::Positive
    } else if score < -0.1 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    Sentiment { score, label }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trust {
    /// Score in [0, 100], higher is more trustworthy
    pub score: u8,
    pub label: String,
}

impl Trust {
    fn new(score: u8, label: &str) -> Self {
        Self {
            score,
            label: label.to_string(),
        }
    }

    /// Trust reported for text supplied directly rather than fetched from a URL
    pub fn direct_text() -> Self {
        Self::new(100, "N/A (Direct Text)")
    }
}

/// Heuristic trust score for the domain a URL points to
pub fn domain_trust(url: &str) -> Trust {
    if !url.starts_with("http") {
        return Trust::new(50, "Unknown");
    }

    let host = match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
        Err(e) => {
            tracing::debug!("Could not parse URL {}: {}", url, e);
            return Trust::new(50, "Unknown");
        }
    };

    if TRUSTED_TLDS.iter().any(|tld| host.ends_with(tld)) {
        Trust::new(90, "High (Trusted TLD)")
    } else if REPUTABLE_NEWS.iter().any(|news| host.contains(news)) {
        Trust::new(95, "High (Reputable News Source)")
    } else if SUSPICIOUS_PATTERNS.iter().any(|p| host.contains(p)) {
        Trust::new(20, "Low (Suspicious Domain Pattern)")
    } else {
        Trust::new(60, "Moderate (Standard Web Resource)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityStats {
    pub word_count: usize,
    /// Mean characters per word, rounded to two decimals
    pub avg_word_length: f64,
}

pub fn readability(text: &str) -> ReadabilityStats {
    let words: Vec<&str> = text.split_whitespace().collect();
    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        let chars: usize = words.iter().map(|w| w.chars().count()).sum();
        (chars as f64 / words.len() as f64 * 100.0).round() / 100.0
    };

    ReadabilityStats {
        word_count: words.len(),
        avg_word_length,
    }
}
