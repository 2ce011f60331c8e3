// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Caller-facing analysis service
//!
//! Wraps a shared predictor with input validation, analytics enrichment,
//! localized display text and capped batch processing.

use crate::analytics::{self, ReadabilityStats, Sentiment, Trust};
use crate::predictor::FakeNewsPredictor;
use crate::verdict::{Verdict, VerdictRecord};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Minimum trimmed length, in characters, of a text worth analyzing
pub const MIN_TEXT_CHARS: usize = 20;
/// Maximum number of items accepted in one batch
pub const MAX_BATCH_ITEMS: usize = 10;
/// Characters kept in a batch item preview
const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Text too short to analyze.")]
    TooShort,
    #[error("No items provided for batch analysis.")]
    EmptyBatch,
    #[error("Batch size too large. Limit is {limit} items.")]
    BatchTooLarge { limit: usize },
    /// The cause is logged; callers only see the generic message
    #[error("Failed to analyze the provided input.")]
    Failed { cause: String },
}

/// A verdict plus the analytics reported alongside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub verdict: VerdictRecord,
    /// Input text in the requested display language
    pub display_text: String,
    pub sentiment: Sentiment,
    pub trust: Trust,
    pub stats: ReadabilityStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "URL")]
    Url,
    Text,
}

impl ItemKind {
    /// Items starting with `http` are URLs; everything else is text
    pub fn of(item: &str) -> Self {
        if item.starts_with("http") {
            ItemKind::Url
        } else {
            ItemKind::Text
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Analyzed { verdict: VerdictRecord },
    /// URL items are scored for domain trust only
    Skipped { trust: Trust },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    /// First characters of the item
    pub item: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Local wall-clock time the item finished, HH:MM:SS
    pub timestamp: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unix seconds when the batch started
    pub batch_id: i64,
    pub total_items: usize,
    pub results: Vec<BatchItemResult>,
    /// Wall time in seconds, two decimals
    pub execution_time: f64,
}

fn preview(item: &str) -> String {
    if item.chars().count() > PREVIEW_CHARS {
        let head: String = item.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        item.to_string()
    }
}

pub struct AnalysisService {
    predictor: Arc<FakeNewsPredictor>,
}

impl AnalysisService {
    pub fn new(predictor: Arc<FakeNewsPredictor>) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &FakeNewsPredictor {
        &self.predictor
    }

    fn validate(text: &str) -> Result<(), AnalysisError> {
        if text.trim().chars().count() < MIN_TEXT_CHARS {
            return Err(AnalysisError::TooShort);
        }
        Ok(())
    }

    fn predict(&self, text: &str) -> Result<Verdict, AnalysisError> {
        self.predictor.predict(text).map_err(|e| {
            tracing::error!("Prediction failed: {:#}", e);
            AnalysisError::Failed {
                cause: format!("{:#}", e),
            }
        })
    }

    /// Analyze one text and render it in `target_lang`
    pub fn analyze(&self, text: &str, target_lang: &str) -> Result<AnalysisReport, AnalysisError> {
        Self::validate(text)?;
        let verdict = self.predict(text)?;

        let display_text = self
            .predictor
            .translator()
            .to_target(text, target_lang)
            .text_or(text)
            .to_string();

        Ok(AnalysisReport {
            verdict: verdict.record(),
            display_text,
            sentiment: analytics::sentiment(text),
            trust: Trust::direct_text(),
            stats: analytics::readability(text),
        })
    }

    /// Analyze up to [`MAX_BATCH_ITEMS`] items independently
    pub fn analyze_batch<S: AsRef<str>>(&self, items: &[S]) -> Result<BatchReport, AnalysisError> {
        if items.is_empty() {
            return Err(AnalysisError::EmptyBatch);
        }
        if items.len() > MAX_BATCH_ITEMS {
            return Err(AnalysisError::BatchTooLarge {
                limit: MAX_BATCH_ITEMS,
            });
        }

        let start = Instant::now();
        let batch_id = Utc::now().timestamp();
        tracing::info!("Processing batch {} with {} items", batch_id, items.len());

        let results = items
            .iter()
            .map(|item| {
                let item = item.as_ref();
                let kind = ItemKind::of(item);
                let outcome = match kind {
                    ItemKind::Url => BatchOutcome::Skipped {
                        trust: analytics::domain_trust(item),
                    },
                    ItemKind::Text => match Self::validate(item).and_then(|_| self.predict(item)) {
                        Ok(verdict) => BatchOutcome::Analyzed {
                            verdict: verdict.record(),
                        },
                        Err(e) => BatchOutcome::Error { message: e.to_string() },
                    },
                };

                BatchItemResult {
                    item: preview(item),
                    kind,
                    timestamp: Local::now().format("%H:%M:%S").to_string(),
                    outcome,
                }
            })
            .collect();

        let execution_time = (start.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        Ok(BatchReport {
            batch_id,
            total_items: items.len(),
            results,
            execution_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{Score, TextClassifier};
    use crate::datasets::Label;
    use crate::translate::{TranslationOutcome, Translator};
    use crate::verdict::Mode;
    use anyhow::Result;

    struct FixedClassifier(Label);

    impl TextClassifier for FixedClassifier {
        fn score(&self, text: &str) -> Result<Score> {
            if text.contains("explode") {
                anyhow::bail!("simulated classifier failure");
            }
            Ok(Score {
                label: self.0,
                confidence: 0.9,
            })
        }

        fn stage_labels(&self) -> &'static [&'static str] {
            &["TF-IDF vectorization applied", "Logistic Regression model applied"]
        }
    }

    struct UppercaseTranslator;

    impl Translator for UppercaseTranslator {
        fn to_english(&self, _text: &str, _source_lang: &str) -> TranslationOutcome {
            TranslationOutcome::Unchanged
        }

        fn to_target(&self, text: &str, target_lang: &str) -> TranslationOutcome {
            if target_lang == "en" {
                TranslationOutcome::Unchanged
            } else {
                TranslationOutcome::Translated(text.to_uppercase())
            }
        }

        fn name(&self) -> &str {
            "uppercase"
        }
    }

    fn service() -> AnalysisService {
        let predictor = FakeNewsPredictor::builder(Box::new(FixedClassifier(Label::Real)))
            .translator(Box::new(UppercaseTranslator))
            .build();
        AnalysisService::new(Arc::new(predictor))
    }

    const NEWS: &str = "The state government announced new school timings for the monsoon";

    #[test]
    fn test_short_text_rejected() {
        let err = service().analyze("too short", "en").unwrap_err();
        assert_eq!(err, AnalysisError::TooShort);
        assert_eq!(err.to_string(), "Text too short to analyze.");
    }

    #[test]
    fn test_analyze_attaches_analytics() {
        let report = service().analyze(NEWS, "en").unwrap();
        assert_eq!(report.verdict.prediction, Label::Real);
        assert_eq!(report.verdict.mode, Mode::MlBased);
        assert_eq!(report.display_text, NEWS);
        assert_eq!(report.trust, Trust::direct_text());
        assert_eq!(report.trust.score, 100);
        assert_eq!(report.stats.word_count, 10);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["prediction"], "Real");
        assert_eq!(json["mode"], "ML-based");
        assert!(json["sentiment"]["label"].is_string());
        assert_eq!(json["trust"]["label"], "N/A (Direct Text)");
    }

    #[test]
    fn test_padding_does_not_count_toward_length() {
        let padded = format!("{:^40}", "too short");
        assert!(padded.chars().count() >= MIN_TEXT_CHARS);
        assert_eq!(service().analyze(&padded, "en").unwrap_err(), AnalysisError::TooShort);
        assert!(service().analyze(&format!("   {}   ", NEWS), "en").is_ok());
    }

    #[test]
    fn test_display_text_uses_target_language() {
        let report = service().analyze(NEWS, "hi").unwrap();
        assert_eq!(report.display_text, NEWS.to_uppercase());
    }

    #[test]
    fn test_classifier_failure_is_generic() {
        let err = service()
            .analyze("This bridge will explode tomorrow say officials", "en")
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to analyze the provided input.");
        match err {
            AnalysisError::Failed { cause } => assert!(cause.contains("simulated classifier failure")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_batch_limits() {
        let empty: Vec<String> = vec![];
        assert_eq!(service().analyze_batch(&empty).unwrap_err(), AnalysisError::EmptyBatch);

        let items = vec![NEWS; MAX_BATCH_ITEMS + 1];
        let err = service().analyze_batch(&items).unwrap_err();
        assert_eq!(err.to_string(), "Batch size too large. Limit is 10 items.");

        let items = vec![NEWS; MAX_BATCH_ITEMS];
        assert_eq!(service().analyze_batch(&items).unwrap().total_items, MAX_BATCH_ITEMS);
    }

    #[test]
    fn test_batch_items_are_independent() {
        let items = [
            NEWS,
            "https://www.reuters.com/world/some-story",
            "This bridge will explode tomorrow say officials",
            "tiny",
            "I am the president and I order a holiday today",
        ];
        let report = service().analyze_batch(&items).unwrap();
        assert_eq!(report.results.len(), 5);
        assert!(report.execution_time >= 0.0);

        assert!(matches!(report.results[0].outcome, BatchOutcome::Analyzed { .. }));
        assert_eq!(report.results[1].kind, ItemKind::Url);
        match &report.results[1].outcome {
            BatchOutcome::Skipped { trust } => assert_eq!(trust.score, 95),
            other => panic!("unexpected outcome {:?}", other),
        }
        match &report.results[2].outcome {
            BatchOutcome::Error { message } => assert_eq!(message, "Failed to analyze the provided input."),
            other => panic!("unexpected outcome {:?}", other),
        }
        match &report.results[3].outcome {
            BatchOutcome::Error { message } => assert_eq!(message, "Text too short to analyze."),
            other => panic!("unexpected outcome {:?}", other),
        }
        match &report.results[4].outcome {
            BatchOutcome::Analyzed { verdict } => assert_eq!(verdict.mode, Mode::RuleBased),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_preview_truncates_long_items() {
        let long = "a".repeat(60);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_batch_report_serializes_flat_items() {
        let report = service().analyze_batch(&[NEWS]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["type"], "Text");
        assert_eq!(json["results"][0]["status"], "analyzed");
        assert_eq!(json["results"][0]["verdict"]["prediction"], "Real");
        assert_eq!(json["results"][0]["timestamp"].as_str().unwrap().len(), 8);
    }
}
