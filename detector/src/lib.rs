// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Rule-guarded fake news detector
//!
//! This crate provides:
//! - Override rules and a short-message plausibility check
//! - Language detection, translation and context expansion collaborators
//! - TF-IDF + logistic regression classification with verified artifacts
//! - A layered decision pipeline producing explained verdicts
//! - A caller layer with validation, analytics and capped batches
//! - A reproducible offline trainer with held-out evaluation

pub mod analytics;
pub mod artifacts;
pub mod config;
pub mod datasets;
pub mod expand;
pub mod language;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod rules;
pub mod service;
pub mod text;
pub mod training;
pub mod translate;
pub mod vectorizer;
pub mod verdict;

pub use artifacts::{ClassifierArtifacts, ModelManifest, Score, TextClassifier};
pub use config::{PredictorConfig, TranslatorConfig};
pub use datasets::{Dataset, Label, Sample};
pub use language::{LanguageDetector, ScriptDetector};
pub use metrics::{ConfusionMatrix, EvaluationMetrics};
pub use predictor::{FakeNewsPredictor, PredictorBuilder};
pub use rules::{KeywordMatches, RuleEngine, RuleMatch, RulePatternSet};
pub use service::{AnalysisError, AnalysisReport, AnalysisService, BatchReport};
pub use training::{Trainer, TrainingConfig, TrainingReport};
pub use translate::{HttpTranslator, NoopTranslator, TranslationOutcome, Translator};
pub use verdict::{Decision, Mode, RiskLevel, Verdict, VerdictRecord};
