// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Predictor configuration

use crate::artifacts::{MODEL_FILE, VECTORIZER_FILE};
use crate::predictor::DEFAULT_SHORT_MESSAGE_WORDS;
use crate::rules::RulePatternSet;
use crate::translate::{HttpTranslator, NoopTranslator, Translator};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Translation backend selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranslatorConfig {
    /// Never translate
    None,
    /// LibreTranslate-compatible HTTP endpoint
    Http {
        endpoint: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig::None
    }
}

/// Configuration for building a predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Directory holding the trained artifacts
    pub artifacts_dir: PathBuf,
    /// Vectorizer file name, relative to `artifacts_dir`
    pub vectorizer_file: String,
    /// Model file name, relative to `artifacts_dir`
    pub model_file: String,
    /// Optional JSON file overriding the built-in rule patterns
    pub patterns_path: Option<PathBuf>,
    /// Word limit for the short-message check and context expansion
    pub short_message_words: usize,
    pub translator: TranslatorConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts/models"),
            vectorizer_file: VECTORIZER_FILE.to_string(),
            model_file: MODEL_FILE.to_string(),
            patterns_path: None,
            short_message_words: DEFAULT_SHORT_MESSAGE_WORDS,
            translator: TranslatorConfig::default(),
        }
    }
}

impl PredictorConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        anyhow::ensure!(config.short_message_words > 0, "short_message_words must be positive");
        Ok(config)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.vectorizer_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.model_file)
    }

    /// Rule patterns from `patterns_path`, or the built-in tables
    pub fn rule_patterns(&self) -> Result<RulePatternSet> {
        match &self.patterns_path {
            Some(path) => RulePatternSet::from_json_file(path),
            None => Ok(RulePatternSet::default()),
        }
    }

    pub fn build_translator(&self) -> Result<Box<dyn Translator>> {
        Ok(match &self.translator {
            TranslatorConfig::None => Box::new(NoopTranslator),
            TranslatorConfig::Http {
                endpoint,
                api_key,
                timeout_secs,
            } => Box::new(HttpTranslator::new(
                endpoint,
                api_key.clone(),
                Duration::from_secs(*timeout_secs),
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = PredictorConfig::default();
        assert_eq!(
            config.vectorizer_path(),
            PathBuf::from("artifacts/models/tfidf_vectorizer.json")
        );
        assert_eq!(config.model_path(), PathBuf::from("artifacts/models/logistic_model.json"));
        assert_eq!(config.short_message_words, 5);
        assert_eq!(config.build_translator().unwrap().name(), "none");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PredictorConfig = serde_json::from_str(
            r#"{"artifacts_dir": "models", "translator": {"kind": "http", "endpoint": "http://localhost:5000"}}"#,
        )
        .unwrap();

        assert_eq!(config.artifacts_dir, PathBuf::from("models"));
        assert_eq!(config.model_file, MODEL_FILE);
        assert_eq!(
            config.translator,
            TranslatorConfig::Http {
                endpoint: "http://localhost:5000".to_string(),
                api_key: None,
                timeout_secs: 10,
            }
        );
    }

    #[test]
    fn test_load_rejects_zero_word_limit() {
        let path = std::env::temp_dir().join(format!("fakenews-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"short_message_words": 0}"#).unwrap();
        assert!(PredictorConfig::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_pattern_file_fails() {
        let config = PredictorConfig {
            patterns_path: Some(PathBuf::from("/nonexistent/patterns.json")),
            ..Default::default()
        };
        assert!(config.rule_patterns().is_err());
    }
}
