// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Trained classifier artifacts
//!
//! A trained classifier is two JSON files: the fitted vectorizer and the
//! logistic model. The model file embeds a manifest recording the vectorizer
//! width and the SHA-256 of the vectorizer file it was trained against, so a
//! mismatched pair is rejected at load time instead of scoring garbage.

use crate::datasets::Label;
use crate::model::LogisticRegression;
use crate::vectorizer::TfidfVectorizer;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Default vectorizer file name inside an artifact directory
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
/// Default model file name inside an artifact directory
pub const MODEL_FILE: &str = "logistic_model.json";

/// Stage labels reported by the TF-IDF classifier
const TFIDF_STAGES: &[&str] = &["TF-IDF vectorization applied", "Logistic Regression model applied"];

/// Compatibility record written next to the model weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Vectorizer width the model was trained on
    pub n_features: usize,
    /// Hex SHA-256 of the vectorizer file bytes
    pub vectorizer_sha256: String,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    /// Crate version that produced the artifacts
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelDocument {
    manifest: ModelManifest,
    model: LogisticRegression,
}

/// Classifier output: the argmax class and its probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub label: Label,
    /// Probability of `label`, rounded to four decimals
    pub confidence: f64,
}

/// A trained text classifier
pub trait TextClassifier: Send + Sync {
    /// Score one (already translated and expanded) text
    fn score(&self, text: &str) -> Result<Score>;

    /// Explanation lines describing the stages `score` runs
    fn stage_labels(&self) -> &'static [&'static str];
}

/// Hex-encoded SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Round to four decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Loaded vectorizer and model, verified to belong together
#[derive(Debug, Clone)]
pub struct ClassifierArtifacts {
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
    manifest: ModelManifest,
}

impl ClassifierArtifacts {
    /// Load and cross-check a vectorizer/model pair
    pub fn load(vectorizer_path: &Path, model_path: &Path) -> Result<Self> {
        let vectorizer_bytes = fs::read(vectorizer_path)
            .with_context(|| format!("Failed to read vectorizer: {}", vectorizer_path.display()))?;
        let vectorizer: TfidfVectorizer = serde_json::from_slice(&vectorizer_bytes)
            .with_context(|| format!("Failed to parse vectorizer: {}", vectorizer_path.display()))?;
        vectorizer
            .validate()
            .with_context(|| format!("Invalid vectorizer: {}", vectorizer_path.display()))?;

        let model_json = fs::read_to_string(model_path)
            .with_context(|| format!("Failed to read model: {}", model_path.display()))?;
        let document: ModelDocument = serde_json::from_str(&model_json)
            .with_context(|| format!("Failed to parse model: {}", model_path.display()))?;

        let artifacts = Self {
            vectorizer,
            model: document.model,
            manifest: document.manifest,
        };
        artifacts.check_compatibility(&sha256_hex(&vectorizer_bytes))?;

        tracing::info!(
            "Loaded classifier: {} features, trained {} on {} samples",
            artifacts.manifest.n_features,
            artifacts.manifest.trained_at.format("%Y-%m-%d"),
            artifacts.manifest.training_samples
        );

        Ok(artifacts)
    }

    /// Load the default file names from a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(VECTORIZER_FILE), &dir.join(MODEL_FILE))
    }

    fn check_compatibility(&self, vectorizer_sha256: &str) -> Result<()> {
        let manifest = &self.manifest;
        anyhow::ensure!(
            manifest.n_features == self.vectorizer.n_features(),
            "Incompatible artifacts: model expects {} features, vectorizer produces {}",
            manifest.n_features,
            self.vectorizer.n_features()
        );
        anyhow::ensure!(
            manifest.n_features == self.model.n_features(),
            "Corrupt model: manifest declares {} features, weights have {}",
            manifest.n_features,
            self.model.n_features()
        );
        anyhow::ensure!(
            manifest.vectorizer_sha256 == vectorizer_sha256,
            "Incompatible artifacts: model was trained against vectorizer {}, found {}",
            manifest.vectorizer_sha256,
            vectorizer_sha256
        );
        Ok(())
    }

    /// Write a fitted pair into `dir` and return the manifest recorded
    pub fn save(
        dir: &Path,
        vectorizer: &TfidfVectorizer,
        model: &LogisticRegression,
        training_samples: usize,
    ) -> Result<ModelManifest> {
        anyhow::ensure!(
            vectorizer.n_features() == model.n_features(),
            "vectorizer width {} does not match model width {}",
            vectorizer.n_features(),
            model.n_features()
        );
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let vectorizer_json = serde_json::to_vec(vectorizer)?;
        let vectorizer_path = dir.join(VECTORIZER_FILE);
        fs::write(&vectorizer_path, &vectorizer_json)
            .with_context(|| format!("Failed to write {}", vectorizer_path.display()))?;

        let manifest = ModelManifest {
            n_features: vectorizer.n_features(),
            vectorizer_sha256: sha256_hex(&vectorizer_json),
            trained_at: Utc::now(),
            training_samples,
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let document = ModelDocument {
            manifest: manifest.clone(),
            model: model.clone(),
        };
        let model_path = dir.join(MODEL_FILE);
        fs::write(&model_path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write {}", model_path.display()))?;

        tracing::info!("Saved artifacts to {}", dir.display());
        Ok(manifest)
    }

    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Class probabilities `[P(Fake), P(Real)]` for raw text
    pub fn probabilities(&self, text: &str) -> Result<[f64; 2]> {
        let row = self.vectorizer.transform(text)?;
        self.model.predict_proba(&row)
    }
}

impl TextClassifier for ClassifierArtifacts {
    fn score(&self, text: &str) -> Result<Score> {
        let [p_fake, p_real] = self.probabilities(text)?;
        let (label, p) = if p_real > p_fake {
            (Label::Real, p_real)
        } else {
            (Label::Fake, p_fake)
        };
        Ok(Score {
            label,
            confidence: round4(p),
        })
    }

    fn stage_labels(&self) -> &'static [&'static str] {
        TFIDF_STAGES
    }
}
