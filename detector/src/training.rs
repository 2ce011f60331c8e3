// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Reproducible offline training pipeline
//!
//! Orchestrates:
//! - Corpus loading (CSV files or the synthetic generator)
//! - Cleaning, deduplication and the seeded stratified split
//! - TF-IDF fitting and logistic regression training
//! - Artifact persistence with the compatibility manifest
//! - Held-out evaluation and report generation

use crate::artifacts::{ClassifierArtifacts, ModelManifest};
use crate::datasets::{CsvLayout, Dataset, Label, PreparationStats, Sample};
use crate::metrics::EvaluationMetrics;
use crate::model::{LogisticRegression, LogisticRegressionConfig};
use crate::vectorizer::{TfidfConfig, TfidfVectorizer};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the JSON report written next to the artifacts
pub const REPORT_FILE: &str = "training_report.json";
/// Name of the markdown report written next to the artifacts
pub const REPORT_MARKDOWN_FILE: &str = "training_report.md";

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Random seed for the split
    pub seed: u64,
    /// Labeled CSV files; empty means the synthetic corpus
    pub data_paths: Vec<PathBuf>,
    pub layout: CsvLayout,
    /// Size of the synthetic corpus when no files are given
    pub synthetic_size: usize,
    /// Fraction of each label held out for evaluation
    pub test_size: f64,
    pub tfidf: TfidfConfig,
    pub model: LogisticRegressionConfig,
    /// Directory the artifacts and reports are written to
    pub output_dir: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            data_paths: vec![],
            layout: CsvLayout::default(),
            synthetic_size: 1000,
            test_size: 0.2,
            tfidf: TfidfConfig::default(),
            model: LogisticRegressionConfig::default(),
            output_dir: PathBuf::from("artifacts/models"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub sources: Vec<String>,
    pub preparation: PreparationStats,
    pub train_samples: usize,
    pub test_samples: usize,
    pub label_distribution: BTreeMap<String, usize>,
}

/// Everything recorded about one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub config: TrainingConfig,
    pub dataset: DatasetSummary,
    pub n_features: usize,
    pub iterations: usize,
    pub final_loss: f64,
    /// Held-out metrics; absent when the test split is empty
    pub metrics: Option<EvaluationMetrics>,
    pub manifest: ModelManifest,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn load_samples(&self) -> Result<Vec<Sample>> {
        if self.config.data_paths.is_empty() {
            tracing::info!(
                "No data files given, generating {} synthetic samples with seed {}",
                self.config.synthetic_size,
                self.config.seed
            );
            return Ok(Dataset::load_synthetic(self.config.synthetic_size, self.config.seed));
        }

        let mut samples = Vec::new();
        for path in &self.config.data_paths {
            samples.extend(Dataset::load_csv(path, &self.config.layout)?);
        }
        Ok(samples)
    }

    /// Train, persist and evaluate
    ///
    /// `on_iteration` receives the optimizer iteration and loss.
    pub fn run(&self, mut on_iteration: impl FnMut(usize, f64)) -> Result<TrainingReport> {
        anyhow::ensure!(
            (0.0..1.0).contains(&self.config.test_size),
            "test size must be in [0, 1), got {}",
            self.config.test_size
        );

        let samples = self.load_samples()?;
        let mut sources: Vec<String> = samples.iter().map(|s| s.source.clone()).collect();
        sources.sort();
        sources.dedup();

        let dataset = Dataset::prepare(samples, self.config.test_size, self.config.seed);
        tracing::info!(
            "Prepared corpus: {} rows in, {} empty, {} duplicates, train={}, test={}",
            dataset.stats.input_rows,
            dataset.stats.empty_after_cleaning,
            dataset.stats.duplicates_removed,
            dataset.train.len(),
            dataset.test.len()
        );
        anyhow::ensure!(!dataset.train.is_empty(), "no training samples left after cleaning");

        let train_texts: Vec<&str> = dataset.train.iter().map(|s| s.clean_text.as_str()).collect();
        let targets: Vec<u8> = dataset.train.iter().map(|s| s.label.class_id()).collect();

        let mut vectorizer = TfidfVectorizer::new(self.config.tfidf.clone());
        let rows = vectorizer
            .fit_transform(&train_texts)
            .context("Failed to fit TF-IDF vectorizer")?;
        tracing::info!("TF-IDF vocabulary: {} features", vectorizer.n_features());

        let mut final_loss = f64::NAN;
        let model = LogisticRegression::fit(&rows, &targets, vectorizer.n_features(), &self.config.model, |iter, loss| {
            final_loss = loss;
            on_iteration(iter, loss);
        })
        .context("Failed to train logistic regression")?;
        tracing::info!("Logistic regression trained in {} iterations (loss {:.6})", model.n_iter(), final_loss);

        let manifest = ClassifierArtifacts::save(&self.config.output_dir, &vectorizer, &model, dataset.train.len())?;

        // Evaluate the persisted pair, not the in-memory one
        let artifacts = ClassifierArtifacts::load_dir(&self.config.output_dir)?;
        let metrics = if dataset.test.is_empty() {
            tracing::warn!("Test split is empty, skipping evaluation");
            None
        } else {
            let metrics = evaluate(&artifacts, &dataset.test)?;
            tracing::info!(
                "Held-out accuracy: {:.4}, F1: {:.4}, AUC-ROC: {:.4}",
                metrics.accuracy,
                metrics.f1_score,
                metrics.auc_roc
            );
            Some(metrics)
        };

        let mut label_distribution = BTreeMap::new();
        for split in [&dataset.train, &dataset.test] {
            for (label, count) in Dataset::label_distribution(split) {
                *label_distribution.entry(label.to_string()).or_insert(0) += count;
            }
        }

        Ok(TrainingReport {
            config: self.config.clone(),
            dataset: DatasetSummary {
                sources,
                preparation: dataset.stats.clone(),
                train_samples: dataset.train.len(),
                test_samples: dataset.test.len(),
                label_distribution,
            },
            n_features: vectorizer.n_features(),
            iterations: model.n_iter(),
            final_loss,
            metrics,
            manifest,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Write the JSON and markdown reports into `dir`
    pub fn save_report(report: &TrainingReport, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let json_path = dir.join(REPORT_FILE);
        std::fs::write(&json_path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;

        let md_path = dir.join(REPORT_MARKDOWN_FILE);
        std::fs::write(&md_path, Self::generate_report(report))
            .with_context(|| format!("Failed to write {}", md_path.display()))?;

        tracing::info!("Reports saved to {}", dir.display());
        Ok(())
    }

    /// Render a markdown summary of a run
    pub fn generate_report(report: &TrainingReport) -> String {
        let mut out = String::new();

        out.push_str("# Fake News Classifier Training Report\n\n");
        out.push_str(&format!("**Generated:** {}\n\n", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
        out.push_str(&format!("**Version:** {}\n\n", report.version));

        out.push_str("## Dataset\n\n");
        out.push_str(&format!("- **Sources:** {}\n", report.dataset.sources.join(", ")));
        let prep = &report.dataset.preparation;
        out.push_str(&format!(
            "- **Rows:** {} read, {} empty after cleaning, {} duplicates removed\n",
            prep.input_rows, prep.empty_after_cleaning, prep.duplicates_removed
        ));
        out.push_str(&format!(
            "- **Split Sizes:** Train={}, Test={} (seed {})\n",
            report.dataset.train_samples, report.dataset.test_samples, report.config.seed
        ));
        for (label, count) in &report.dataset.label_distribution {
            out.push_str(&format!("- **{}:** {}\n", label, count));
        }

        out.push_str("\n## Model\n\n");
        out.push_str(&format!("- Features: {}\n", report.n_features));
        out.push_str(&format!(
            "- N-gram range: ({}, {})\n",
            report.config.tfidf.ngram_min, report.config.tfidf.ngram_max
        ));
        out.push_str(&format!("- C: {}\n", report.config.model.c));
        out.push_str(&format!("- Iterations: {}\n", report.iterations));
        out.push_str(&format!("- Final loss: {:.6}\n", report.final_loss));
        out.push_str(&format!("- Vectorizer digest: `{}`\n\n", report.manifest.vectorizer_sha256));

        out.push_str("## Evaluation\n\n");
        match &report.metrics {
            Some(metrics) => out.push_str(&format!("```\n{}```\n", metrics.format())),
            None => out.push_str("No held-out samples; evaluation skipped.\n"),
        }

        out
    }
}

/// Score held-out samples with a loaded classifier
pub fn evaluate(artifacts: &ClassifierArtifacts, samples: &[Sample]) -> Result<EvaluationMetrics> {
    let mut predictions = Vec::with_capacity(samples.len());
    let mut fake_scores = Vec::with_capacity(samples.len());

    for sample in samples {
        let [p_fake, p_real] = artifacts.probabilities(&sample.clean_text)?;
        predictions.push(if p_real > p_fake { Label::Real } else { Label::Fake });
        fake_scores.push(p_fake);
    }

    let truth: Vec<Label> = samples.iter().map(|s| s.label).collect();
    EvaluationMetrics::compute(&predictions, &fake_scores, &truth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fakenews-training-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_training_on_synthetic_corpus() {
        let dir = scratch_dir("synthetic");
        let config = TrainingConfig {
            output_dir: dir.clone(),
            ..Default::default()
        };

        let mut iterations_seen = 0;
        let report = Trainer::new(config).run(|_, _| iterations_seen += 1).unwrap();

        assert_eq!(iterations_seen, report.iterations);
        assert!(report.final_loss < std::f64::consts::LN_2);
        assert_eq!(report.manifest.n_features, report.n_features);
        assert_eq!(report.dataset.sources, vec!["synthetic"]);

        let metrics = report.metrics.as_ref().unwrap();
        assert!(metrics.accuracy > 0.9, "accuracy {}", metrics.accuracy);

        Trainer::save_report(&report, &dir).unwrap();
        assert!(dir.join(REPORT_FILE).exists());
        let markdown = std::fs::read_to_string(dir.join(REPORT_MARKDOWN_FILE)).unwrap();
        assert!(markdown.contains("Training Report"));
        assert!(markdown.contains("AUC-ROC"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_training_from_csv() {
        let dir = scratch_dir("csv");
        std::fs::create_dir_all(&dir).unwrap();
        let csv_path = dir.join("news.csv");

        let wards = [
            "alder", "birch", "cedar", "elm", "fir", "hazel", "juniper", "larch", "maple", "oak",
            "pine", "rowan", "spruce", "teak", "walnut", "willow", "yew", "ash", "beech", "cherry",
        ];
        let mut rows = String::from("Text,Label\n");
        for ward in wards {
            rows.push_str(&format!("\"Officials confirmed bus schedule for {} ward\",REAL\n", ward));
            rows.push_str(&format!("\"Shocking secret cure hidden near {} lane\",FAKE\n", ward));
        }
        std::fs::write(&csv_path, rows).unwrap();

        let config = TrainingConfig {
            data_paths: vec![csv_path],
            test_size: 0.25,
            output_dir: dir.join("models"),
            ..Default::default()
        };
        let report = Trainer::new(config).run(|_, _| {}).unwrap();

        assert_eq!(report.dataset.sources, vec!["news"]);
        assert_eq!(report.dataset.train_samples + report.dataset.test_samples, 40);
        assert_eq!(report.dataset.test_samples, 10);
        assert!(ClassifierArtifacts::load_dir(&dir.join("models")).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_test_size() {
        let config = TrainingConfig {
            test_size: 1.5,
            output_dir: scratch_dir("invalid"),
            ..Default::default()
        };
        assert!(Trainer::new(config).run(|_, _| {}).is_err());
    }
}
