// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Dataset loading and preprocessing for classifier training

use crate::text;
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

/// Binary news label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Fake,
    Real,
}

impl Label {
    /// Class id used by the classifier (0 = Fake, 1 = Real)
    pub fn class_id(&self) -> u8 {
        match self {
            Label::Fake => 0,
            Label::Real => 1,
        }
    }

    /// Create from a class id; anything other than 1 is Fake
    pub fn from_class(value: u8) -> Self {
        if value == 1 {
            Label::Real
        } else {
            Label::Fake
        }
    }

    /// Map a raw dataset label ("TRUE", "fake", "1", ...) to a label
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "real" => Some(Label::Real),
            "0" | "false" | "fake" => Some(Label::Fake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fake => "Fake",
            Label::Real => "Real",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single labeled news item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Unique identifier
    pub id: String,
    /// Raw text as it appeared in the source
    pub text: String,
    /// Text after training-time cleaning
    pub clean_text: String,
    /// Ground truth label
    pub label: Label,
    /// Name of the file or generator the sample came from
    pub source: String,
}

impl Sample {
    pub fn new(id: impl Into<String>, text: impl Into<String>, label: Label, source: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            clean_text: text::clean_for_training(&text),
            text,
            label,
            source: source.into(),
        }
    }
}

/// Column layout of a labeled CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvLayout {
    pub text_column: String,
    pub label_column: String,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            text_column: "text".to_string(),
            label_column: "label".to_string(),
        }
    }
}

/// Counts describing how a corpus was prepared
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreparationStats {
    pub input_rows: usize,
    pub empty_after_cleaning: usize,
    pub duplicates_removed: usize,
}

/// A cleaned, deduplicated corpus split into train and test sets
#[derive(Debug, Clone)]
pub struct Dataset {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
    pub stats: PreparationStats,
}

impl Dataset {
    /// Load labeled samples from a CSV file with a header row
    pub fn load_csv(path: &Path, layout: &CsvLayout) -> Result<Vec<Sample>> {
        let file = File::open(path).with_context(|| format!("Failed to open dataset: {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file);

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .with_context(|| format!("Column '{}' not found in {}", name, path.display()))
        };
        let text_idx = column(&layout.text_column)?;
        let label_idx = column(&layout.label_column)?;

        let source = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "csv".to_string());

        let mut samples = Vec::new();
        let mut skipped = 0usize;

        for (idx, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read record {} in {}", idx, path.display()))?;

            let text = record.get(text_idx).unwrap_or("").trim();
            let raw_label = record.get(label_idx).unwrap_or("");

            let Some(label) = Label::parse(raw_label) else {
                skipped += 1;
                continue;
            };
            if text.is_empty() {
                skipped += 1;
                continue;
            }

            samples.push(Sample::new(format!("{}_{}", source, idx), text, label, source.clone()));
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} rows with empty text or unknown labels in {}", skipped, path.display());
        }
        tracing::info!("Loaded {} samples from {}", samples.len(), path.display());

        Ok(samples)
    }

    /// Drop empty and duplicate cleaned texts, then split with a seeded,
    /// per-label shuffle so both splits keep the class balance
    pub fn prepare(samples: Vec<Sample>, test_size: f64, seed: u64) -> Self {
        let mut stats = PreparationStats {
            input_rows: samples.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let mut by_label: HashMap<Label, Vec<Sample>> = HashMap::new();

        for sample in samples {
            if sample.clean_text.is_empty() {
                stats.empty_after_cleaning += 1;
                continue;
            }
            if !seen.insert(sample.clean_text.clone()) {
                stats.duplicates_removed += 1;
                continue;
            }
            by_label.entry(sample.label).or_default().push(sample);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();

        // Fixed label order keeps the split reproducible
        for label in [Label::Fake, Label::Real] {
            let Some(mut group) = by_label.remove(&label) else {
                continue;
            };
            group.shuffle(&mut rng);
            let n_test = ((group.len() as f64) * test_size).round() as usize;
            let rest = group.split_off(n_test.min(group.len()));
            test.extend(group);
            train.extend(rest);
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Self { train, test, stats }
    }

    /// Generate a labeled synthetic corpus for development and tests
    pub fn load_synthetic(size: usize, seed: u64) -> Vec<Sample> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let fake_phrases = [
            "shocking secret they do not want you to know about",
            "forward this message before it gets deleted",
            "viral video exposes hidden conspiracy behind",
            "unbelievable miracle remedy cures everything overnight for",
            "leaked truth the media is hiding about",
        ];
        let real_phrases = [
            "officials confirmed the schedule for",
            "the district administration announced revised timings for",
            "according to the annual report published on",
            "the department issued a statement regarding",
            "data released by the ministry shows steady figures for",
        ];
        let subjects = [
            "the metro line",
            "state elections",
            "public hospitals",
            "school admissions",
            "crop insurance",
            "water supply",
            "the new highway",
            "university exams",
            "bank holidays",
            "bus services",
        ];
        let places = ["delhi", "mumbai", "hyderabad", "chennai", "kolkata", "pune", "jaipur", "lucknow"];

        (0..size)
            .map(|i| {
                let is_fake = rng.gen_bool(0.5);
                let phrases = if is_fake { &fake_phrases } else { &real_phrases };
                let phrase = phrases[rng.gen_range(0..phrases.len())];
                let subject = subjects[rng.gen_range(0..subjects.len())];
                let place = places[rng.gen_range(0..places.len())];
                let label = if is_fake { Label::Fake } else { Label::Real };

                Sample::new(format!("synthetic_{}", i), format!("{} {} in {}", phrase, subject, place), label, "synthetic")
            })
            .collect()
    }

    /// Get label distribution for a split
    pub fn label_distribution(samples: &[Sample]) -> HashMap<Label, usize> {
        let mut dist = HashMap::new();
        for sample in samples {
            *dist.entry(sample.label).or_insert(0) += 1;
        }
        dist
    }
}
