// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! TF-IDF vectorizer
//!
//! Word n-gram TF-IDF with a capped vocabulary, smoothed IDF and L2-normalized
//! rows. The fitted state is persisted alongside the model; inference must use
//! the exact configuration the model was trained with.

use crate::text;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Vectorizer hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Maximum vocabulary size, ranked by corpus term frequency
    pub max_features: usize,
    /// Smallest n-gram length
    pub ngram_min: usize,
    /// Largest n-gram length
    pub ngram_max: usize,
    /// Remove English stop words before building n-grams
    pub remove_stop_words: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 2,
            remove_stop_words: true,
        }
    }
}

/// Sparse row vector with strictly increasing indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(&self.values)
            .map(|(&i, &v)| dense.get(i).copied().unwrap_or(0.0) * v)
            .sum()
    }

    /// Largest referenced index, if any
    pub fn max_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    /// Term -> column index; columns follow lexical term order
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per column
    idf: Vec<f64>,
    /// Documents seen during fitting
    n_documents: usize,
}

impl TfidfVectorizer {
    pub fn new(config: TfidfConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Width of the produced vectors
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Column index of a term, if it is in the vocabulary
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Split text into lower-cased tokens of two or more word characters
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !text::is_word_char(c))
            .filter(|s| s.chars().count() >= 2)
            .filter(|s| !(self.config.remove_stop_words && text::is_stop_word(s)))
            .map(|s| s.to_string())
            .collect()
    }

    /// Produce the n-gram terms of a document
    fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        let mut terms = Vec::new();

        for n in self.config.ngram_min.max(1)..=self.config.ngram_max {
            if n > tokens.len() {
                break;
            }
            if n == 1 {
                terms.extend(tokens.iter().cloned());
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }

        terms
    }

    /// Fit vocabulary and IDF weights on a corpus
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        anyhow::ensure!(!documents.is_empty(), "cannot fit a vectorizer on an empty corpus");
        anyhow::ensure!(
            self.config.ngram_min <= self.config.ngram_max && self.config.ngram_max > 0,
            "invalid n-gram range ({}, {})",
            self.config.ngram_min,
            self.config.ngram_max
        );

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.analyze(doc.as_ref());
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_counts.entry(term).or_insert(0) += 1;
            }
        }

        anyhow::ensure!(
            !term_counts.is_empty(),
            "empty vocabulary; documents contain only stop words or short tokens"
        );

        // Most frequent terms first, ties broken lexically for reproducibility
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if self.config.max_features > 0 {
            ranked.truncate(self.config.max_features);
        }

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();

        let n = documents.len() as f64;
        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = kept.into_iter().enumerate().map(|(idx, term)| (term, idx)).collect();
        self.n_documents = documents.len();

        tracing::debug!(
            "Fitted TF-IDF vocabulary: {} features from {} documents",
            self.vocabulary.len(),
            self.n_documents
        );

        Ok(())
    }

    /// Vectorize one document
    pub fn transform(&self, text: &str) -> Result<SparseVector> {
        anyhow::ensure!(self.is_fitted(), "vectorizer has not been fitted");

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector {
            indices: Vec::with_capacity(counts.len()),
            values: Vec::with_capacity(counts.len()),
        };
        for (idx, count) in counts {
            vector.indices.push(idx);
            vector.values.push(count * self.idf[idx]);
        }

        let norm = vector.values.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.values.iter_mut().for_each(|v| *v /= norm);
        }

        Ok(vector)
    }

    /// Fit on a corpus and vectorize it
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    /// Check internal consistency of a deserialized vectorizer
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.is_fitted(), "vectorizer has an empty vocabulary");
        anyhow::ensure!(
            self.idf.len() == self.vocabulary.len(),
            "vectorizer has {} IDF weights for {} terms",
            self.idf.len(),
            self.vocabulary.len()
        );
        if let Some((term, idx)) = self.vocabulary.iter().find(|(_, &idx)| idx >= self.idf.len()) {
            anyhow::bail!("term '{}' maps to out-of-range column {}", term, idx);
        }
        Ok(())
    }
}
