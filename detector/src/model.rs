// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Binary logistic regression over sparse TF-IDF rows
//!
//! Class 1 is Real, class 0 is Fake. Training minimizes the mean log loss
//! plus an L2 penalty scaled by `1 / (C * n)` with full-batch gradient
//! descent; the intercept is not penalized.

use crate::vectorizer::SparseVector;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Training hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    /// Inverse regularization strength
    pub c: f64,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Maximum number of passes over the data
    pub max_iter: usize,
    /// Stop when the loss improves by less than this
    pub tol: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 2.0,
            max_iter: 1000,
            tol: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    intercept: f64,
    /// Iterations run before stopping
    n_iter: usize,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    /// Fit on vectorized rows and 0/1 targets
    ///
    /// `on_iteration` receives the iteration number and current loss.
    pub fn fit(
        rows: &[SparseVector],
        targets: &[u8],
        n_features: usize,
        config: &LogisticRegressionConfig,
        mut on_iteration: impl FnMut(usize, f64),
    ) -> Result<Self> {
        anyhow::ensure!(!rows.is_empty(), "cannot fit a model on zero samples");
        anyhow::ensure!(
            rows.len() == targets.len(),
            "{} rows but {} targets",
            rows.len(),
            targets.len()
        );
        anyhow::ensure!(targets.iter().all(|&t| t <= 1), "targets must be 0 or 1");
        anyhow::ensure!(
            targets.contains(&0) && targets.contains(&1),
            "training data must contain both classes"
        );
        anyhow::ensure!(config.c > 0.0, "C must be positive");
        if let Some(max) = rows.iter().filter_map(|r| r.max_index()).max() {
            anyhow::ensure!(max < n_features, "row index {} exceeds {} features", max, n_features);
        }

        let n = rows.len() as f64;
        let penalty = 1.0 / (config.c * n);
        let mut model = Self {
            weights: vec![0.0; n_features],
            intercept: 0.0,
            n_iter: 0,
        };
        let mut grad = vec![0.0; n_features];
        let mut previous_loss = f64::INFINITY;

        for iter in 1..=config.max_iter {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_intercept = 0.0;
            let mut loss = 0.0;

            for (row, &target) in rows.iter().zip(targets) {
                let p = sigmoid(model.decision(row));
                let y = target as f64;
                let err = p - y;

                loss -= y * p.max(1e-15).ln() + (1.0 - y) * (1.0 - p).max(1e-15).ln();
                grad_intercept += err;
                for (&i, &v) in row.indices.iter().zip(&row.values) {
                    grad[i] += err * v;
                }
            }

            let l2: f64 = model.weights.iter().map(|w| w * w).sum();
            loss = loss / n + 0.5 * penalty * l2;

            for (w, g) in model.weights.iter_mut().zip(&grad) {
                *w -= config.learning_rate * (g / n + penalty * *w);
            }
            model.intercept -= config.learning_rate * grad_intercept / n;
            model.n_iter = iter;

            on_iteration(iter, loss);

            if (previous_loss - loss).abs() < config.tol {
                tracing::debug!("Logistic regression converged after {} iterations", iter);
                break;
            }
            previous_loss = loss;
        }

        Ok(model)
    }

    /// Build a model from explicit parameters
    pub fn from_parameters(weights: Vec<f64>, intercept: f64) -> Self {
        Self {
            weights,
            intercept,
            n_iter: 0,
        }
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn decision(&self, row: &SparseVector) -> f64 {
        row.dot(&self.weights) + self.intercept
    }

    /// Class probabilities `[P(Fake), P(Real)]`
    pub fn predict_proba(&self, row: &SparseVector) -> Result<[f64; 2]> {
        if let Some(max) = row.max_index() {
            anyhow::ensure!(
                max < self.weights.len(),
                "feature index {} outside model width {}",
                max,
                self.weights.len()
            );
        }
        let p_real = sigmoid(self.decision(row));
        Ok([1.0 - p_real, p_real])
    }

    /// Most likely class id; ties go to class 0
    pub fn predict(&self, row: &SparseVector) -> Result<u8> {
        let [p_fake, p_real] = self.predict_proba(row)?;
        Ok(if p_real > p_fake { 1 } else { 0 })
    }
}
