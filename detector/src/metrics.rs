// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Held-out evaluation metrics
//!
//! Fake is the positive class throughout: a true positive is a fake item
//! predicted as fake.

use crate::datasets::Label;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Binary confusion matrix with Fake as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Fake predicted as Fake
    pub tp: usize,
    /// Real predicted as Real
    pub tn: usize,
    /// Real predicted as Fake
    pub fp: usize,
    /// Fake predicted as Real
    pub fn_: usize,
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b == 0.0 {
        0.0
    } else {
        2.0 * a * b / (a + b)
    }
}

impl ConfusionMatrix {
    pub fn from_predictions(predictions: &[Label], truth: &[Label]) -> Result<Self> {
        anyhow::ensure!(
            predictions.len() == truth.len(),
            "{} predictions for {} labels",
            predictions.len(),
            truth.len()
        );

        let mut cm = Self::default();
        for pair in predictions.iter().zip(truth) {
            match pair {
                (Label::Fake, Label::Fake) => cm.tp += 1,
                (Label::Real, Label::Real) => cm.tn += 1,
                (Label::Fake, Label::Real) => cm.fp += 1,
                (Label::Real, Label::Fake) => cm.fn_ += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Share of Fake predictions that were fake
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Share of fake items caught
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Share of real items left alone
    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    pub fn f1_score(&self) -> f64 {
        harmonic_mean(self.precision(), self.recall())
    }

    /// Matthews correlation coefficient in [-1, 1]
    pub fn mcc(&self) -> f64 {
        let (tp, tn, fp, fn_) = (self.tp as f64, self.tn as f64, self.fp as f64, self.fn_ as f64);
        let denom = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        if denom == 0.0 {
            0.0
        } else {
            (tp * tn - fp * fn_) / denom
        }
    }

    /// Metrics with the Real class treated as positive
    fn real_class(&self) -> ClassMetrics {
        let precision = ratio(self.tn, self.tn + self.fn_);
        let recall = self.specificity();
        ClassMetrics {
            label: Label::Real,
            precision,
            recall,
            f1_score: harmonic_mean(precision, recall),
            support: self.tn + self.fp,
        }
    }

    fn fake_class(&self) -> ClassMetrics {
        ClassMetrics {
            label: Label::Fake,
            precision: self.precision(),
            recall: self.recall(),
            f1_score: self.f1_score(),
            support: self.tp + self.fn_,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Threshold and ranking metrics for one evaluation split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub specificity: f64,
    pub mcc: f64,
    /// Area under the ROC curve of P(Fake)
    pub auc_roc: f64,
    pub per_class: Vec<ClassMetrics>,
}

impl EvaluationMetrics {
    /// Evaluate predicted labels and `P(Fake)` scores against ground truth
    pub fn compute(predictions: &[Label], fake_scores: &[f64], truth: &[Label]) -> Result<Self> {
        anyhow::ensure!(
            fake_scores.len() == truth.len(),
            "{} scores for {} labels",
            fake_scores.len(),
            truth.len()
        );
        let cm = ConfusionMatrix::from_predictions(predictions, truth)?;

        Ok(Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1_score: cm.f1_score(),
            specificity: cm.specificity(),
            mcc: cm.mcc(),
            auc_roc: auc_roc(fake_scores, truth),
            per_class: vec![cm.fake_class(), cm.real_class()],
            confusion_matrix: cm,
        })
    }

    /// Human-readable report
    pub fn format(&self) -> String {
        let cm = &self.confusion_matrix;
        let mut out = format!(
            "Evaluation Report\n\
             =================\n\
             Accuracy:    {:.4} ({:.2}%)\n\
             Precision:   {:.4}\n\
             Recall:      {:.4}\n\
             F1 Score:    {:.4}\n\
             Specificity: {:.4}\n\
             MCC:         {:.4}\n\
             AUC-ROC:     {:.4}\n\
             Support:     {}\n\n\
             Confusion Matrix:\n\
             \x20             Predicted\n\
             \x20             Fake    Real\n\
             Actual Fake  {:>6}  {:>6}\n\
             \x20      Real  {:>6}  {:>6}\n\n\
             Per-Class Metrics:\n",
            self.accuracy,
            self.accuracy * 100.0,
            self.precision,
            self.recall,
            self.f1_score,
            self.specificity,
            self.mcc,
            self.auc_roc,
            cm.total(),
            cm.tp,
            cm.fn_,
            cm.fp,
            cm.tn,
        );
        for class in &self.per_class {
            out.push_str(&format!(
                "  {}: P={:.4} R={:.4} F1={:.4} (n={})\n",
                class.label, class.precision, class.recall, class.f1_score, class.support
            ));
        }
        out
    }
}

/// ROC AUC of `scores` for the Fake class; tied scores count half
///
/// Returns 0.5 when either class is absent.
pub fn auc_roc(scores: &[f64], truth: &[Label]) -> f64 {
    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(truth)
        .map(|(&s, &l)| (s, l == Label::Fake))
        .collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let n_pos = pairs.iter().filter(|p| p.1).count() as f64;
    let n_neg = pairs.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return 0.5;
    }

    let (mut tp, mut fp) = (0.0, 0.0);
    let (mut prev_tpr, mut prev_fpr) = (0.0, 0.0);
    let mut auc = 0.0;
    let mut i = 0;

    // Advance one score group at a time so ties form a diagonal segment
    while i < pairs.len() {
        let score = pairs[i].0;
        while i < pairs.len() && pairs[i].0 == score {
            if pairs[i].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        let (tpr, fpr) = (tp / n_pos, fp / n_neg);
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_tpr = tpr;
        prev_fpr = fpr;
    }

    auc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::Label::{Fake, Real};

    #[test]
    fn test_confusion_matrix_counts_fake_as_positive() {
        let cm = ConfusionMatrix::from_predictions(&[Fake, Fake, Real, Real, Fake], &[Fake, Real, Real, Fake, Fake])
            .unwrap();
        assert_eq!(cm, ConfusionMatrix { tp: 2, tn: 1, fp: 1, fn_: 1 });
        assert!((cm.accuracy() - 0.6).abs() < 1e-12);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.specificity() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_and_inverted_mcc() {
        let truth = [Fake, Fake, Real, Real];
        let perfect = ConfusionMatrix::from_predictions(&truth, &truth).unwrap();
        assert!((perfect.mcc() - 1.0).abs() < 1e-12);

        let inverted = ConfusionMatrix::from_predictions(&[Real, Real, Fake, Fake], &truth).unwrap();
        assert!((inverted.mcc() + 1.0).abs() < 1e-12);
        assert_eq!(inverted.accuracy(), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        assert!(ConfusionMatrix::from_predictions(&[Fake], &[Fake, Real]).is_err());
        assert!(EvaluationMetrics::compute(&[Fake], &[0.2, 0.3], &[Fake]).is_err());
    }

    #[test]
    fn test_auc_roc() {
        let truth = [Fake, Fake, Real, Real];
        assert!((auc_roc(&[0.9, 0.8, 0.2, 0.1], &truth) - 1.0).abs() < 1e-12);
        assert!(auc_roc(&[0.1, 0.2, 0.8, 0.9], &truth).abs() < 1e-12);
        // All scores tied: no ranking information
        assert!((auc_roc(&[0.5; 4], &truth) - 0.5).abs() < 1e-12);
        assert_eq!(auc_roc(&[0.9, 0.1], &[Fake, Fake]), 0.5);
    }

    #[test]
    fn test_per_class_metrics_and_report() {
        let truth = [Fake, Real, Real, Real];
        let predictions = [Fake, Fake, Real, Real];
        let metrics = EvaluationMetrics::compute(&predictions, &[0.9, 0.6, 0.3, 0.1], &truth).unwrap();

        assert_eq!(metrics.per_class[0].label, Fake);
        assert_eq!(metrics.per_class[0].support, 1);
        assert_eq!(metrics.per_class[1].label, Real);
        assert_eq!(metrics.per_class[1].support, 3);
        assert!((metrics.per_class[1].precision - 1.0).abs() < 1e-12);
        assert!((metrics.auc_roc - 1.0).abs() < 1e-12);

        let report = metrics.format();
        assert!(report.contains("Evaluation Report"));
        assert!(report.contains("AUC-ROC"));
        assert!(report.contains("Fake: P="));
    }
}
