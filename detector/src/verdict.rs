// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Prediction verdicts
//!
//! Provides:
//! - The decision stage that produced a verdict, with its authoritative fields
//! - Risk level bucketing
//! - The ordered explanation trail and keyword hits
//! - The flat record form used for JSON output

use crate::datasets::Label;
use crate::rules::{KeywordMatches, RuleMatch};
use serde::{Deserialize, Serialize};

/// Confidence reported for rule overrides
pub const RULE_CONFIDENCE: f64 = 0.99;
/// Confidence reported for short suspicious messages
pub const SHORT_MESSAGE_CONFIDENCE: f64 = 0.85;
/// Reason reported for short suspicious messages
pub const SHORT_MESSAGE_REASON: &str = "Short suspicious message detected";
/// Reason reported for classifier decisions
pub const ML_REASON: &str = "Pattern-based ML decision";

/// Which pipeline stage decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "Rule-based")]
    RuleBased,
    #[serde(rename = "Logic-based")]
    LogicBased,
    #[serde(rename = "ML-based")]
    MlBased,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::RuleBased => "Rule-based",
            Mode::LogicBased => "Logic-based",
            Mode::MlBased => "ML-based",
        }
    }
}

/// Coarse severity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// Bucket a finalized label/confidence pair
///
/// Rule overrides are high risk and short suspicious messages medium risk.
/// Classifier Fake verdicts are bucketed at 0.80 and 0.50. Real verdicts are
/// always low risk.
pub fn risk_level(label: Label, confidence: f64, mode: Mode) -> RiskLevel {
    match label {
        Label::Real => RiskLevel::Low,
        Label::Fake if mode == Mode::RuleBased => RiskLevel::High,
        Label::Fake if mode == Mode::LogicBased => RiskLevel::Medium,
        Label::Fake if confidence >= 0.80 => RiskLevel::High,
        Label::Fake if confidence >= 0.50 => RiskLevel::Medium,
        Label::Fake => RiskLevel::Low,
    }
}

/// The stage that produced a verdict, carrying only what that stage decides
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// A rule override fired; the classifier was not consulted
    RuleBased { rule: RuleMatch },
    /// A short message mentioned no plausible topic
    LogicBased,
    /// The trained classifier decided
    MlBased { label: Label, confidence: f64 },
}

/// The complete output of one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "VerdictRecord")]
pub struct Verdict {
    decision: Decision,
    explanation: Vec<String>,
    keywords: KeywordMatches,
}

impl Verdict {
    pub fn new(decision: Decision, explanation: Vec<String>, keywords: KeywordMatches) -> Self {
        Self {
            decision,
            explanation,
            keywords,
        }
    }

    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn label(&self) -> Label {
        match &self.decision {
            Decision::RuleBased { .. } | Decision::LogicBased => Label::Fake,
            Decision::MlBased { label, .. } => *label,
        }
    }

    pub fn confidence(&self) -> f64 {
        match &self.decision {
            Decision::RuleBased { .. } => RULE_CONFIDENCE,
            Decision::LogicBased => SHORT_MESSAGE_CONFIDENCE,
            Decision::MlBased { confidence, .. } => *confidence,
        }
    }

    pub fn mode(&self) -> Mode {
        match &self.decision {
            Decision::RuleBased { .. } => Mode::RuleBased,
            Decision::LogicBased => Mode::LogicBased,
            Decision::MlBased { .. } => Mode::MlBased,
        }
    }

    pub fn reason(&self) -> &'static str {
        match &self.decision {
            Decision::RuleBased { rule } => rule.reason(),
            Decision::LogicBased => SHORT_MESSAGE_REASON,
            Decision::MlBased { .. } => ML_REASON,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        risk_level(self.label(), self.confidence(), self.mode())
    }

    /// Pipeline stages executed, in order
    pub fn explanation(&self) -> &[String] {
        &self.explanation
    }

    pub fn keywords(&self) -> &KeywordMatches {
        &self.keywords
    }

    /// Flat record for serialization and display
    pub fn record(&self) -> VerdictRecord {
        VerdictRecord::from(self.clone())
    }

    /// Human-readable multi-line summary
    pub fn summary(&self) -> String {
        self.record().summary()
    }
}

/// Flat verdict record: the shape reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub prediction: Label,
    pub confidence: f64,
    pub mode: Mode,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub explanation: Vec<String>,
    pub keywords: KeywordMatches,
}

impl VerdictRecord {
    /// Human-readable multi-line summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Prediction     : [{}]", self.prediction.as_str().to_uppercase()),
            format!("Confidence     : {:.2}%", self.confidence * 100.0),
            format!("Risk Level     : [{}]", self.risk_level.as_str()),
            format!("Decision Mode  : {}", self.mode.as_str()),
            format!("Reason         : {}", self.reason),
        ];

        if !self.keywords.fake.is_empty() || !self.keywords.real.is_empty() {
            lines.push(format!(
                "Keywords       : fake={:?} real={:?}",
                self.keywords.fake, self.keywords.real
            ));
        }

        if !self.explanation.is_empty() {
            lines.push(String::new());
            lines.push("Explanation:".to_string());
            for step in &self.explanation {
                lines.push(format!("- {}", step));
            }
        }

        lines.join("\n")
    }
}

impl From<Verdict> for VerdictRecord {
    fn from(verdict: Verdict) -> Self {
        Self {
            prediction: verdict.label(),
            confidence: verdict.confidence(),
            mode: verdict.mode(),
            reason: verdict.reason().to_string(),
            risk_level: verdict.risk_level(),
            explanation: verdict.explanation,
            keywords: verdict.keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;

    fn rule_verdict() -> Verdict {
        Verdict::new(
            Decision::RuleBased {
                rule: RuleMatch {
                    kind: RuleKind::IdentityClaim,
                    pattern: "i am the cm".to_string(),
                },
            },
            vec!["Rule-based validation triggered".to_string(), "Identity claim detected".to_string()],
            KeywordMatches::default(),
        )
    }

    #[test]
    fn test_risk_thresholds() {
        let ml = Mode::MlBased;
        assert_eq!(risk_level(Label::Fake, 0.0, ml), RiskLevel::Low);
        assert_eq!(risk_level(Label::Fake, 0.4999, ml), RiskLevel::Low);
        assert_eq!(risk_level(Label::Fake, 0.5, ml), RiskLevel::Medium);
        assert_eq!(risk_level(Label::Fake, 0.7999, ml), RiskLevel::Medium);
        assert_eq!(risk_level(Label::Fake, 0.8, ml), RiskLevel::High);
        assert_eq!(risk_level(Label::Fake, 1.0, ml), RiskLevel::High);
        assert_eq!(risk_level(Label::Real, 0.99, ml), RiskLevel::Low);
        assert_eq!(risk_level(Label::Fake, 0.1, Mode::RuleBased), RiskLevel::High);
        assert_eq!(risk_level(Label::Fake, 0.85, Mode::LogicBased), RiskLevel::Medium);
        assert_eq!(risk_level(Label::Fake, 0.99, Mode::LogicBased), RiskLevel::Medium);
    }

    #[test]
    fn test_risk_is_monotonic_in_confidence() {
        let mut previous = RiskLevel::Low;
        for step in 0..=100 {
            let level = risk_level(Label::Fake, step as f64 / 100.0, Mode::MlBased);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_rule_verdict_fields() {
        let verdict = rule_verdict();
        assert_eq!(verdict.label(), Label::Fake);
        assert_eq!(verdict.confidence(), RULE_CONFIDENCE);
        assert_eq!(verdict.mode(), Mode::RuleBased);
        assert_eq!(verdict.risk_level(), RiskLevel::High);
        assert_eq!(verdict.reason(), "Identity claim detected");
    }

    #[test]
    fn test_logic_verdict_fields() {
        let verdict = Verdict::new(Decision::LogicBased, vec![], KeywordMatches::default());
        assert_eq!(verdict.label(), Label::Fake);
        assert_eq!(verdict.confidence(), SHORT_MESSAGE_CONFIDENCE);
        assert_eq!(verdict.risk_level(), RiskLevel::Medium);
        assert_eq!(verdict.reason(), SHORT_MESSAGE_REASON);
    }

    #[test]
    fn test_serialized_record_shape() {
        let json = serde_json::to_value(rule_verdict()).unwrap();
        assert_eq!(json["prediction"], "Fake");
        assert_eq!(json["confidence"], 0.99);
        assert_eq!(json["mode"], "Rule-based");
        assert_eq!(json["risk_level"], "High");
        assert_eq!(json["reason"], "Identity claim detected");
        assert_eq!(json["explanation"].as_array().unwrap().len(), 2);
        assert!(json["keywords"]["fake"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_logic_record_is_medium_risk() {
        let verdict = Verdict::new(Decision::LogicBased, vec![], KeywordMatches::default());
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["mode"], "Logic-based");
        assert_eq!(json["risk_level"], "Medium");
        assert_eq!(json["confidence"], 0.85);
    }

    #[test]
    fn test_summary_mentions_verdict() {
        let summary = rule_verdict().summary();
        assert!(summary.contains("[FAKE]"));
        assert!(summary.contains("Rule-based"));
        assert!(summary.contains("- Identity claim detected"));
    }
}
