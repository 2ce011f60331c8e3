// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Rule-based overrides
//!
//! Implements:
//! - Identity-claim detection ("i am the cm", ...)
//! - Impossible / sensational claim detection ("aliens", "free money", ...)
//! - Short-message plausibility keywords
//! - Informational keyword extraction attached to every verdict
//!
//! All matching is case-insensitive substring containment over ordered
//! pattern lists; the first pattern that matches wins.

use crate::text;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which rule table produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// Sender claims to be an office holder or to control institutions
    IdentityClaim,
    /// Physically impossible or sensational content
    SensationalClaim,
}

impl RuleKind {
    /// Human-readable reason reported in verdicts
    pub fn reason(&self) -> &'static str {
        match self {
            RuleKind::IdentityClaim => "Identity claim detected",
            RuleKind::SensationalClaim => "Impossible or sensational claim detected",
        }
    }
}

/// A fired rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub kind: RuleKind,
    /// The pattern that matched (lower-cased)
    pub pattern: String,
}

impl RuleMatch {
    pub fn reason(&self) -> &'static str {
        self.kind.reason()
    }
}

/// Ordered pattern tables used by the rule engine
///
/// Every constructor, deserialization included, lower-cases the patterns and
/// rejects empty ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatternTables")]
pub struct RulePatternSet {
    /// Identity-claim patterns, checked first
    identity: Vec<String>,
    /// Sensational / impossible-claim patterns
    sensational: Vec<String>,
    /// Keywords that make a short message plausible
    plausibility: Vec<String>,
}

/// Unvalidated on-disk form of [`RulePatternSet`]
#[derive(Deserialize)]
struct PatternTables {
    identity: Vec<String>,
    sensational: Vec<String>,
    plausibility: Vec<String>,
}

impl TryFrom<PatternTables> for RulePatternSet {
    type Error = anyhow::Error;

    fn try_from(tables: PatternTables) -> Result<Self> {
        Self::new(tables.identity, tables.sensational, tables.plausibility)
    }
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

impl Default for RulePatternSet {
    fn default() -> Self {
        Self {
            identity: owned(&[
                "i am the cm",
                "i am the pm",
                "i am the president",
                "i control the government",
                "i own the country",
            ]),
            sensational: owned(&[
                "aliens",
                "ufo",
                "everyone will get",
                "free gold",
                "free money",
                "earth swallowed",
                "sun stopped",
                "entire city destroyed",
                "miracle cure",
                "secret formula",
                "100% guaranteed",
                "magic",
            ]),
            plausibility: owned(&[
                "rain", "flood", "earthquake", "power", "train", "bus", "government", "school",
                "college", "exam", "hospital", "vaccine", "weather", "traffic", "price", "petrol",
                "diesel", "ration", "salary", "jobs", "scheme", "policy", "minister", "cm", "pm",
                "budget", "education",
            ]),
        }
    }
}

impl RulePatternSet {
    /// Build a pattern set, lower-casing every pattern and preserving order
    pub fn new(identity: Vec<String>, sensational: Vec<String>, plausibility: Vec<String>) -> Result<Self> {
        Self {
            identity,
            sensational,
            plausibility,
        }
        .validated()
    }

    /// Load a pattern set from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule patterns: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse rule patterns: {}", path.display()))
    }

    pub fn identity(&self) -> &[String] {
        &self.identity
    }

    pub fn sensational(&self) -> &[String] {
        &self.sensational
    }

    pub fn plausibility(&self) -> &[String] {
        &self.plausibility
    }

    fn validated(self) -> Result<Self> {
        fn normalize_list(name: &str, list: Vec<String>) -> Result<Vec<String>> {
            list.into_iter()
                .enumerate()
                .map(|(idx, p)| {
                    let p = text::normalize(&p);
                    anyhow::ensure!(!p.is_empty(), "empty {} pattern at position {}", name, idx);
                    Ok(p)
                })
                .collect()
        }

        Ok(Self {
            identity: normalize_list("identity", self.identity)?,
            sensational: normalize_list("sensational", self.sensational)?,
            plausibility: normalize_list("plausibility", self.plausibility)?,
        })
    }
}

/// Keyword hits found in the raw input, independent of the decision path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatches {
    /// Sensational patterns present in the text
    pub fake: Vec<String>,
    /// Plausibility keywords present in the text
    pub real: Vec<String>,
}

/// Pure matcher over an immutable pattern set
#[derive(Debug, Clone)]
pub struct RuleEngine {
    patterns: RulePatternSet,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RulePatternSet::default())
    }
}

impl RuleEngine {
    pub fn new(patterns: RulePatternSet) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &RulePatternSet {
        &self.patterns
    }

    /// Run the override rules; identity claims take precedence
    pub fn check(&self, text: &str) -> Option<RuleMatch> {
        let lower = text.to_lowercase();

        let first_hit = |kind: RuleKind, list: &[String]| {
            list.iter().find(|p| lower.contains(p.as_str())).map(|p| RuleMatch {
                kind,
                pattern: p.clone(),
            })
        };

        first_hit(RuleKind::IdentityClaim, &self.patterns.identity)
            .or_else(|| first_hit(RuleKind::SensationalClaim, &self.patterns.sensational))
    }

    /// A short message is plausible if it mentions an everyday topic
    pub fn is_plausible(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.patterns.plausibility.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Collect sensational and plausibility keyword hits
    pub fn keywords(&self, text: &str) -> KeywordMatches {
        let lower = text.to_lowercase();
        let hits = |list: &[String]| -> Vec<String> {
            list.iter().filter(|p| lower.contains(p.as_str())).cloned().collect()
        };

        KeywordMatches {
            fake: hits(&self.patterns.sensational),
            real: hits(&self.patterns.plausibility),
        }
    }
}
