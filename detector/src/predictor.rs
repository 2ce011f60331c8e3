// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! The layered fake-news decision pipeline
//!
//! Stages run in a fixed precedence order and the first decisive stage wins:
//!
//! 1. Override rules (identity and sensational claims)
//! 2. Short-message plausibility check
//! 3. Language detection, translation to English and context expansion
//! 4. The trained classifier
//!
//! Every executed stage appends one line to the verdict's explanation.

use crate::artifacts::{ClassifierArtifacts, TextClassifier};
use crate::config::PredictorConfig;
use crate::expand::ContextExpander;
use crate::language::{self, LanguageDetector, ScriptDetector};
use crate::rules::{RuleEngine, RulePatternSet};
use crate::text;
use crate::translate::{NoopTranslator, TranslationOutcome, Translator};
use crate::verdict::{Decision, Verdict, SHORT_MESSAGE_REASON};
use anyhow::{Context, Result};

/// Messages with at most this many words get the short-message treatment
pub const DEFAULT_SHORT_MESSAGE_WORDS: usize = 5;

pub struct FakeNewsPredictor {
    rules: RuleEngine,
    classifier: Box<dyn TextClassifier>,
    detector: Box<dyn LanguageDetector>,
    translator: Box<dyn Translator>,
    expander: ContextExpander,
    short_message_words: usize,
}

impl std::fmt::Debug for FakeNewsPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeNewsPredictor")
            .field("detector", &self.detector.name())
            .field("translator", &self.translator.name())
            .field("short_message_words", &self.short_message_words)
            .finish()
    }
}

impl FakeNewsPredictor {
    pub fn builder(classifier: Box<dyn TextClassifier>) -> PredictorBuilder {
        PredictorBuilder::new(classifier)
    }

    /// Load artifacts, patterns and collaborators described by a config
    pub fn from_config(config: &PredictorConfig) -> Result<Self> {
        let artifacts = ClassifierArtifacts::load(&config.vectorizer_path(), &config.model_path())
            .context("Failed to load classifier artifacts")?;
        let patterns = config.rule_patterns()?;
        let translator = config.build_translator()?;

        tracing::info!(
            "Predictor ready (translator: {}, short message limit: {} words)",
            translator.name(),
            config.short_message_words
        );

        Ok(Self::builder(Box::new(artifacts))
            .patterns(patterns)
            .translator(translator)
            .short_message_words(config.short_message_words)
            .build())
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// Classify one text
    ///
    /// Only classifier failures are returned as errors; detection and
    /// translation problems degrade to the original text.
    pub fn predict(&self, input: &str) -> Result<Verdict> {
        let normalized = text::normalize(input);
        let keywords = self.rules.keywords(&normalized);
        let mut explanation = Vec::new();

        if let Some(rule) = self.rules.check(&normalized) {
            tracing::debug!("Rule '{}' fired: {}", rule.pattern, rule.reason());
            explanation.push("Rule-based validation triggered".to_string());
            explanation.push(rule.reason().to_string());
            return Ok(Verdict::new(Decision::RuleBased { rule }, explanation, keywords));
        }
        explanation.push("Rule-based validation passed".to_string());

        if text::word_count(&normalized) <= self.short_message_words {
            if !self.rules.is_plausible(&normalized) {
                explanation.push(SHORT_MESSAGE_REASON.to_string());
                return Ok(Verdict::new(Decision::LogicBased, explanation, keywords));
            }
            explanation.push("Short message plausibility check passed".to_string());
        }

        let original = input.trim();
        let lang = language::detect_or_unknown(self.detector.as_ref(), original);
        explanation.push(format!("Detected language: {}", lang));

        let outcome = self.translator.to_english(original, &lang);
        explanation.push(
            match &outcome {
                TranslationOutcome::Translated(_) => "Text translated to English",
                TranslationOutcome::Unchanged => "Text already in English",
                TranslationOutcome::Failed(_) => "Translation unavailable, using original text",
            }
            .to_string(),
        );
        let english = outcome.text_or(original);

        let expanded = if self.expander.needs_expansion(english) {
            explanation.push("Context expansion applied".to_string());
            self.expander.expand(english)
        } else {
            explanation.push("Context expansion not needed".to_string());
            english.to_string()
        };

        let score = self.classifier.score(&expanded).context("Classifier failed")?;
        explanation.extend(self.classifier.stage_labels().iter().map(|s| s.to_string()));

        tracing::debug!("Classifier decided {} ({:.4})", score.label, score.confidence);

        Ok(Verdict::new(
            Decision::MlBased {
                label: score.label,
                confidence: score.confidence,
            },
            explanation,
            keywords,
        ))
    }
}

/// Builder for [`FakeNewsPredictor`]
pub struct PredictorBuilder {
    classifier: Box<dyn TextClassifier>,
    patterns: RulePatternSet,
    detector: Box<dyn LanguageDetector>,
    translator: Box<dyn Translator>,
    short_message_words: usize,
}

impl PredictorBuilder {
    pub fn new(classifier: Box<dyn TextClassifier>) -> Self {
        Self {
            classifier,
            patterns: RulePatternSet::default(),
            detector: Box::new(ScriptDetector),
            translator: Box::new(NoopTranslator),
            short_message_words: DEFAULT_SHORT_MESSAGE_WORDS,
        }
    }

    pub fn patterns(mut self, patterns: RulePatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn detector(mut self, detector: Box<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn short_message_words(mut self, words: usize) -> Self {
        self.short_message_words = words;
        self
    }

    pub fn build(self) -> FakeNewsPredictor {
        FakeNewsPredictor {
            rules: RuleEngine::new(self.patterns),
            classifier: self.classifier,
            detector: self.detector,
            translator: self.translator,
            expander: ContextExpander::new(self.short_message_words),
            short_message_words: self.short_message_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Score;
    use crate::datasets::Label;
    use crate::rules::RuleKind;
    use crate::verdict::{Mode, RiskLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Classifier returning a fixed score and recording what it saw
    struct StubClassifier {
        score: Score,
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl StubClassifier {
        fn new(label: Label, confidence: f64) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let seen = Arc::new(Mutex::new(Vec::new()));
            let stub = Self {
                score: Score { label, confidence },
                calls: calls.clone(),
                seen: seen.clone(),
            };
            (stub, calls, seen)
        }
    }

    impl TextClassifier for StubClassifier {
        fn score(&self, text: &str) -> Result<Score> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(text.to_string());
            Ok(self.score)
        }

        fn stage_labels(&self) -> &'static [&'static str] {
            &["TF-IDF vectorization applied", "Logistic Regression model applied"]
        }
    }

    struct FailingClassifier;

    impl TextClassifier for FailingClassifier {
        fn score(&self, _text: &str) -> Result<Score> {
            anyhow::bail!("feature width mismatch")
        }

        fn stage_labels(&self) -> &'static [&'static str] {
            &[]
        }
    }

    struct FixedDetector(&'static str);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingDetector;

    impl LanguageDetector for FailingDetector {
        fn detect(&self, _text: &str) -> Result<String> {
            anyhow::bail!("service down")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct FixedTranslator(TranslationOutcome);

    impl Translator for FixedTranslator {
        fn to_english(&self, _text: &str, _source_lang: &str) -> TranslationOutcome {
            self.0.clone()
        }

        fn to_target(&self, _text: &str, _target_lang: &str) -> TranslationOutcome {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn predictor(label: Label, confidence: f64) -> (FakeNewsPredictor, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
        let (stub, calls, seen) = StubClassifier::new(label, confidence);
        let predictor = FakeNewsPredictor::builder(Box::new(stub))
            .detector(Box::new(FixedDetector("en")))
            .build();
        (predictor, calls, seen)
    }

    #[test]
    fn test_identity_claim_overrides_classifier() {
        let (predictor, calls, _) = predictor(Label::Real, 0.99);
        let verdict = predictor.predict("I am the CM of this state").unwrap();

        assert_eq!(verdict.label(), Label::Fake);
        assert_eq!(verdict.mode(), Mode::RuleBased);
        assert_eq!(verdict.confidence(), 0.99);
        assert_eq!(verdict.risk_level(), RiskLevel::High);
        assert_eq!(verdict.reason(), "Identity claim detected");
        assert_eq!(
            verdict.explanation(),
            ["Rule-based validation triggered", "Identity claim detected"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_identity_wins_over_sensational() {
        let (predictor, _, _) = predictor(Label::Real, 0.9);
        let verdict = predictor.predict("I am the PM and aliens are here").unwrap();
        match verdict.decision() {
            Decision::RuleBased { rule } => assert_eq!(rule.kind, RuleKind::IdentityClaim),
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_sensational_claim() {
        let (predictor, calls, _) = predictor(Label::Real, 0.9);
        let verdict = predictor
            .predict("Scientists confirm the sun stopped moving for two whole days last week")
            .unwrap();

        assert_eq!(verdict.mode(), Mode::RuleBased);
        assert_eq!(verdict.reason(), "Impossible or sensational claim detected");
        assert_eq!(verdict.keywords().fake, vec!["sun stopped"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_implausible_message() {
        let (predictor, calls, _) = predictor(Label::Real, 0.9);
        let verdict = predictor.predict("xyz").unwrap();

        assert_eq!(verdict.label(), Label::Fake);
        assert_eq!(verdict.mode(), Mode::LogicBased);
        assert_eq!(verdict.confidence(), 0.85);
        assert_eq!(verdict.risk_level(), RiskLevel::Medium);
        assert_eq!(
            verdict.explanation(),
            ["Rule-based validation passed", "Short suspicious message detected"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_implausible_record_shape() {
        let (predictor, _, _) = predictor(Label::Real, 0.9);
        for input in ["xyz", "", "बारिश"] {
            let json = serde_json::to_value(predictor.predict(input).unwrap()).unwrap();
            assert_eq!(json["prediction"], "Fake", "input {:?}", input);
            assert_eq!(json["mode"], "Logic-based", "input {:?}", input);
            assert_eq!(json["risk_level"], "Medium", "input {:?}", input);
            assert_eq!(json["reason"], "Short suspicious message detected", "input {:?}", input);
        }
    }

    #[test]
    fn test_short_plausible_message_reaches_classifier() {
        let (predictor, calls, seen) = predictor(Label::Real, 0.7312);
        let verdict = predictor.predict("rain").unwrap();

        assert_eq!(verdict.mode(), Mode::MlBased);
        assert_eq!(verdict.label(), Label::Real);
        assert_eq!(verdict.confidence(), 0.7312);
        assert_eq!(verdict.risk_level(), RiskLevel::Low);
        assert_eq!(verdict.reason(), "Pattern-based ML decision");
        assert_eq!(verdict.keywords().real, vec!["rain"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen.lock().unwrap()[0], "Social media post claims: rain");
        assert_eq!(
            verdict.explanation(),
            [
                "Rule-based validation passed",
                "Short message plausibility check passed",
                "Detected language: en",
                "Text already in English",
                "Context expansion applied",
                "TF-IDF vectorization applied",
                "Logistic Regression model applied",
            ]
        );
    }

    #[test]
    fn test_long_message_is_not_expanded() {
        let (predictor, _, seen) = predictor(Label::Fake, 0.62);
        let text = "The city council approved the new budget for road repairs";
        let verdict = predictor.predict(text).unwrap();

        assert_eq!(verdict.risk_level(), RiskLevel::Medium);
        assert_eq!(seen.lock().unwrap()[0], text);
        assert!(verdict.explanation().contains(&"Context expansion not needed".to_string()));
        assert!(!verdict
            .explanation()
            .iter()
            .any(|s| s.contains("plausibility")));
    }

    #[test]
    fn test_translation_is_used_when_available() {
        let (stub, _, seen) = StubClassifier::new(Label::Real, 0.8);
        let predictor = FakeNewsPredictor::builder(Box::new(stub))
            .detector(Box::new(FixedDetector("hi")))
            .translator(Box::new(FixedTranslator(TranslationOutcome::Translated(
                "heavy rain expected in the city tomorrow".to_string(),
            ))))
            .build();

        let verdict = predictor.predict("कल शहर में भारी बारिश की संभावना है").unwrap();
        assert_eq!(seen.lock().unwrap()[0], "heavy rain expected in the city tomorrow");
        assert!(verdict.explanation().contains(&"Detected language: hi".to_string()));
        assert!(verdict.explanation().contains(&"Text translated to English".to_string()));
    }

    #[test]
    fn test_collaborator_failures_still_yield_verdict() {
        let (stub, _, seen) = StubClassifier::new(Label::Fake, 0.55);
        let predictor = FakeNewsPredictor::builder(Box::new(stub))
            .detector(Box::new(FailingDetector))
            .translator(Box::new(FixedTranslator(TranslationOutcome::Failed("timeout".to_string()))))
            .build();

        let text = "Government announces new bus routes across the district";
        let verdict = predictor.predict(text).unwrap();

        assert_eq!(verdict.mode(), Mode::MlBased);
        assert_eq!(seen.lock().unwrap()[0], text);
        assert!(verdict.explanation().contains(&"Detected language: unknown".to_string()));
        assert!(verdict
            .explanation()
            .contains(&"Translation unavailable, using original text".to_string()));
    }

    #[test]
    fn test_classifier_errors_propagate() {
        let predictor = FakeNewsPredictor::builder(Box::new(FailingClassifier)).build();
        let err = predictor.predict("rain").unwrap_err();
        assert!(format!("{:#}", err).contains("feature width mismatch"));

        // Rule paths never touch the classifier
        assert!(predictor.predict("free money for everyone today").is_ok());
    }

    #[test]
    fn test_predict_is_idempotent() {
        let (predictor, _, _) = predictor(Label::Fake, 0.91);
        for text in ["rain", "xyz", "I am the president", "Train services resume after the long strike"] {
            assert_eq!(predictor.predict(text).unwrap(), predictor.predict(text).unwrap());
        }
    }

    #[test]
    fn test_custom_short_message_limit() {
        let (stub, calls, _) = StubClassifier::new(Label::Real, 0.9);
        let predictor = FakeNewsPredictor::builder(Box::new(stub))
            .short_message_words(2)
            .build();

        // Three words is no longer short
        let verdict = predictor.predict("xyz abc def").unwrap();
        assert_eq!(verdict.mode(), Mode::MlBased);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_predictor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FakeNewsPredictor>();
    }
}
