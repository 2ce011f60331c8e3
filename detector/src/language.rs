// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Language detection
//!
//! Detection is a collaborator of the decision pipeline. Detectors may fail;
//! the pipeline always falls back to [`UNKNOWN_LANGUAGE`] so a prediction
//! never aborts here.

use anyhow::Result;
use std::collections::HashMap;

/// Code reported when no detector could decide
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Trait for language detectors
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`, returning an ISO 639-1 style code
    fn detect(&self, text: &str) -> Result<String>;

    /// Get detector name
    fn name(&self) -> &str;
}

/// Run a detector, substituting [`UNKNOWN_LANGUAGE`] on failure
pub fn detect_or_unknown(detector: &dyn LanguageDetector, text: &str) -> String {
    match detector.detect(text) {
        Ok(code) if !code.trim().is_empty() => code,
        Ok(_) => UNKNOWN_LANGUAGE.to_string(),
        Err(e) => {
            tracing::warn!("Language detection via {} failed: {:#}", detector.name(), e);
            UNKNOWN_LANGUAGE.to_string()
        }
    }
}

/// Unicode-script based detector
///
/// Counts letters per script and reports the dominant one. Latin script is
/// reported as English, which is the only Latin-script language the
/// classifier was trained on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    fn script_code(c: char) -> Option<&'static str> {
        match c as u32 {
            0x0900..=0x097F => Some("hi"),
            0x0980..=0x09FF => Some("bn"),
            0x0A00..=0x0A7F => Some("pa"),
            0x0A80..=0x0AFF => Some("gu"),
            0x0B80..=0x0BFF => Some("ta"),
            0x0C00..=0x0C7F => Some("te"),
            0x0C80..=0x0CFF => Some("kn"),
            0x0D00..=0x0D7F => Some("ml"),
            0x0600..=0x06FF => Some("ar"),
            0x0400..=0x04FF => Some("ru"),
            0x4E00..=0x9FFF => Some("zh"),
            _ if c.is_ascii_alphabetic() => Some("en"),
            0x00C0..=0x024F if c.is_alphabetic() => Some("en"),
            _ => None,
        }
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Result<String> {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        for code in text.chars().filter_map(Self::script_code) {
            *counts.entry(code).or_insert(0) += 1;
        }

        // Highest count wins; ties resolve alphabetically so detection is stable
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(code, _)| code.to_string())
            .ok_or_else(|| anyhow::anyhow!("no letters to detect a language from"))
    }

    fn name(&self) -> &str {
        "script"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingDetector;

    impl LanguageDetector for FailingDetector {
        fn detect(&self, _text: &str) -> Result<String> {
            anyhow::bail!("service unavailable")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_script_detection() {
        let detector = ScriptDetector;
        assert_eq!(detector.detect("Heavy rain in the city").unwrap(), "en");
        assert_eq!(detector.detect("दिल्ली में भारी बारिश").unwrap(), "hi");
        assert_eq!(detector.detect("హైదరాబాద్ లో వర్షం").unwrap(), "te");
    }

    #[test]
    fn test_dominant_script_wins() {
        let detector = ScriptDetector;
        assert_eq!(detector.detect("CM ने कहा कि बारिश होगी").unwrap(), "hi");
    }

    #[test]
    fn test_no_letters_is_an_error() {
        assert!(ScriptDetector.detect("12345 !!!").is_err());
    }

    #[test]
    fn test_fallback_to_unknown() {
        assert_eq!(detect_or_unknown(&FailingDetector, "anything"), UNKNOWN_LANGUAGE);
        assert_eq!(detect_or_unknown(&ScriptDetector, "???"), UNKNOWN_LANGUAGE);
        assert_eq!(detect_or_unknown(&ScriptDetector, "rain"), "en");
    }
}
