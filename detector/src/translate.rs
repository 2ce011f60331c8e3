// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Translation adapters
//!
//! Translators report an explicit [`TranslationOutcome`] instead of raising;
//! callers pick the original text for anything other than `Translated`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Texts shorter than this (in characters, trimmed) are never sent out
pub const MIN_TRANSLATABLE_CHARS: usize = 5;

/// Result of a translation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The text was translated
    Translated(String),
    /// No translation was needed (already in the target language, too short)
    Unchanged,
    /// The backend failed; the message describes why
    Failed(String),
}

impl TranslationOutcome {
    /// The translated text, or `original` when nothing was translated
    pub fn text_or<'a>(&'a self, original: &'a str) -> &'a str {
        match self {
            TranslationOutcome::Translated(text) => text,
            TranslationOutcome::Unchanged | TranslationOutcome::Failed(_) => original,
        }
    }
}

/// Trait for translation backends
pub trait Translator: Send + Sync {
    /// Translate `text` (detected as `source_lang`) into English
    fn to_english(&self, text: &str, source_lang: &str) -> TranslationOutcome;

    /// Translate `text` into `target_lang`; English targets are a no-op
    fn to_target(&self, text: &str, target_lang: &str) -> TranslationOutcome;

    /// Get translator name
    fn name(&self) -> &str;
}

/// Whether a text is long enough to be worth translating
fn worth_translating(text: &str) -> bool {
    text.trim().chars().count() >= MIN_TRANSLATABLE_CHARS
}

fn is_english(lang: &str) -> bool {
    lang.eq_ignore_ascii_case("en")
}

/// Translator that never changes anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

impl Translator for NoopTranslator {
    fn to_english(&self, _text: &str, _source_lang: &str) -> TranslationOutcome {
        TranslationOutcome::Unchanged
    }

    fn to_target(&self, _text: &str, _target_lang: &str) -> TranslationOutcome {
        TranslationOutcome::Unchanged
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// Translator backed by a LibreTranslate-compatible HTTP endpoint
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build translation HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let body = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .json(&body)
            .send()
            .context("Failed to send translation request")?;

        if !response.status().is_success() {
            anyhow::bail!("Translation failed with status: {}", response.status());
        }

        let parsed: TranslateResponse = response.json().context("Failed to decode translation response")?;
        Ok(parsed.translated_text)
    }

    fn translate(&self, text: &str, target: &str) -> TranslationOutcome {
        match self.request(text, "auto", target) {
            Ok(translated) if translated.trim().is_empty() => TranslationOutcome::Unchanged,
            Ok(translated) => TranslationOutcome::Translated(translated),
            Err(e) => {
                tracing::warn!("Translation to {} failed: {:#}", target, e);
                TranslationOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}

impl Translator for HttpTranslator {
    fn to_english(&self, text: &str, source_lang: &str) -> TranslationOutcome {
        if !worth_translating(text) || is_english(source_lang) {
            return TranslationOutcome::Unchanged;
        }
        self.translate(text, "en")
    }

    fn to_target(&self, text: &str, target_lang: &str) -> TranslationOutcome {
        if !worth_translating(text) || is_english(target_lang) {
            return TranslationOutcome::Unchanged;
        }
        self.translate(text, target_lang)
    }

    fn name(&self) -> &str {
        "http"
    }
}
