// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Context expansion for very short inputs
//!
//! Short fragments are reframed as a social media post before
//! vectorization, the framing most short texts in the training data carry.

use crate::text;

/// Prefix applied to short texts
pub const SOCIAL_POST_PREFIX: &str = "Social media post claims: ";

#[derive(Debug, Clone, Copy)]
pub struct ContextExpander {
    max_words: usize,
}

impl ContextExpander {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    pub fn needs_expansion(&self, text: &str) -> bool {
        text::word_count(text) <= self.max_words
    }

    /// Expand `text` if it is short, otherwise return it unchanged
    pub fn expand(&self, text: &str) -> String {
        if self.needs_expansion(text) {
            format!("{}{}", SOCIAL_POST_PREFIX, text)
        } else {
            text.to_string()
        }
    }
}
