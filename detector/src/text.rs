// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Text normalization
//!
//! Two separate concerns live here:
//! - light normalization used by rule matching and word counting
//! - the heavier cleaner applied to training corpora before vectorization
//!
//! The rule matcher never sees cleaned text; the cleaner drops digits and
//! punctuation that several rule patterns depend on (e.g. "100% guaranteed").

use std::collections::HashSet;
use std::sync::OnceLock;

/// English stop words removed by the training cleaner and the vectorizer
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "around",
    "as", "at", "be", "became", "because", "become", "becomes", "been", "before", "beforehand",
    "behind", "being", "below", "beside", "besides", "between", "beyond", "both", "but", "by",
    "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "during", "each",
    "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every", "everyone",
    "everything", "everywhere", "except", "few", "for", "former", "formerly", "from", "further",
    "had", "has", "have", "having", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "ie", "if", "in", "indeed",
    "into", "is", "it", "its", "itself", "just", "last", "latter", "latterly", "least", "less",
    "many", "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly",
    "much", "must", "my", "myself", "namely", "neither", "never", "nevertheless", "next", "no",
    "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often",
    "on", "once", "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves",
    "out", "over", "own", "per", "perhaps", "please", "rather", "same", "seem", "seemed",
    "seeming", "seems", "several", "she", "should", "since", "so", "some", "somehow", "someone",
    "something", "sometime", "sometimes", "somewhere", "still", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "these", "they", "this", "those", "though", "through", "throughout",
    "thru", "thus", "to", "together", "too", "toward", "towards", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
}

/// Check whether a lower-cased token is an English stop word
pub fn is_stop_word(token: &str) -> bool {
    stop_words().contains(token)
}

/// Normalize text for rule matching: trimmed and lower-cased
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Clean text the way the training corpus is cleaned
///
/// Lower-cases, removes URLs, `@mentions`, `#hashtags`, digits and ASCII
/// punctuation, then drops stop words. The result is a single-space
/// separated token string (possibly empty).
pub fn clean_for_training(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut kept = Vec::new();

    for raw in lower.split_whitespace() {
        // A URL runs to the next whitespace
        let raw = match raw.find("http") {
            Some(idx) => &raw[..idx],
            None => raw,
        };

        let word: String = strip_handles(raw)
            .chars()
            .filter(|c| !c.is_numeric() && !c.is_ascii_punctuation())
            .collect();

        if word.is_empty() || is_stop_word(&word) {
            continue;
        }
        kept.push(word);
    }

    kept.join(" ")
}

/// Drop `@name` and `#tag` runs from a token
fn strip_handles(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();

    while let Some(c) = chars.next() {
        if (c == '@' || c == '#') && chars.peek().is_some_and(|n| is_word_char(*n)) {
            while chars.peek().is_some_and(|n| is_word_char(*n)) {
                chars.next();
            }
            continue;
        }
        out.push(c);
    }

    out
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
