//! Text normalization: raw news text to an ordered token sequence.

pub mod lemmatizer;
pub mod stopwords;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use self::{lemmatizer::lemmatize, stopwords::is_stopword};

/// Ordered, lowercase, lemmatized, stopword-free tokens of one document.
///
/// Order and multiplicity are preserved; term-frequency weighting
/// downstream depends on both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    tokens: Vec<String>,
}

impl NormalizedDocument {
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    #[inline]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Distinct tokens in first-occurrence order.
    pub fn distinct(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.tokens
            .iter()
            .map(String::as_str)
            .filter(|tok| seen.insert(*tok))
            .collect()
    }

    /// Tokens joined back with single spaces.
    pub fn to_text(&self) -> String {
        self.tokens.join(" ")
    }
}

impl fmt::Display for NormalizedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Compiled cleanup patterns, built once per process.
struct Patterns {
    url: Regex,
    non_word: Regex,
    digits: Regex,
    spaces: Regex,
}

static PATTERNS: Lazy<Patterns> = Lazy::new(|| Patterns {
    url: Regex::new(r"https?://\S+|www\.\S+").expect("url pattern"),
    non_word: Regex::new(r"[^\w\s]").expect("non-word pattern"),
    digits: Regex::new(r"\d+").expect("digit pattern"),
    spaces: Regex::new(r"\s+").expect("whitespace pattern"),
});

/// Normalize raw text.
///
/// Lowercases, strips URLs, punctuation and digit runs, collapses
/// whitespace, splits on Unicode word boundaries, drops English stopwords
/// and lemmatizes what is left. Empty input yields an empty document.
pub fn normalize(text: &str) -> NormalizedDocument {
    if text.trim().is_empty() {
        return NormalizedDocument::default();
    }
    let p = &*PATTERNS;

    let lowered = text.to_lowercase();
    let cleaned = p.url.replace_all(&lowered, "");
    let cleaned = p.non_word.replace_all(&cleaned, "");
    let cleaned = p.digits.replace_all(&cleaned, "");
    let cleaned = p.spaces.replace_all(&cleaned, " ");

    let tokens = cleaned
        .trim()
        .unicode_words()
        .filter(|tok| !is_stopword(tok))
        .map(lemmatize)
        .collect();
    NormalizedDocument { tokens }
}

/// Normalize text that may be absent.
pub fn normalize_opt(text: Option<&str>) -> NormalizedDocument {
    text.map(normalize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_missing_input_yield_empty_document() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\t").is_empty());
        assert!(normalize_opt(None).is_empty());
    }

    #[test]
    fn strips_urls_punctuation_and_digits() {
        let doc = normalize("BREAKING!!! Visit https://example.com/x?y=1 or www.fake.org in 2024 now");
        assert_eq!(doc.to_text(), "breaking visit");
    }

    #[test]
    fn drops_stopwords_and_lemmatizes_in_order() {
        let doc = normalize("Researchers at the University found that the studies were flawed.");
        assert_eq!(
            doc.tokens(),
            &["researcher", "university", "found", "study", "flawed"]
        );
    }

    #[test]
    fn contractions_collapse_consistently() {
        let doc = normalize("They don't want you to know; the media won't tell you");
        assert_eq!(doc.to_text(), "dont want know medium wont tell");
    }

    #[test]
    fn duplicates_are_kept() {
        let doc = normalize("hoax hoax HOAX");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.distinct(), vec!["hoax"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Shocking news that the media won't tell you!",
            "According to recent scientific studies, researchers confirmed the glasses crises.",
            "Government conspiracy REVEALED at www.truth.example -- 100% proof!!!",
            "snake_case tokens survive, émigrés and naïve cafés too",
            "Women's rights",
            "the men's final",
            "children's hospital",
            "",
        ];
        for text in samples {
            let once = normalize(text);
            let twice = normalize(&once.to_text());
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn possessive_plurals_lemmatize_in_one_pass() {
        assert_eq!(normalize("Women's rights march").tokens(), &["woman", "right", "march"]);
        assert_eq!(normalize("the men's final").tokens(), &["man", "final"]);
        assert_eq!(normalize("children's hospital").tokens(), &["child", "hospital"]);
    }

    #[test]
    fn only_stopwords_and_punctuation_gives_nothing() {
        assert!(normalize("the, and... of? -- it's!").is_empty());
    }
}
