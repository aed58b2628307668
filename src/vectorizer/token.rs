use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::text::NormalizedDocument;

/// Shortest token (in chars) the vectorizer counts as a word.
pub const MIN_TOKEN_CHARS: usize = 2;

///  TokenFrequency
/// Counts token occurrences within one document.
/// Base data for the TF part of TF-IDF.
///
/// # Examples
/// ```
/// use fake_news_detector::vectorizer::token::TokenFrequency;
/// let mut token_freq = TokenFrequency::new();
/// token_freq.add_token("hoax");
/// token_freq.add_token("cure");
/// token_freq.add_token("hoax");
///
/// assert_eq!(token_freq.token_count("hoax"), 2);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    token_count: IndexMap<String, u32>,
}

impl TokenFrequency {
    pub fn new() -> Self {
        TokenFrequency {
            token_count: IndexMap::new(),
        }
    }

    /// Count the word tokens of a normalized document.
    /// Tokens shorter than [`MIN_TOKEN_CHARS`] are not words and are skipped.
    pub fn from_document(doc: &NormalizedDocument) -> Self {
        let mut freq = Self::new();
        for token in doc.tokens() {
            if token.chars().count() >= MIN_TOKEN_CHARS {
                freq.add_token(token);
            }
        }
        freq
    }

    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        let count = self.token_count.entry(token.to_string()).or_insert(0);
        *count += 1;
        self
    }

    #[inline]
    pub fn add_tokens<T>(&mut self, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref());
        }
        self
    }
}

impl TokenFrequency {
    /// Occurrences of `token`; zero when absent.
    #[inline]
    pub fn token_count(&self, token: &str) -> u32 {
        *self.token_count.get(token).unwrap_or(&0)
    }

    /// `(token, count)` in first-seen order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.token_count.iter().map(|(tok, &count)| (tok.as_str(), count))
    }
}
