use std::fmt;

use serde::{Deserialize, Serialize};

/// One verdict: fake or real, with the probability of that verdict.
///
/// `confidence` is the probability of the *chosen* label. For a real
/// verdict it is `P(real)`, never `P(fake)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub is_fake: bool,
    pub confidence: f64,
}

impl PredictionResult {
    pub fn new(is_fake: bool, confidence: f64) -> Self {
        Self { is_fake, confidence }
    }

    /// Apply the decision rule to `[p_real, p_fake]`.
    ///
    /// ```
    /// use fake_news_detector::PredictionResult;
    ///
    /// let real = PredictionResult::from_proba([0.8, 0.2]);
    /// assert!(!real.is_fake);
    /// assert_eq!(real.confidence, 0.8);
    /// ```
    pub fn from_proba(proba: [f64; 2]) -> Self {
        let [p_real, p_fake] = proba;
        let is_fake = p_fake > 0.5;
        Self {
            is_fake,
            confidence: if is_fake { p_fake } else { p_real },
        }
    }

    pub fn label(&self) -> &'static str {
        if self.is_fake {
            "Fake news"
        } else {
            "Real news"
        }
    }

    /// Confidence as a percentage.
    #[inline]
    pub fn percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {:.1}% confidence", self.label(), self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_follows_the_chosen_label() {
        let fake = PredictionResult::from_proba([0.3, 0.7]);
        assert!(fake.is_fake);
        assert_eq!(fake.confidence, 0.7);

        let real = PredictionResult::from_proba([0.6, 0.4]);
        assert!(!real.is_fake);
        assert_eq!(real.confidence, 0.6);
    }

    #[test]
    fn even_split_is_real() {
        let r = PredictionResult::from_proba([0.5, 0.5]);
        assert!(!r.is_fake);
        assert_eq!(r.confidence, 0.5);
    }

    #[test]
    fn display_summary() {
        assert_eq!(
            PredictionResult::new(true, 0.87).to_string(),
            "Fake news with 87.0% confidence"
        );
    }
}
