use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{DetectorError, Result},
    explain::{explain, TermImportance},
    external::{analyze_or_unavailable, ExternalAnalyzer},
    fusion::{fuse, VerdictSource},
    prediction::PredictionResult,
    store::ModelStore,
    text::normalize,
};

/// What a caller hands in: typed text, text scraped from a URL, or both.
/// Scraped content wins when both are present; blank content counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionInput {
    pub text: Option<String>,
    pub scraped: Option<String>,
}

impl DetectionInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), scraped: None }
    }

    pub fn scraped(content: impl Into<String>) -> Self {
        Self { text: None, scraped: Some(content.into()) }
    }

    fn content(&self) -> Option<&str> {
        [&self.scraped, &self.text]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }
}

/// Everything produced for one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub verdict: PredictionResult,
    pub source: VerdictSource,
    pub local: PredictionResult,
    pub external: Option<PredictionResult>,
    pub explanation: Vec<TermImportance>,
    /// e.g. "Fake news with 87.0% confidence"
    pub summary: String,
}

/// Inference entry point: local model, optional external analyzer, fusion.
pub struct Detector {
    store: Arc<ModelStore>,
    analyzer: Option<Box<dyn ExternalAnalyzer>>,
}

impl Detector {
    pub fn new(store: Arc<ModelStore>, analyzer: Option<Box<dyn ExternalAnalyzer>>) -> Self {
        Self { store, analyzer }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn has_external(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Local verdict only.
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        let pair = self.store.snapshot()?;
        Ok(pair.predict(&normalize(text)))
    }

    /// Top terms of `text` by learned importance.
    pub fn explain(&self, text: &str) -> Result<Vec<TermImportance>> {
        let pair = self.store.snapshot()?;
        Ok(explain(&pair, &normalize(text)))
    }

    /// Full pipeline.
    ///
    /// The local verdict is computed first and never depends on the
    /// external call; a failing analyzer only means fusion sees `None`.
    pub fn detect(&self, input: &DetectionInput) -> Result<Detection> {
        let content = input.content().ok_or(DetectorError::InferenceInputEmpty)?;
        let pair = self.store.snapshot()?;

        let doc = normalize(content);
        let local = pair.predict(&doc);
        let explanation = explain(&pair, &doc);
        debug!(tokens = doc.len(), local = %local, "local verdict");

        let external = self
            .analyzer
            .as_deref()
            .and_then(|analyzer| analyze_or_unavailable(analyzer, content));
        let (verdict, source) = fuse(local, external);

        Ok(Detection {
            verdict,
            source,
            local,
            external,
            explanation,
            summary: verdict.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::{DetectorConfig, TrainingParams}, store::pair::ModelPair};

    struct Fixed(PredictionResult);

    impl ExternalAnalyzer for Fixed {
        fn analyze(&self, _text: &str) -> Result<PredictionResult> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl ExternalAnalyzer for Broken {
        fn analyze(&self, _text: &str) -> Result<PredictionResult> {
            Err(DetectorError::ExternalService("malformed".to_string()))
        }
    }

    fn store() -> Arc<ModelStore> {
        let pair = ModelPair::fallback(&TrainingParams::FALLBACK).unwrap();
        Arc::new(ModelStore::with_pair(DetectorConfig::default(), pair))
    }

    #[test]
    fn empty_input_is_the_only_caller_error() {
        let detector = Detector::new(store(), None);
        assert!(matches!(
            detector.detect(&DetectionInput::default()),
            Err(DetectorError::InferenceInputEmpty)
        ));
        assert!(matches!(
            detector.detect(&DetectionInput { text: Some("  ".into()), scraped: Some("\n".into()) }),
            Err(DetectorError::InferenceInputEmpty)
        ));
        // stopword-only text is not empty input
        assert!(detector.detect(&DetectionInput::text("the of and")).is_ok());
    }

    #[test]
    fn scraped_content_is_used_without_text() {
        let detector = Detector::new(store(), None);
        let scraped = detector.detect(&DetectionInput::scraped("government conspiracy revealed")).unwrap();
        let typed = detector.detect(&DetectionInput::text("government conspiracy revealed")).unwrap();
        assert_eq!(scraped, typed);
    }

    #[test]
    fn scraped_content_takes_precedence_over_text() {
        let detector = Detector::new(store(), None);
        let both = DetectionInput {
            text: Some("researchers confirmed the official study".into()),
            scraped: Some("government conspiracy revealed".into()),
        };
        let scraped = detector.detect(&DetectionInput::scraped("government conspiracy revealed")).unwrap();
        assert_eq!(detector.detect(&both).unwrap(), scraped);

        let blank_scrape = DetectionInput { scraped: Some(" \n".into()), ..both };
        let typed = detector.detect(&DetectionInput::text("researchers confirmed the official study")).unwrap();
        assert_eq!(detector.detect(&blank_scrape).unwrap(), typed);
    }

    #[test]
    fn broken_analyzer_falls_back_to_local() {
        let detector = Detector::new(store(), Some(Box::new(Broken)));
        let d = detector.detect(&DetectionInput::text("miracle cure revealed")).unwrap();
        assert_eq!(d.external, None);
        assert_eq!(d.source, VerdictSource::Local);
        assert_eq!(d.verdict, d.local);
    }

    #[test]
    fn certain_external_verdict_wins() {
        let external = PredictionResult::new(false, 1.0);
        let detector = Detector::new(store(), Some(Box::new(Fixed(external))));
        let d = detector.detect(&DetectionInput::text("shocking secret they hide")).unwrap();
        assert_eq!(d.external, Some(external));
        if d.local.confidence < 1.0 {
            assert_eq!(d.verdict, external);
            assert_eq!(d.source, VerdictSource::External);
        }
        assert_eq!(d.summary, d.verdict.to_string());
    }

    #[test]
    fn failed_store_reports_unavailable() {
        let root = tempfile::tempdir().unwrap();
        let config = DetectorConfig {
            model_dir: root.path().join("models"),
            data_dir: root.path().join("data"),
            fallback: TrainingParams { n_estimators: 0, ..TrainingParams::FALLBACK },
            ..DetectorConfig::default()
        };
        let (store, outcome) = ModelStore::initialize(config);
        assert_eq!(outcome, crate::store::InitOutcome::Failed);

        let detector = Detector::new(Arc::new(store), None);
        assert!(matches!(
            detector.predict("anything"),
            Err(DetectorError::ResourceUnavailable { .. })
        ));
    }
}
