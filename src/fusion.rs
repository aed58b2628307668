use serde::{Deserialize, Serialize};

use crate::prediction::PredictionResult;

/// Which predictor supplied the final verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictSource {
    Local,
    External,
}

/// Pick the final verdict.
///
/// With no external result the local one is used unchanged. Otherwise the
/// whole pair comes from whichever source reports the higher confidence;
/// ties go to the local model. The two are never averaged.
///
/// ```
/// use fake_news_detector::{fusion::{fuse, VerdictSource}, PredictionResult};
///
/// let local = PredictionResult::new(true, 0.4);
/// let external = PredictionResult::new(false, 0.7);
/// assert_eq!(fuse(local, Some(external)), (external, VerdictSource::External));
/// ```
pub fn fuse(local: PredictionResult, external: Option<PredictionResult>) -> (PredictionResult, VerdictSource) {
    match external {
        Some(ext) if ext.confidence > local.confidence => (ext, VerdictSource::External),
        _ => (local, VerdictSource::Local),
    }
}
