use std::io;

/// Errors raised by the detection pipeline.
///
/// Only `InferenceInputEmpty` is meant to reach an end user. Everything
/// else is absorbed by the model store (next fallback tier) or by fusion
/// (external verdict treated as unavailable).
#[derive(thiserror::Error, Debug)]
pub enum DetectorError {
    /// A credential or path is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Training corpus or persisted artifact missing or corrupt.
    #[error("{resource} unavailable: {reason}")]
    ResourceUnavailable {
        resource: String,
        reason: String,
    },

    /// Neither text nor scraped content was supplied.
    #[error("no text supplied for analysis")]
    InferenceInputEmpty,

    /// External analyzer failed, timed out or answered garbage.
    #[error("external analysis failed: {0}")]
    ExternalService(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Cbor(#[from] serde_cbor::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl DetectorError {
    pub(crate) fn unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        DetectorError::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for `std::result::Result<T, DetectorError>`.
pub type Result<T> = std::result::Result<T, DetectorError>;
