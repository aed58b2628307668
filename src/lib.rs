/// This crate is a fake-news classification engine built on a TF-IDF Vectorizer
/// and a random forest.
pub mod config;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod explain;
pub mod external;
pub mod forest;
pub mod fusion;
pub mod prediction;
pub mod store;
pub mod text;
pub mod utils;
pub mod vectorizer;

/// Detector
/// The top-level entry point of this crate.
/// It takes raw or scraped text and returns a verdict, the local and external
/// verdicts it was chosen from, and the terms that weighed most.
///
/// Internally, it holds:
/// - A shared `ModelStore` with the current vectorizer/forest pair
/// - An optional `ExternalAnalyzer` for a second opinion
///
/// The local prediction is always computed first. The external analyzer is
/// consulted afterwards and any failure there is treated as "no opinion".
pub use detector::{Detection, DetectionInput, Detector};

/// Model Store
/// Owns the process-wide (vectorizer, forest) pair.
///
/// Initialization tries, in order:
/// - Loading the persisted pair
/// - Training from the labelled corpus and persisting it
/// - Building the tiny synthetic fallback model
///
/// The outcome is reported as `InitOutcome`. After that the pair is read-only;
/// `retrain` builds a new pair and swaps it in atomically.
///
/// # Thread Safety
/// Readers take an `Arc<ModelPair>` snapshot, so in-flight predictions keep
/// the pair they started with across a swap.
pub use store::{pair::ModelPair, InitOutcome, ModelStore};

/// TF-IDF Vectorizer
/// Learns a capped, frozen vocabulary and smoothed IDF weights at fit time,
/// then turns normalized documents into L2-normalised sparse vectors.
///
/// `TFIDFVectorizer<N, E>` has the following generic parameters:
/// - `N`: Vector parameter type (f32 or f64)
/// - `E`: TF-IDF calculation engine type (e.g., DefaultTFIDFEngine)
///
/// Tokens that were not seen at fit time contribute nothing to a transform.
///
/// # Serialization
/// Supported. The persisted model pair stores it next to the forest.
pub use vectorizer::TFIDFVectorizer;

/// Sparse feature vector produced by `TFIDFVectorizer<f32>`.
pub use vectorizer::FeatureVector;

/// Corpus for TF-IDF Vectorizer
/// Collects document counts, per-token document frequency and total term
/// counts while fitting. Vocabulary selection and IDF are computed from it.
///
/// # Thread Safety
/// This struct is thread-safe and can be accessed concurrently from multiple threads.
/// Implemented using DashMap and atomics.
pub use vectorizer::corpus::Corpus;

/// Token Frequency structure
/// Occurrence counts of each token within one document.
/// Used as base data for TF (Term Frequency) calculation.
pub use vectorizer::token::TokenFrequency;

/// TF IDF Calculation Engine Trait
/// A trait that defines the behavior of a TF-IDF calculation engine.
///
/// By implementing this trait, you can plug different TF-IDF calculation strategies
/// into `TFIDFVectorizer<N, E>`.
/// The default implementation, `DefaultTFIDFEngine`, uses raw counts, a
/// smoothed IDF and L2 normalisation, for f32 and f64.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Random Forest
/// Bootstrap-aggregated CART trees over TF-IDF features, fitted in parallel
/// and reproducible for a fixed seed. Exposes class probabilities and
/// mean-decrease-in-impurity feature importances.
pub use forest::RandomForest;

/// Normalized document and the normalizer that produces it.
pub use text::{normalize, NormalizedDocument};

/// Verdict type shared by the local model, the external analyzer and fusion.
pub use prediction::PredictionResult;

pub use config::{DetectorConfig, ExternalConfig, TrainingParams};
pub use error::{DetectorError, Result};
pub use explain::TermImportance;
pub use external::{ExternalAnalyzer, OpenAiAnalyzer};
pub use fusion::VerdictSource;
