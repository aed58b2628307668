//! Process-wide model state.
//!
//! Initialization walks three tiers in order: load the persisted pair,
//! else train from the labelled corpus and persist, else build the
//! synthetic fallback and persist that. Once serving, the current pair is
//! only ever replaced whole by [`ModelStore::retrain`].

pub mod pair;
pub mod persist;

use std::{fmt, sync::Arc};

use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::{
    config::DetectorConfig,
    dataset::load_corpus,
    error::{DetectorError, Result},
    store::pair::ModelPair,
};

/// Which tier initialization ended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// persisted pair found and valid
    Loaded,
    /// trained from the labelled corpus
    Trained,
    /// corpus training failed; the synthetic model is in use
    FallbackUsed,
    /// not even the synthetic model could be built
    Failed,
}

impl fmt::Display for InitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InitOutcome::Loaded => "loaded persisted model",
            InitOutcome::Trained => "trained model from corpus",
            InitOutcome::FallbackUsed => "using fallback model",
            InitOutcome::Failed => "no model available",
        };
        f.write_str(s)
    }
}

/// Owner of the current [`ModelPair`].
///
/// Readers take an `Arc` snapshot and never hold the lock while
/// predicting, so a retrain swap cannot be observed half-done.
#[derive(Debug)]
pub struct ModelStore {
    config: DetectorConfig,
    current: RwLock<Option<Arc<ModelPair>>>,
}

impl ModelStore {
    /// Run the three-tier initialization. Never fails; the outcome says
    /// which tier produced the pair.
    pub fn initialize(config: DetectorConfig) -> (ModelStore, InitOutcome) {
        let (pair, outcome) = Self::bootstrap(&config);
        info!(outcome = %outcome, dir = %config.model_dir.display(), "model store initialized");
        let store = ModelStore {
            config,
            current: RwLock::new(pair.map(Arc::new)),
        };
        (store, outcome)
    }

    /// Wrap an already built pair, skipping initialization.
    pub fn with_pair(config: DetectorConfig, pair: ModelPair) -> Self {
        ModelStore {
            config,
            current: RwLock::new(Some(Arc::new(pair))),
        }
    }

    fn bootstrap(config: &DetectorConfig) -> (Option<ModelPair>, InitOutcome) {
        match persist::load(&config.model_dir) {
            Ok(pair) => return (Some(pair), InitOutcome::Loaded),
            Err(e) => info!(error = %e, "no usable persisted model, training"),
        }

        match Self::train_from_corpus(config) {
            Ok(pair) => {
                Self::persist(&pair, config);
                return (Some(pair), InitOutcome::Trained);
            }
            Err(e) => warn!(error = %e, "training from corpus failed, building fallback model"),
        }

        match ModelPair::fallback(&config.fallback) {
            Ok(pair) => {
                Self::persist(&pair, config);
                (Some(pair), InitOutcome::FallbackUsed)
            }
            Err(e) => {
                error!(error = %e, "fallback model could not be built");
                (None, InitOutcome::Failed)
            }
        }
    }

    fn train_from_corpus(config: &DetectorConfig) -> Result<ModelPair> {
        let [real, fake, scraped] = config.corpus_paths();
        let samples = load_corpus(&real, &fake, &scraped)?;
        ModelPair::train_on_samples(&samples, &config.training)
    }

    /// A pair that fails to persist is still served from memory.
    fn persist(pair: &ModelPair, config: &DetectorConfig) {
        match persist::save(pair, &config.model_dir) {
            Ok(()) => info!(dir = %config.model_dir.display(), pair_id = pair.pair_id(), "model persisted"),
            Err(e) => warn!(error = %e, "could not persist model, keeping it in memory"),
        }
    }

    /// The current pair.
    pub fn snapshot(&self) -> Result<Arc<ModelPair>> {
        self.current
            .read()
            .clone()
            .ok_or_else(|| DetectorError::unavailable("model", "initialization failed"))
    }

    /// Train a new pair from the corpus, persist it, then swap it in.
    ///
    /// On failure the current pair stays in place and the error is
    /// returned to the caller.
    pub fn retrain(&self) -> Result<Arc<ModelPair>> {
        let pair = Arc::new(Self::train_from_corpus(&self.config)?);
        Self::persist(&pair, &self.config);
        *self.current.write() = Some(Arc::clone(&pair));
        info!(pair_id = pair.pair_id(), "model pair swapped");
        Ok(pair)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}
