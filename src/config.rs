use std::{env, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Hyperparameters for one training pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// vocabulary cap
    pub max_features: usize,
    /// number of trees in the forest
    pub n_estimators: usize,
    pub seed: u64,
}

impl TrainingParams {
    /// Parameters for the model trained from the labelled corpus.
    pub const FULL: TrainingParams = TrainingParams {
        max_features: 5000,
        n_estimators: 100,
        seed: 42,
    };

    /// Parameters for the tiny synthetic model.
    pub const FALLBACK: TrainingParams = TrainingParams {
        max_features: 100,
        n_estimators: 10,
        seed: 42,
    };
}

/// File names of the three labelled sources, relative to `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusFiles {
    /// pre-labelled real news
    pub real: String,
    /// pre-labelled fake news
    pub fake: String,
    /// supplementary set carrying its own `label` column
    pub scraped: String,
}

impl Default for CorpusFiles {
    fn default() -> Self {
        Self {
            real: "True.csv".to_string(),
            fake: "Fake.csv".to_string(),
            scraped: "scraped.csv".to_string(),
        }
    }
}

/// Settings for the optional language-model second opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// Absent or empty disables the external path.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Inputs longer than this are truncated before sending.
    pub max_chars: usize,
    pub timeout: Duration,
    pub temperature: f32,
}

impl ExternalConfig {
    /// The key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key().is_some()
    }
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            max_chars: 4000,
            timeout: Duration::from_secs(30),
            temperature: 0.1,
        }
    }
}

/// Top-level configuration of the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// where the vectorizer/model pair is persisted
    pub model_dir: PathBuf,
    /// where the training CSVs live
    pub data_dir: PathBuf,
    pub corpus: CorpusFiles,
    pub training: TrainingParams,
    pub fallback: TrainingParams,
    pub external: ExternalConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("ml_models"),
            data_dir: PathBuf::from("attached_assets"),
            corpus: CorpusFiles::default(),
            training: TrainingParams::FULL,
            fallback: TrainingParams::FALLBACK,
            external: ExternalConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Defaults overridden by `FAKENEWS_MODEL_DIR`, `FAKENEWS_DATA_DIR`,
    /// `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var("FAKENEWS_MODEL_DIR") {
            config.model_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("FAKENEWS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.external.api_key = env::var("OPENAI_API_KEY").ok();
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config.external.model = model;
        }
        if let Ok(base) = env::var("OPENAI_BASE_URL") {
            config.external.endpoint = format!("{}/chat/completions", base.trim_end_matches('/'));
        }
        config
    }

    pub fn corpus_paths(&self) -> [PathBuf; 3] {
        [
            self.data_dir.join(&self.corpus.real),
            self.data_dir.join(&self.corpus.fake),
            self.data_dir.join(&self.corpus.scraped),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_disables_external_analysis() {
        let mut external = ExternalConfig::default();
        assert!(!external.is_enabled());

        external.api_key = Some("   ".to_string());
        assert!(!external.is_enabled());

        external.api_key = Some("sk-test".to_string());
        assert_eq!(external.api_key(), Some("sk-test"));
    }

    #[test]
    fn corpus_paths_are_rooted_at_data_dir() {
        let config = DetectorConfig {
            data_dir: PathBuf::from("/data"),
            ..DetectorConfig::default()
        };
        let [real, fake, scraped] = config.corpus_paths();
        assert_eq!(real, PathBuf::from("/data/True.csv"));
        assert_eq!(fake, PathBuf::from("/data/Fake.csv"));
        assert_eq!(scraped, PathBuf::from("/data/scraped.csv"));
    }
}
