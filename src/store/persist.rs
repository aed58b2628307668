use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{DetectorError, Result},
    forest::RandomForest,
    store::pair::ModelPair,
    vectorizer::TFIDFVectorizer,
};

pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.cbor";
pub const MODEL_FILE: &str = "fake_news_model.cbor";

#[derive(Serialize, Deserialize)]
struct VectorizerArtifact {
    pair_id: u64,
    vectorizer: TFIDFVectorizer,
}

#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    pair_id: u64,
    forest: RandomForest,
}

/// Paths of the two artifacts under `dir`.
pub fn artifact_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(VECTORIZER_FILE), dir.join(MODEL_FILE))
}

/// Write bytes to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Persist both halves of `pair` under `dir`, creating it if needed.
pub fn save(pair: &ModelPair, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let (vec_path, model_path) = artifact_paths(dir);

    let vectorizer = serde_cbor::to_vec(&VectorizerArtifact {
        pair_id: pair.pair_id(),
        vectorizer: pair.vectorizer().clone(),
    })?;
    let model = serde_cbor::to_vec(&ModelArtifact {
        pair_id: pair.pair_id(),
        forest: pair.forest().clone(),
    })?;
    write_atomic(&vec_path, &vectorizer)?;
    write_atomic(&model_path, &model)?;
    debug!(dir = %dir.display(), vectorizer_bytes = vectorizer.len(), model_bytes = model.len(), "artifacts written");
    Ok(())
}

/// Load a matched pair from `dir`.
///
/// Missing files, undecodable bytes and halves from different training
/// runs are all errors.
pub fn load(dir: &Path) -> Result<ModelPair> {
    let (vec_path, model_path) = artifact_paths(dir);
    for path in [&vec_path, &model_path] {
        if !path.is_file() {
            return Err(DetectorError::unavailable(path.display().to_string(), "not found"));
        }
    }

    let vectorizer: VectorizerArtifact = serde_cbor::from_slice(&fs::read(&vec_path)?)?;
    let model: ModelArtifact = serde_cbor::from_slice(&fs::read(&model_path)?)?;
    if vectorizer.pair_id != model.pair_id {
        return Err(DetectorError::unavailable(
            "persisted model",
            format!("pair id mismatch: {:x} vs {:x}", vectorizer.pair_id, model.pair_id),
        ));
    }
    ModelPair::from_parts(vectorizer.vectorizer, model.forest, model.pair_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TrainingParams, text::normalize};

    #[test]
    fn saved_pair_loads_back_identical() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("models").join("v1");
        let pair = ModelPair::fallback(&TrainingParams::FALLBACK).unwrap();

        save(&pair, &nested).unwrap();
        let loaded = load(&nested).unwrap();
        assert_eq!(loaded, pair);

        let doc = normalize("government conspiracy revealed");
        assert_eq!(loaded.predict(&doc), pair.predict(&doc));
    }

    #[test]
    fn missing_half_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pair = ModelPair::fallback(&TrainingParams::FALLBACK).unwrap();
        save(&pair, dir.path()).unwrap();
        fs::remove_file(dir.path().join(MODEL_FILE)).unwrap();
        assert!(matches!(load(dir.path()), Err(DetectorError::ResourceUnavailable { .. })));
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let small = ModelPair::fallback(&TrainingParams::FALLBACK).unwrap();
        let tiny = ModelPair::fallback(&TrainingParams { max_features: 5, ..TrainingParams::FALLBACK }).unwrap();
        save(&small, a.path()).unwrap();
        save(&tiny, b.path()).unwrap();

        fs::copy(b.path().join(MODEL_FILE), a.path().join(MODEL_FILE)).unwrap();
        assert!(load(a.path()).is_err());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VECTORIZER_FILE), b"not cbor at all").unwrap();
        fs::write(dir.path().join(MODEL_FILE), b"\xff\x00").unwrap();
        assert!(load(dir.path()).is_err());
    }
}
