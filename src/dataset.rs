//! Labelled training corpus: two pre-labelled collections plus a
//! supplementary set that carries its own labels.

use std::{fs::File, path::Path};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::{
    error::{DetectorError, Result},
    forest::{FAKE, REAL},
};

/// One labelled article. `label` is 1 for fake, 0 for real.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub text: String,
    pub label: u8,
}

/// Where a file's labels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// every row gets this label
    Fixed(u8),
    /// read the `label` column
    Column,
}

/// Columns located by header name.
struct Layout {
    title: Option<usize>,
    text: usize,
    label: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let text = find("text").ok_or_else(|| {
            DetectorError::unavailable(path.display().to_string(), "no `text` column")
        })?;
        Ok(Self {
            title: find("title"),
            text,
            label: find("label"),
        })
    }

    /// `title + ". " + text` when both are present, else whichever is.
    fn content(&self, record: &StringRecord) -> Option<String> {
        let text = record.get(self.text).map(str::trim).unwrap_or("");
        let title = self
            .title
            .and_then(|i| record.get(i))
            .map(str::trim)
            .unwrap_or("");
        let content = match (title.is_empty(), text.is_empty()) {
            (true, true) => return None,
            (true, false) => text.to_string(),
            (false, true) => title.to_string(),
            (false, false) => format!("{title}. {text}"),
        };
        Some(content)
    }
}

/// Parse a label cell: `0`/`1` (also `0.0`/`1.0`), or `real`/`fake`.
pub fn parse_label(cell: &str) -> Option<u8> {
    let cell = cell.trim();
    match cell.to_ascii_lowercase().as_str() {
        "fake" => return Some(FAKE),
        "real" => return Some(REAL),
        _ => {}
    }
    match cell.parse::<f64>().ok()? {
        v if v == 1.0 => Some(FAKE),
        v if v == 0.0 => Some(REAL),
        _ => None,
    }
}

/// Load one CSV file. Rows without content or with an unusable label are
/// skipped; a missing file or a missing `text` column is an error.
pub fn load_csv(path: &Path, labels: LabelSource) -> Result<Vec<Sample>> {
    let file = File::open(path)
        .map_err(|e| DetectorError::unavailable(path.display().to_string(), e.to_string()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let layout = Layout::from_headers(reader.headers()?, path)?;
    if labels == LabelSource::Column && layout.label.is_none() {
        return Err(DetectorError::unavailable(path.display().to_string(), "no `label` column"));
    }

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!(file = %path.display(), row = idx, error = %e, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        };
        let label = match labels {
            LabelSource::Fixed(label) => Some(label),
            LabelSource::Column => layout.label.and_then(|i| record.get(i)).and_then(parse_label),
        };
        match (layout.content(&record), label) {
            (Some(text), Some(label)) => samples.push(Sample { text, label }),
            _ => {
                debug!(file = %path.display(), row = idx, "skipping row without content or label");
                skipped += 1;
            }
        }
    }
    info!(file = %path.display(), rows = samples.len(), skipped, "loaded training file");
    Ok(samples)
}

/// Load and combine the three sources: real news (label 0), fake news
/// (label 1), and the supplementary set with its own `label` column.
///
/// Fails when any file is missing or the result does not contain both
/// classes.
pub fn load_corpus(real: &Path, fake: &Path, scraped: &Path) -> Result<Vec<Sample>> {
    let mut samples = load_csv(real, LabelSource::Fixed(REAL))?;
    samples.extend(load_csv(fake, LabelSource::Fixed(FAKE))?);
    samples.extend(load_csv(scraped, LabelSource::Column)?);

    let n_fake = samples.iter().filter(|s| s.label == FAKE).count();
    let n_real = samples.len() - n_fake;
    if n_fake == 0 || n_real == 0 {
        return Err(DetectorError::unavailable(
            "training corpus",
            format!("needs both classes, got {n_real} real and {n_fake} fake"),
        ));
    }
    info!(total = samples.len(), real = n_real, fake = n_fake, "training corpus assembled");
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn title_and_text_are_joined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("True.csv");
        fs::write(
            &path,
            "title,text,subject,date\n\
             Senate passes bill,The vote was 60 to 40.,politics,2017\n\
             ,Only body text here,news,2017\n\
             ,,empty,2017\n",
        )
        .unwrap();

        let samples = load_csv(&path, LabelSource::Fixed(REAL)).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].text, "Senate passes bill. The vote was 60 to 40.");
        assert_eq!(samples[1].text, "Only body text here");
        assert!(samples.iter().all(|s| s.label == REAL));
    }

    #[test]
    fn label_column_is_parsed_and_bad_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraped.csv");
        fs::write(&path, "text,label\nhoax story,1\nreal story,0\nodd story,maybe\nfloat story,1.0\n").unwrap();

        let samples = load_csv(&path, LabelSource::Column).unwrap();
        let labels: Vec<u8> = samples.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec![1, 0, 1]);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(&dir.path().join("nope.csv"), LabelSource::Fixed(FAKE)).unwrap_err();
        assert!(matches!(err, DetectorError::ResourceUnavailable { .. }));
    }

    #[test]
    fn single_class_corpus_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("True.csv");
        let fake = dir.path().join("Fake.csv");
        let scraped = dir.path().join("scraped.csv");
        fs::write(&real, "title,text\nA,real one\n").unwrap();
        fs::write(&fake, "title,text\n").unwrap();
        fs::write(&scraped, "text,label\nanother real,0\n").unwrap();

        assert!(load_corpus(&real, &fake, &scraped).is_err());

        fs::write(&scraped, "text,label\nmade up,1\n").unwrap();
        let corpus = load_corpus(&real, &fake, &scraped).unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn label_words_are_accepted() {
        assert_eq!(parse_label(" FAKE "), Some(FAKE));
        assert_eq!(parse_label("real"), Some(REAL));
        assert_eq!(parse_label("2"), None);
    }
}
