use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{
    AUDIO_ID_COLUMN, MetadataValue, UMAP_X_COLUMN, UMAP_Y_COLUMN, Vocalization,
    VocalizationDataset,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("opening {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("reading CSV headers: {0}")]
    Headers(#[source] csv::Error),
    #[error("CSV missing '{0}' column")]
    MissingColumn(&'static str),
    #[error("CSV row {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("CSV row {row}, {column}: '{value}' is not a number")]
    BadCoordinate {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("CSV row {row}: empty AudioID")]
    EmptyAudioId { row: usize },
    #[error("{0} contains no rows")]
    Empty(PathBuf),
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load the vocalization table.
///
/// Layout: header row with column names, including at least `AudioID`,
/// `umap_1` and `umap_2`. Every other column becomes a typed feature.
pub fn load_dataset(path: &Path) -> Result<VocalizationDataset, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(LoadError::Headers)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    warn_duplicate_headers(&columns);

    let position = |name: &'static str| {
        columns
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let id_idx = position(AUDIO_ID_COLUMN)?;
    let x_idx = position(UMAP_X_COLUMN)?;
    let y_idx = position(UMAP_Y_COLUMN)?;

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|source| LoadError::Record {
            row: row_no,
            source,
        })?;

        let audio_id = record.get(id_idx).unwrap_or("").trim().to_string();
        if audio_id.is_empty() {
            return Err(LoadError::EmptyAudioId { row: row_no });
        }
        let umap_1 = parse_coordinate(record.get(x_idx), row_no, UMAP_X_COLUMN)?;
        let umap_2 = parse_coordinate(record.get(y_idx), row_no, UMAP_Y_COLUMN)?;

        let mut features = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if col_idx == id_idx || col_idx == x_idx || col_idx == y_idx {
                continue;
            }
            let Some(col_name) = columns.get(col_idx) else {
                continue;
            };
            features.insert(col_name.clone(), guess_metadata_type(value.trim()));
        }

        rows.push(Vocalization {
            audio_id,
            umap_1,
            umap_2,
            features,
        });
    }

    let dataset = VocalizationDataset::new(columns, rows);
    if dataset.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(dataset)
}

fn parse_coordinate(
    cell: Option<&str>,
    row: usize,
    column: &'static str,
) -> Result<f64, LoadError> {
    let raw = cell.unwrap_or("").trim();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LoadError::BadCoordinate {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}

/// Warn about header names that occur more than once. Later columns with the
/// same name overwrite earlier ones in each row's feature map.
fn warn_duplicate_headers(columns: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for name in columns {
        if !seen.insert(name.as_str()) {
            duplicates.insert(name.clone());
        }
    }
    for name in &duplicates {
        log::warn!("CSV header '{name}' appears more than once, the last column wins");
    }
    duplicates.into_iter().collect()
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    if s.is_empty() {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    if s == "true" || s == "false" {
        return MetadataValue::Bool(s == "true");
    }
    MetadataValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Integrity check
// ---------------------------------------------------------------------------

/// Path of the clip belonging to `audio_id`.
pub fn clip_path(audio_dir: &Path, audio_id: &str) -> PathBuf {
    audio_dir.join(format!("{audio_id}.wav"))
}

/// `AudioID`s whose `{AudioID}.wav` is absent from `audio_dir`, in row order.
pub fn missing_audio(dataset: &VocalizationDataset, audio_dir: &Path) -> Vec<String> {
    dataset
        .rows
        .iter()
        .filter(|row| !clip_path(audio_dir, &row.audio_id).is_file())
        .map(|row| row.audio_id.clone())
        .collect()
}
