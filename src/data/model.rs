use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column catalogue
// ---------------------------------------------------------------------------

pub const AUDIO_ID_COLUMN: &str = "AudioID";
pub const UMAP_X_COLUMN: &str = "umap_1";
pub const UMAP_Y_COLUMN: &str = "umap_2";

/// Labels offered under "Categorical", in menu order.
pub const CATEGORICAL_FEATURES: [&str; 8] = [
    "Disgust category",
    "Noise level",
    "Gender",
    "Age",
    "Linguistic group",
    "Confidence in disgust category",
    "Experience valence",
    "Intensity of expression",
];

/// Header positions holding the acoustic feature block (`start..end`).
pub const NUMERICAL_COLUMN_RANGE: std::ops::Range<usize> = 22..110;

// ---------------------------------------------------------------------------
// MetadataValue – a single cell of the CSV
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used as a `BTreeMap` / `BTreeSet` key downstream so it must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use MetadataValue::*;
        fn discriminant(v: &MetadataValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v:.4}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

impl MetadataValue {
    /// Interpret the value as an `f64` for gradient colouring.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Vocalization – one row of the CSV
// ---------------------------------------------------------------------------

/// A single audio clip and everything known about it.
#[derive(Debug, Clone)]
pub struct Vocalization {
    /// Stem of the clip file (`{audio_id}.wav`).
    pub audio_id: String,
    pub umap_1: f64,
    pub umap_2: f64,
    /// Every other column: column_name → value.
    pub features: BTreeMap<String, MetadataValue>,
}

impl Vocalization {
    pub fn feature(&self, column: &str) -> Option<&MetadataValue> {
        self.features.get(column)
    }

    /// Whether this row sits exactly at `(x, y)` in embedding space.
    pub fn is_at(&self, x: f64, y: f64) -> bool {
        self.umap_1 == x && self.umap_2 == y
    }
}

// ---------------------------------------------------------------------------
// VocalizationDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The parsed dataset. Never mutated after loading.
#[derive(Debug, Clone)]
pub struct VocalizationDataset {
    /// Rows in file order. Lookups rely on this order for tie-breaks.
    pub rows: Vec<Vocalization>,
    /// Every header, in file order.
    pub columns: Vec<String>,
    /// For each feature column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<MetadataValue>>,
}

impl VocalizationDataset {
    /// Build column indices from the loaded rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vocalization>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<MetadataValue>> = BTreeMap::new();
        for row in &rows {
            for (col, val) in &row.features {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        VocalizationDataset {
            rows,
            columns,
            unique_values,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Categorical labels that actually exist in this file.
    pub fn categorical_features(&self) -> Vec<&'static str> {
        CATEGORICAL_FEATURES
            .iter()
            .copied()
            .filter(|name| self.columns.iter().any(|c| c == name))
            .collect()
    }

    /// Acoustic feature columns, taken positionally from the header.
    pub fn numerical_features(&self) -> &[String] {
        let end = NUMERICAL_COLUMN_RANGE.end.min(self.columns.len());
        let start = NUMERICAL_COLUMN_RANGE.start.min(end);
        &self.columns[start..end]
    }

    /// Finite `(min, max)` of a numerical column, `None` if it has no numbers.
    pub fn numeric_range(&self, column: &str) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|row| row.feature(column)?.as_f64())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
