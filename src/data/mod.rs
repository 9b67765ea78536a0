/// Data layer: core types, loading, and click resolution.
///
/// Architecture:
/// ```text
///   disgust_all.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → VocalizationDataset, check clips on disk
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────┐
///   │ VocalizationDataset │  Vec<Vocalization>, column catalogue
///   └─────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  lookup   │  clicked (x, y) → row → {AudioID}.wav
///   └──────────┘
/// ```

pub mod loader;
pub mod lookup;
pub mod model;
