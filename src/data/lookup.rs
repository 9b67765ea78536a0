use std::path::{Path, PathBuf};

use super::loader::clip_path;
use super::model::{Vocalization, VocalizationDataset};

// ---------------------------------------------------------------------------
// Click → row resolution
// ---------------------------------------------------------------------------

/// Exact embedding coordinates of a clicked point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

/// Outcome of mapping a click back to a dataset row.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing clicked yet.
    NoSelection,
    /// Exactly one row sits at the clicked point and its clip exists.
    Resolved {
        row: usize,
        audio_id: String,
        path: PathBuf,
    },
    /// Several rows share the clicked point; `row` is the first in file order.
    Ambiguous {
        row: usize,
        audio_id: String,
        path: PathBuf,
        matches: usize,
    },
    /// No row has these exact coordinates.
    NoMatch { point: ClickPoint },
    /// The row was found but `{AudioID}.wav` is not on disk.
    FileMissing { audio_id: String, path: PathBuf },
}

/// What the audio player should load, and whether it came from the lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackTarget {
    pub path: PathBuf,
    pub from_lookup: bool,
}

impl Resolution {
    /// The clip to play: the matched row's, or `default_clip` for anything else.
    pub fn playback_target(&self, default_clip: &Path) -> PlaybackTarget {
        match self {
            Resolution::Resolved { path, .. } | Resolution::Ambiguous { path, .. } => {
                PlaybackTarget {
                    path: path.clone(),
                    from_lookup: true,
                }
            }
            _ => PlaybackTarget {
                path: default_clip.to_path_buf(),
                from_lookup: false,
            },
        }
    }

    /// Row index of the matched clip, if any.
    pub fn row(&self) -> Option<usize> {
        match self {
            Resolution::Resolved { row, .. } | Resolution::Ambiguous { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// Emit the log line for this outcome. Every non-resolved case still plays
    /// the default clip, so the logs are the only place they differ.
    pub fn log(&self, panel: &str) {
        match self {
            Resolution::NoSelection => {
                log::debug!("[{panel}] no point selected, using default clip");
            }
            Resolution::Resolved { audio_id, .. } => {
                log::info!("[{panel}] selected {audio_id}");
            }
            Resolution::Ambiguous {
                audio_id, matches, ..
            } => {
                log::warn!(
                    "[{panel}] {matches} rows share the clicked coordinates, using first match {audio_id}"
                );
            }
            Resolution::NoMatch { point } => {
                log::warn!(
                    "[{panel}] no row at ({}, {}), falling back to default clip",
                    point.x,
                    point.y
                );
            }
            Resolution::FileMissing { audio_id, path } => {
                log::error!(
                    "[{panel}] clip for {audio_id} missing at {}, falling back to default clip",
                    path.display()
                );
            }
        }
    }
}

/// Map a selection to a row and its clip on disk.
///
/// Coordinates must match exactly. When several rows coincide, the first in
/// the dataset's file order wins.
pub fn resolve(
    dataset: &VocalizationDataset,
    selection: Option<ClickPoint>,
    audio_dir: &Path,
) -> Resolution {
    let Some(point) = selection else {
        return Resolution::NoSelection;
    };

    let mut matching = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.is_at(point.x, point.y));

    let Some((row, first)) = matching.next() else {
        return Resolution::NoMatch { point };
    };
    let matches = 1 + matching.count();

    let path = clip_path(audio_dir, &first.audio_id);
    if !path.is_file() {
        return Resolution::FileMissing {
            audio_id: first.audio_id.clone(),
            path,
        };
    }

    let audio_id = first.audio_id.clone();
    if matches > 1 {
        Resolution::Ambiguous {
            row,
            audio_id,
            path,
            matches,
        }
    } else {
        Resolution::Resolved {
            row,
            audio_id,
            path,
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer → point snapping
// ---------------------------------------------------------------------------

/// Find the row drawn closest to `pointer` (screen space), within `max_distance`
/// pixels, and return its exact embedding coordinates.
///
/// `to_screen` maps embedding coordinates to screen coordinates. Ties keep the
/// earliest row.
pub fn nearest_row<F>(
    rows: &[Vocalization],
    pointer: [f32; 2],
    to_screen: F,
    max_distance: f32,
) -> Option<(usize, ClickPoint)>
where
    F: Fn(f64, f64) -> [f32; 2],
{
    let max_sq = max_distance * max_distance;
    let mut best: Option<(usize, f32)> = None;

    for (idx, row) in rows.iter().enumerate() {
        let [sx, sy] = to_screen(row.umap_1, row.umap_2);
        let (dx, dy) = (sx - pointer[0], sy - pointer[1]);
        let dist_sq = dx * dx + dy * dy;
        if dist_sq.is_nan() || dist_sq > max_sq {
            continue;
        }
        if best.map_or(true, |(_, d)| dist_sq < d) {
            best = Some((idx, dist_sq));
        }
    }

    best.map(|(idx, _)| {
        let row = &rows[idx];
        (
            idx,
            ClickPoint {
                x: row.umap_1,
                y: row.umap_2,
            },
        )
    })
}

/// `AudioID` of the row at exactly `(x, y)`, for hover labels.
pub fn audio_id_at(dataset: &VocalizationDataset, x: f64, y: f64) -> Option<&str> {
    dataset
        .rows
        .iter()
        .find(|row| row.is_at(x, y))
        .map(|row| row.audio_id.as_str())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn row(id: &str, x: f64, y: f64) -> Vocalization {
        Vocalization {
            audio_id: id.to_string(),
            umap_1: x,
            umap_2: y,
            features: BTreeMap::new(),
        }
    }

    fn dataset(rows: Vec<Vocalization>) -> VocalizationDataset {
        VocalizationDataset::new(
            vec!["AudioID".into(), "umap_1".into(), "umap_2".into()],
            rows,
        )
    }

    fn audio_dir(ids: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for id in ids {
            std::fs::write(dir.path().join(format!("{id}.wav")), b"RIFF").unwrap();
        }
        dir
    }

    #[test]
    fn no_selection_plays_default_clip() {
        let ds = dataset(vec![row("a_ca_001_01", 1.0, 2.0)]);
        let dir = audio_dir(&["a_ca_001_01"]);
        let default_clip = dir.path().join("a_ca_001_01.wav");

        let resolution = resolve(&ds, None, dir.path());
        assert_eq!(resolution, Resolution::NoSelection);

        let target = resolution.playback_target(&default_clip);
        assert_eq!(target.path, default_clip);
        assert!(!target.from_lookup);
    }

    #[test]
    fn exact_click_and_miss_are_told_apart_by_lookup_flag() {
        let ds = dataset(vec![row("a_ca_001_01", 1.0, 2.0)]);
        let dir = audio_dir(&["a_ca_001_01"]);
        let default_clip = dir.path().join("a_ca_001_01.wav");

        let hit = resolve(&ds, Some(ClickPoint { x: 1.0, y: 2.0 }), dir.path());
        assert_eq!(
            hit,
            Resolution::Resolved {
                row: 0,
                audio_id: "a_ca_001_01".into(),
                path: dir.path().join("a_ca_001_01.wav"),
            }
        );
        let hit_target = hit.playback_target(&default_clip);
        assert!(hit_target.from_lookup);

        let point = ClickPoint { x: 5.0, y: 5.0 };
        let miss = resolve(&ds, Some(point), dir.path());
        assert_eq!(miss, Resolution::NoMatch { point });
        let miss_target = miss.playback_target(&default_clip);
        assert!(!miss_target.from_lookup);

        // Same file either way; only the flag differs.
        assert_eq!(hit_target.path, miss_target.path);
    }

    #[test]
    fn coincident_rows_resolve_to_first_in_file_order() {
        let ds = dataset(vec![
            row("other", 0.0, 0.0),
            row("first", 3.0, 3.0),
            row("second", 3.0, 3.0),
        ]);
        let dir = audio_dir(&["other", "first", "second"]);

        let resolution = resolve(&ds, Some(ClickPoint { x: 3.0, y: 3.0 }), dir.path());
        assert_eq!(
            resolution,
            Resolution::Ambiguous {
                row: 1,
                audio_id: "first".into(),
                path: dir.path().join("first.wav"),
                matches: 2,
            }
        );
        let target = resolution.playback_target(Path::new("default.wav"));
        assert_eq!(target.path, dir.path().join("first.wav"));
        assert!(target.from_lookup);
    }

    #[test]
    fn missing_clip_falls_back_to_default() {
        let ds = dataset(vec![row("lost", 1.0, 1.0)]);
        let dir = audio_dir(&[]);

        let resolution = resolve(&ds, Some(ClickPoint { x: 1.0, y: 1.0 }), dir.path());
        assert!(matches!(
            &resolution,
            Resolution::FileMissing { audio_id, .. } if audio_id == "lost"
        ));
        assert_eq!(resolution.row(), None);

        let target = resolution.playback_target(Path::new("default.wav"));
        assert_eq!(target.path, PathBuf::from("default.wav"));
        assert!(!target.from_lookup);
    }

    #[test]
    fn nearby_but_inexact_click_does_not_match() {
        let ds = dataset(vec![row("a", 1.0, 2.0)]);
        let dir = audio_dir(&["a"]);
        let resolution = resolve(
            &ds,
            Some(ClickPoint {
                x: 1.0 + 1e-9,
                y: 2.0,
            }),
            dir.path(),
        );
        assert!(matches!(resolution, Resolution::NoMatch { .. }));
    }

    #[test]
    fn nearest_row_snaps_to_exact_coordinates() {
        let rows = vec![row("a", 0.0, 0.0), row("b", 1.0, 1.0), row("c", 2.0, 2.0)];
        let to_screen = |x: f64, y: f64| [(x * 100.0) as f32, (y * 100.0) as f32];

        let (idx, point) = nearest_row(&rows, [103.0, 96.0], to_screen, 8.0).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(point, ClickPoint { x: 1.0, y: 1.0 });

        assert!(nearest_row(&rows, [50.0, 50.0], to_screen, 8.0).is_none());
    }

    #[test]
    fn nearest_row_keeps_earliest_on_ties() {
        let rows = vec![row("first", 1.0, 1.0), row("second", 1.0, 1.0)];
        let to_screen = |x: f64, y: f64| [x as f32, y as f32];
        let (idx, _) = nearest_row(&rows, [1.0, 1.0], to_screen, 1.0).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn nearest_row_skips_non_finite_rows() {
        let rows = vec![row("bad", f64::NAN, f64::NAN), row("good", 1.0, 2.0)];
        let to_screen = |x: f64, y: f64| [(x * 100.0) as f32, (y * 100.0) as f32];

        let (idx, point) = nearest_row(&rows, [100.0, 200.0], to_screen, 8.0).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(point, ClickPoint { x: 1.0, y: 2.0 });

        let far = [row("inf", f64::INFINITY, 0.0)];
        assert!(nearest_row(&far, [0.0, 0.0], to_screen, 8.0).is_none());
    }

    #[test]
    fn audio_id_at_finds_hovered_row() {
        let ds = dataset(vec![row("a", 1.0, 2.0), row("b", 3.0, 4.0)]);
        assert_eq!(audio_id_at(&ds, 3.0, 4.0), Some("b"));
        assert_eq!(audio_id_at(&ds, 0.0, 0.0), None);
    }
}
