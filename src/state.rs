use std::path::PathBuf;
use std::sync::Arc;

use crate::color::ColorScale;
use crate::config::DashboardConfig;
use crate::data::lookup::{ClickPoint, PlaybackTarget, Resolution, resolve};
use crate::data::model::VocalizationDataset;

// ---------------------------------------------------------------------------
// Per-panel state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Categorical,
    Numerical,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 2] = [FeatureKind::Categorical, FeatureKind::Numerical];

    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::Categorical => "Categorical",
            FeatureKind::Numerical => "Numerical",
        }
    }
}

/// One filter + scatter-plot panel. The two panels never share state.
#[derive(Debug, Clone)]
pub struct PanelState {
    /// Name used in log lines and widget ids.
    pub name: &'static str,
    pub kind: FeatureKind,
    /// Remembered per kind so toggling the radio restores the last choice.
    pub categorical_feature: Option<String>,
    pub numerical_feature: Option<String>,
    pub color_scale: Option<ColorScale>,
    pub selection: Option<ClickPoint>,
    pub resolution: Resolution,
}

impl PanelState {
    pub fn new(name: &'static str, kind: FeatureKind, dataset: &VocalizationDataset) -> Self {
        let mut panel = Self {
            name,
            kind,
            categorical_feature: dataset
                .categorical_features()
                .first()
                .map(|s| s.to_string()),
            numerical_feature: dataset.numerical_features().first().cloned(),
            color_scale: None,
            selection: None,
            resolution: Resolution::NoSelection,
        };
        panel.rebuild_color_scale(dataset);
        panel
    }

    /// The feature currently used for colouring.
    pub fn active_feature(&self) -> Option<&str> {
        match self.kind {
            FeatureKind::Categorical => self.categorical_feature.as_deref(),
            FeatureKind::Numerical => self.numerical_feature.as_deref(),
        }
    }

    /// Feature names offered for the current kind.
    pub fn feature_options(&self, dataset: &VocalizationDataset) -> Vec<String> {
        match self.kind {
            FeatureKind::Categorical => dataset
                .categorical_features()
                .into_iter()
                .map(str::to_string)
                .collect(),
            FeatureKind::Numerical => dataset.numerical_features().to_vec(),
        }
    }

    fn rebuild_color_scale(&mut self, dataset: &VocalizationDataset) {
        self.color_scale = self.active_feature().map(|col| match self.kind {
            FeatureKind::Categorical => ColorScale::categorical(dataset, col),
            FeatureKind::Numerical => ColorScale::continuous(dataset, col),
        });
    }

    /// Radio change. The chart is rebuilt for the new kind and the click
    /// selection is cleared.
    pub fn set_feature_kind(&mut self, kind: FeatureKind, dataset: &VocalizationDataset) {
        if self.kind == kind {
            return;
        }
        self.kind = kind;
        self.rebuild_color_scale(dataset);
        self.selection = None;
        self.resolution = Resolution::NoSelection;
        log::debug!("[{}] feature type -> {}", self.name, kind.label());
    }

    /// Dropdown change. Only colours change; the selection is kept.
    pub fn set_feature(&mut self, feature: String, dataset: &VocalizationDataset) {
        log::debug!("[{}] colour by {feature}", self.name);
        match self.kind {
            FeatureKind::Categorical => self.categorical_feature = Some(feature),
            FeatureKind::Numerical => self.numerical_feature = Some(feature),
        }
        self.rebuild_color_scale(dataset);
    }

    /// Plot click on a point with exact coordinates `point`.
    pub fn click(&mut self, point: ClickPoint, dataset: &VocalizationDataset, config: &DashboardConfig) {
        self.selection = Some(point);
        self.resolution = resolve(dataset, self.selection, &config.audio_dir);
        self.resolution.log(self.name);
    }

    pub fn playback_target(&self, config: &DashboardConfig) -> PlaybackTarget {
        self.resolution.playback_target(&config.default_clip())
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup and never mutated.
    pub dataset: Arc<VocalizationDataset>,
    pub config: DashboardConfig,
    pub panels: [PanelState; 2],
    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
    /// Clip most recently sent to the audio player.
    pub now_playing: Option<PathBuf>,
}

impl AppState {
    pub fn new(dataset: Arc<VocalizationDataset>, config: DashboardConfig) -> Self {
        let panels = [
            PanelState::new("left", FeatureKind::Categorical, &dataset),
            PanelState::new("right", FeatureKind::Numerical, &dataset),
        ];
        Self {
            dataset,
            config,
            panels,
            status_message: None,
            now_playing: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::{MetadataValue, Vocalization};

    fn dataset() -> VocalizationDataset {
        let mut columns: Vec<String> = vec![
            "AudioID".into(),
            "umap_1".into(),
            "umap_2".into(),
            "Disgust category".into(),
            "Gender".into(),
        ];
        while columns.len() < 22 {
            columns.push(format!("meta_{}", columns.len()));
        }
        columns.push("loudness_mean".into());
        columns.push("pitch_mean".into());

        let rows = [("a_ca_001_01", 1.0, 2.0, "core"), ("a_mo_002_01", 3.0, 4.0, "moral")]
            .into_iter()
            .enumerate()
            .map(|(i, (id, x, y, cat))| {
                let mut features = BTreeMap::new();
                features.insert(
                    "Disgust category".to_string(),
                    MetadataValue::String(cat.into()),
                );
                features.insert("loudness_mean".to_string(), MetadataValue::Float(i as f64));
                features.insert("pitch_mean".to_string(), MetadataValue::Float(100.0 + i as f64));
                Vocalization {
                    audio_id: id.into(),
                    umap_1: x,
                    umap_2: y,
                    features,
                }
            })
            .collect();
        VocalizationDataset::new(columns, rows)
    }

    fn config(dir: &std::path::Path) -> DashboardConfig {
        for id in ["a_ca_001_01", "a_mo_002_01"] {
            std::fs::write(dir.join(format!("{id}.wav")), b"RIFF").unwrap();
        }
        DashboardConfig {
            audio_dir: dir.to_path_buf(),
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn panels_start_on_default_features() {
        let ds = Arc::new(dataset());
        let state = AppState::new(ds, DashboardConfig::default());

        let [left, right] = &state.panels;
        assert_eq!(left.kind, FeatureKind::Categorical);
        assert_eq!(left.active_feature(), Some("Disgust category"));
        assert!(matches!(left.color_scale, Some(ColorScale::Categorical(_))));

        assert_eq!(right.kind, FeatureKind::Numerical);
        assert_eq!(right.active_feature(), Some("loudness_mean"));
        assert!(matches!(right.color_scale, Some(ColorScale::Continuous(_))));
        assert_eq!(right.resolution, Resolution::NoSelection);
    }

    #[test]
    fn click_resolves_and_targets_row_clip() {
        let ds = dataset();
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let mut panel = PanelState::new("left", FeatureKind::Categorical, &ds);

        let before = panel.playback_target(&cfg);
        assert_eq!(before.path, cfg.default_clip());
        assert!(!before.from_lookup);

        panel.click(ClickPoint { x: 3.0, y: 4.0 }, &ds, &cfg);
        let target = panel.playback_target(&cfg);
        assert_eq!(target.path, dir.path().join("a_mo_002_01.wav"));
        assert!(target.from_lookup);
        assert_eq!(panel.resolution.row(), Some(1));
    }

    #[test]
    fn switching_kind_rebuilds_scale_and_resets_selection() {
        let ds = dataset();
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let mut panel = PanelState::new("left", FeatureKind::Categorical, &ds);
        panel.click(ClickPoint { x: 1.0, y: 2.0 }, &ds, &cfg);
        assert!(panel.selection.is_some());

        panel.set_feature_kind(FeatureKind::Numerical, &ds);

        assert!(matches!(panel.color_scale, Some(ColorScale::Continuous(_))));
        assert_eq!(panel.selection, None);
        assert_eq!(panel.resolution, Resolution::NoSelection);
        assert!(!panel.playback_target(&cfg).from_lookup);
    }

    #[test]
    fn switching_feature_keeps_selection_and_remembers_per_kind() {
        let ds = dataset();
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let mut panel = PanelState::new("right", FeatureKind::Numerical, &ds);
        panel.click(ClickPoint { x: 1.0, y: 2.0 }, &ds, &cfg);

        panel.set_feature("pitch_mean".into(), &ds);
        assert_eq!(panel.active_feature(), Some("pitch_mean"));
        assert_eq!(panel.resolution.row(), Some(0));
        match &panel.color_scale {
            Some(ColorScale::Continuous(scale)) => {
                assert_eq!((scale.min, scale.max), (100.0, 101.0));
            }
            other => panic!("unexpected scale {other:?}"),
        }

        panel.set_feature_kind(FeatureKind::Categorical, &ds);
        panel.set_feature_kind(FeatureKind::Numerical, &ds);
        assert_eq!(panel.active_feature(), Some("pitch_mean"));
    }

    #[test]
    fn panels_are_independent() {
        let ds = Arc::new(dataset());
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let mut state = AppState::new(Arc::clone(&ds), cfg.clone());

        state.panels[0].click(ClickPoint { x: 1.0, y: 2.0 }, &ds, &cfg);
        assert_eq!(state.panels[0].resolution.row(), Some(0));
        assert_eq!(state.panels[1].resolution, Resolution::NoSelection);
    }

    #[test]
    fn feature_options_follow_kind() {
        let ds = dataset();
        let mut panel = PanelState::new("left", FeatureKind::Categorical, &ds);
        assert_eq!(panel.feature_options(&ds), vec!["Disgust category", "Gender"]);
        panel.set_feature_kind(FeatureKind::Numerical, &ds);
        assert_eq!(panel.feature_options(&ds), vec!["loudness_mean", "pitch_mean"]);
    }
}
