mod app;
mod audio;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;

use app::DashboardApp;
use audio::AudioPlayer;
use config::DashboardConfig;
use data::loader::{load_dataset, missing_audio};
use state::AppState;

/// How many missing clip ids to print in the startup warning.
const MISSING_SAMPLE: usize = 5;

fn main() -> Result<()> {
    env_logger::init();

    let cwd = std::env::current_dir().context("resolving working directory")?;
    let config = DashboardConfig::load(&cwd)?;

    let dataset = load_dataset(&config.data_path)
        .with_context(|| format!("loading dataset {}", config.data_path.display()))?;
    log::info!(
        "Loaded {} clips with {} columns from {}",
        dataset.len(),
        dataset.columns.len(),
        config.data_path.display()
    );

    check_audio(&dataset, &config);

    let player = match AudioPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            log::warn!("Audio playback disabled: {e}");
            None
        }
    };

    let state = AppState::new(Arc::new(dataset), config.clone());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Disgust Vocalizations Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(state, player)))),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}

/// Report rows without a clip on disk. Never fatal: the UI falls back to the
/// default clip for those rows.
fn check_audio(dataset: &data::model::VocalizationDataset, config: &DashboardConfig) {
    let default_clip = config.default_clip();
    if !default_clip.is_file() {
        log::error!("Default clip {} does not exist", default_clip.display());
    }

    let missing = missing_audio(dataset, &config.audio_dir);
    if missing.is_empty() {
        log::debug!("All {} clips present in {}", dataset.len(), config.audio_dir.display());
        return;
    }
    let sample: Vec<&str> = missing.iter().take(MISSING_SAMPLE).map(String::as_str).collect();
    log::warn!(
        "{} of {} clips missing from {} (e.g. {})",
        missing.len(),
        dataset.len(),
        config.audio_dir.display(),
        sample.join(", ")
    );
}
