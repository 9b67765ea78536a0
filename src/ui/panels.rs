use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::audio::AudioPlayer;
use crate::data::lookup::Resolution;
use crate::data::model::{AUDIO_ID_COLUMN, VocalizationDataset};
use crate::state::{AppState, FeatureKind, PanelState};
use crate::ui::plot;

pub const APP_TITLE: &str = "Welcome to Disgust Vocalizations Dashboard App";

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title strip.
pub fn top_bar(ui: &mut Ui, state: &AppState, player: Option<&AudioPlayer>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(APP_TITLE);
        ui.separator();
        ui.label(format!(
            "{} clips, {} numerical features",
            state.dataset.len(),
            state.dataset.numerical_features().len()
        ));

        if let Some(path) = &state.now_playing {
            if player.is_some_and(AudioPlayer::is_playing) {
                ui.separator();
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                ui.label(format!("Playing {name}"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// One dashboard column: filters, plot, playback
// ---------------------------------------------------------------------------

/// Render panel `idx` and apply whatever the user changed in it.
pub fn dashboard_panel(
    ui: &mut Ui,
    idx: usize,
    state: &mut AppState,
    player: Option<&AudioPlayer>,
) {
    let AppState {
        dataset,
        config,
        panels,
        status_message,
        now_playing,
    } = state;
    let Some(panel) = panels.get_mut(idx) else {
        return;
    };

    ui.push_id(panel.name, |ui: &mut Ui| {
        filter_controls(ui, panel, dataset);
        ui.add_space(4.0);

        if let Some(point) = plot::embedding_plot(ui, panel, dataset, config.click_radius_px) {
            panel.click(point, dataset, config);
        }

        ui.label("Please select a point (audio) above and press play button below to listen");

        let target = panel.playback_target(config);
        ui.horizontal(|ui: &mut Ui| {
            let play = ui.add_enabled(player.is_some(), egui::Button::new("▶ Play"));
            let play = if player.is_none() {
                play.on_disabled_hover_text("No audio output device")
            } else {
                play
            };
            if play.clicked() {
                if let Some(player) = player {
                    match player.play_file(&target.path) {
                        Ok(_) => {
                            *now_playing = Some(target.path.clone());
                            *status_message = None;
                        }
                        Err(e) => {
                            log::error!("Playback failed: {e}");
                            *status_message = Some(format!("Error: {e}"));
                        }
                    }
                }
            }
            if ui
                .add_enabled(player.is_some(), egui::Button::new("■ Stop"))
                .clicked()
            {
                if let Some(player) = player {
                    player.stop();
                }
            }

            let file_name = target
                .path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();
            ui.monospace(file_name);
            ui.weak(resolution_note(&panel.resolution));
        });

        ui.add_space(4.0);
        selection_details(ui, panel, dataset);
    });
}

/// Radio for the feature type next to the feature dropdown.
fn filter_controls(ui: &mut Ui, panel: &mut PanelState, dataset: &VocalizationDataset) {
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].label("Select feature type");
        let mut kind = panel.kind;
        for option in FeatureKind::ALL {
            cols[0].radio_value(&mut kind, option, option.label());
        }
        if kind != panel.kind {
            panel.set_feature_kind(kind, dataset);
        }

        cols[1].label("Select feature");
        let current = panel.active_feature().unwrap_or_default().to_string();
        let mut chosen = None;
        egui::ComboBox::from_id_salt(("feature", panel.kind.label()))
            .selected_text(&current)
            .width(cols[1].available_width())
            .height(320.0)
            .show_ui(&mut cols[1], |ui: &mut Ui| {
                for option in panel.feature_options(dataset) {
                    if ui.selectable_label(current == option, &option).clicked() {
                        chosen = Some(option);
                    }
                }
            });
        if let Some(feature) = chosen {
            if feature != current {
                panel.set_feature(feature, dataset);
            }
        }
    });
}

fn resolution_note(resolution: &Resolution) -> &'static str {
    match resolution {
        Resolution::NoSelection => "(default clip)",
        Resolution::Resolved { .. } => "(selected point)",
        Resolution::Ambiguous { .. } => "(first of several overlapping points)",
        Resolution::NoMatch { .. } => "(no clip at this point, default clip)",
        Resolution::FileMissing { .. } => "(clip file missing, default clip)",
    }
}

/// Categorical labels of the selected clip.
fn selection_details(ui: &mut Ui, panel: &PanelState, dataset: &VocalizationDataset) {
    let Some(row) = panel.resolution.row().and_then(|r| dataset.rows.get(r)) else {
        return;
    };

    let mut entries = vec![(AUDIO_ID_COLUMN.to_string(), row.audio_id.clone())];
    entries.extend(dataset.categorical_features().into_iter().map(|name| {
        let value = row
            .feature(name)
            .map(|v| v.to_string())
            .unwrap_or_default();
        (name.to_string(), value)
    }));

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(180.0))
        .column(Column::remainder())
        .body(|mut body| {
            for (name, value) in &entries {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(value);
                    });
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::lookup::ClickPoint;

    #[test]
    fn every_fallback_is_labelled_as_default() {
        let fallbacks = [
            Resolution::NoSelection,
            Resolution::NoMatch {
                point: ClickPoint { x: 5.0, y: 5.0 },
            },
            Resolution::FileMissing {
                audio_id: "x".into(),
                path: PathBuf::from("x.wav"),
            },
        ];
        for resolution in &fallbacks {
            assert!(resolution_note(resolution).contains("default clip"));
        }
        let hit = Resolution::Resolved {
            row: 0,
            audio_id: "a".into(),
            path: PathBuf::from("a.wav"),
        };
        assert!(!resolution_note(&hit).contains("default"));
    }
}
