use std::time::Duration;

use eframe::egui;

use crate::audio::AudioPlayer;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    /// `None` when no output device could be opened.
    player: Option<AudioPlayer>,
}

impl DashboardApp {
    pub fn new(state: AppState, player: Option<AudioPlayer>) -> Self {
        Self { state, player }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let player = self.player.as_ref();

        // ---- Top panel: title and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state, player);
        });

        // ---- Central panel: two independent filter + plot columns ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(self.state.panels.len(), |cols| {
                for (idx, col) in cols.iter_mut().enumerate() {
                    panels::dashboard_panel(col, idx, &mut self.state, player);
                }
            });
        });

        // Keep the "Playing" indicator current until the clip ends.
        if player.is_some_and(AudioPlayer::is_playing) {
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }
}
