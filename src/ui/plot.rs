use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui::{self, Color32, Rect, Sense, Ui, Vec2};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{ColorScale, GradientScale};
use crate::data::lookup::{ClickPoint, audio_id_at, nearest_row};
use crate::data::model::{MetadataValue, VocalizationDataset};
use crate::state::PanelState;

pub const PLOT_TITLE: &str = "2-D Acoustic Features Embeddings";

/// Number of colour bins used to draw a continuous feature.
const GRADIENT_BINS: usize = 32;

const POINT_RADIUS: f32 = 3.0;

// ---------------------------------------------------------------------------
// Embedding scatter plot
// ---------------------------------------------------------------------------

/// Render one panel's scatter plot. Returns the exact coordinates of the point
/// under a click, if the user clicked on (or near) one this frame.
pub fn embedding_plot(
    ui: &mut Ui,
    panel: &PanelState,
    dataset: &Arc<VocalizationDataset>,
    click_radius_px: f32,
) -> Option<ClickPoint> {
    ui.strong(PLOT_TITLE);

    let hover_dataset = Arc::clone(dataset);
    let series = point_series(panel, dataset);

    let plot_response = Plot::new(("embedding_plot", panel.name))
        .legend(Legend::default())
        .x_axis_label("umap_1")
        .y_axis_label("umap_2")
        .height((ui.available_height() - 160.0).max(240.0))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |name, value| hover_label(&hover_dataset, name, value))
        .show(ui, |plot_ui| {
            for (name, color, points) in series {
                let mut item = Points::new(PlotPoints::new(points))
                    .color(color)
                    .radius(POINT_RADIUS)
                    .filled(true)
                    .shape(MarkerShape::Circle);
                if let Some(name) = name {
                    item = item.name(name);
                }
                plot_ui.points(item);
            }

            if let Some(point) = panel.selection {
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[point.x, point.y]]))
                        .color(Color32::WHITE)
                        .radius(POINT_RADIUS * 2.5)
                        .filled(false)
                        .shape(MarkerShape::Circle),
                );
            }
        });

    // Categorical legends are drawn by the plot itself.
    if let Some(ColorScale::Continuous(scale)) = &panel.color_scale {
        gradient_legend(ui, scale);
    }

    if !plot_response.response.clicked() {
        return None;
    }
    let pointer = plot_response.response.interact_pointer_pos()?;
    let transform = plot_response.transform;
    let hit = nearest_row(
        &dataset.rows,
        [pointer.x, pointer.y],
        |x, y| {
            let pos = transform.position_from_point(&PlotPoint::new(x, y));
            [pos.x, pos.y]
        },
        click_radius_px,
    );
    if hit.is_none() {
        log::debug!("[{}] click on empty canvas ignored", panel.name);
    }
    hit.map(|(_, point)| point)
}

type Series = (Option<String>, Color32, Vec<[f64; 2]>);

/// Group rows into drawable series: one per category, or one per gradient bin.
fn point_series(panel: &PanelState, dataset: &VocalizationDataset) -> Vec<Series> {
    let Some(scale) = &panel.color_scale else {
        let all = dataset.rows.iter().map(|r| [r.umap_1, r.umap_2]).collect();
        return vec![(None, Color32::LIGHT_BLUE, all)];
    };

    match scale {
        ColorScale::Categorical(map) => {
            let mut groups: BTreeMap<MetadataValue, Vec<[f64; 2]>> = BTreeMap::new();
            for row in &dataset.rows {
                let value = row
                    .feature(&map.column)
                    .cloned()
                    .unwrap_or(MetadataValue::Null);
                groups.entry(value).or_default().push([row.umap_1, row.umap_2]);
            }
            let mut series: Vec<Series> = map
                .legend_entries()
                .into_iter()
                .filter_map(|(value, color)| {
                    let points = groups.remove(&value)?;
                    Some((Some(value.to_string()), color, points))
                })
                .collect();
            // Rows lacking the column entirely.
            series.extend(
                groups
                    .into_iter()
                    .map(|(value, points)| (Some(value.to_string()), map.color_for(&value), points)),
            );
            series
        }
        ColorScale::Continuous(gradient) => {
            let mut bins: Vec<Vec<[f64; 2]>> = vec![Vec::new(); GRADIENT_BINS];
            let mut missing = Vec::new();
            for row in &dataset.rows {
                match row.feature(&gradient.column).and_then(MetadataValue::as_f64) {
                    Some(v) if v.is_finite() => {
                        let t = gradient.normalize(v);
                        let bin = ((t * GRADIENT_BINS as f32) as usize).min(GRADIENT_BINS - 1);
                        bins[bin].push([row.umap_1, row.umap_2]);
                    }
                    _ => missing.push([row.umap_1, row.umap_2]),
                }
            }
            let mut series: Vec<Series> = bins
                .into_iter()
                .enumerate()
                .filter(|(_, points)| !points.is_empty())
                .map(|(i, points)| {
                    let t = (i as f32 + 0.5) / GRADIENT_BINS as f32;
                    (None, gradient.color_at(t), points)
                })
                .collect();
            if !missing.is_empty() {
                series.push((
                    Some("<missing>".to_string()),
                    gradient.color_for(&MetadataValue::Null),
                    missing,
                ));
            }
            series
        }
    }
}

fn hover_label(dataset: &VocalizationDataset, name: &str, value: &PlotPoint) -> String {
    match audio_id_at(dataset, value.x, value.y) {
        Some(audio_id) if name.is_empty() => {
            format!("{audio_id}\nx = {:.3}\ny = {:.3}", value.x, value.y)
        }
        Some(audio_id) => format!("{audio_id}\n{name}\nx = {:.3}\ny = {:.3}", value.x, value.y),
        None => format!("x = {:.3}\ny = {:.3}", value.x, value.y),
    }
}

// ---------------------------------------------------------------------------
// Colour legend for continuous features
// ---------------------------------------------------------------------------

fn gradient_legend(ui: &mut Ui, scale: &GradientScale) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{:.3}", scale.min));
        let (rect, _) = ui.allocate_exact_size(Vec2::new(200.0, 12.0), Sense::hover());
        let painter = ui.painter();
        let steps = 64;
        let width = rect.width() / steps as f32;
        for i in 0..steps {
            let t = i as f32 / (steps - 1) as f32;
            let left = rect.left() + i as f32 * width;
            let cell = Rect::from_min_max(
                egui::pos2(left, rect.top()),
                egui::pos2(left + width + 0.5, rect.bottom()),
            );
            painter.rect_filled(cell, 0.0, scale.color_at(t));
        }
        ui.label(format!("{:.3}", scale.max));
        ui.weak(&scale.column);
    });
}
