use eframe::egui::{self, Color32, Stroke, Ui};
use egui_plot::{HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, Points, VLine};

use crate::chart::spec::{ChartSpec, SizeLegend};

/// Hover picks a point within this fraction of the data extent.
const HOVER_TOLERANCE: f64 = 0.03;

const PLOT_HEIGHT: f32 = 380.0;

// ---------------------------------------------------------------------------
// One scatter chart
// ---------------------------------------------------------------------------

/// Render a chart spec: per-type markers, dashed reference lines at 1.0,
/// optional trend line, and the size key below the plot.
pub fn chart_panel(ui: &mut Ui, index: usize, spec: &ChartSpec) {
    ui.heading(&spec.title);
    if spec.point_count() == 0 {
        ui.label("No blades match the current filters.");
    }

    let reference_color = Color32::GRAY.gamma_multiply(0.4);
    let hover_spec = spec.clone();

    Plot::new(format!("chart_{index}"))
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.x_label.clone())
        .y_axis_label(spec.y_label.clone())
        .include_x(spec.reference_x)
        .include_y(spec.reference_y)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .label_formatter(move |_name, value| {
            hover_spec
                .hover_near(value.x, value.y, HOVER_TOLERANCE)
                .map(str::to_string)
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.hline(
                HLine::new(spec.reference_y)
                    .color(reference_color)
                    .width(1.5)
                    .style(LineStyle::dashed_loose()),
            );
            plot_ui.vline(
                VLine::new(spec.reference_x)
                    .color(reference_color)
                    .width(1.5)
                    .style(LineStyle::dashed_loose()),
            );

            // egui_plot sizes markers per item, so every point is its own
            // item; equal names merge them into one legend entry.
            for series in &spec.series {
                for p in &series.points {
                    plot_ui.points(
                        Points::new(PlotPoints::new(vec![[p.x, p.y]]))
                            .shape(MarkerShape::Circle)
                            .filled(true)
                            .radius(p.diameter / 2.0)
                            .color(series.color)
                            .name(&series.name),
                    );
                }
            }

            if let Some(trend) = &spec.trend {
                plot_ui.line(
                    Line::new(PlotPoints::new(vec![trend.start, trend.end]))
                        .color(Color32::DARK_GRAY)
                        .width(2.0)
                        .name(format!(
                            "Trend (y = {:.2}x + {:.2})",
                            trend.fit.slope, trend.fit.intercept
                        )),
                );
            }
        });

    if let Some(legend) = &spec.size_legend {
        size_key(ui, index, legend);
    }
    ui.add_space(12.0);
}

/// Reference markers for the size dimension, collapsed until opened.
fn size_key(ui: &mut Ui, index: usize, legend: &SizeLegend) {
    egui::CollapsingHeader::new(format!("Marker size: {}", legend.title))
        .id_salt(("size_key", index))
        .default_open(!legend.hidden_by_default)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                for entry in &legend.entries {
                    let side = entry.diameter.max(1.0) + 4.0;
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
                    ui.painter().circle_stroke(
                        rect.center(),
                        entry.diameter / 2.0,
                        Stroke::new(1.0, Color32::BLACK),
                    );
                    ui.label(&entry.name);
                    ui.add_space(8.0);
                }
            });
        });
}
