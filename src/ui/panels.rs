use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorAssignment;
use crate::data::filter::FilterSelection;
use crate::data::model::{Dimension, NumericRange};
use crate::data::source::DataSource;
use crate::state::AppState;

/// Slider granularity for the range controls.
const SLIDER_STEP: f64 = 0.01;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

enum MultiselectAction {
    Toggle(String),
    Clear,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match state.dataset() {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the closures.
    let bounds: Vec<(Dimension, Option<NumericRange>)> = FilterSelection::RANGE_DIMENSIONS
        .iter()
        .map(|&dim| (dim, dataset.range_of(dim)))
        .collect();
    let brands = dataset.brands.clone();
    let types = dataset.types.clone();
    let type_colors = state
        .color_map
        .as_ref()
        .map(ColorAssignment::legend_entries)
        .unwrap_or_default();

    let mut ranges_changed = false;
    let mut brand_action = None;
    let mut type_action = None;
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (dim, bounds) in &bounds {
                let (Some(bounds), Some(range)) = (bounds, state.selection.range_mut(*dim)) else {
                    continue;
                };
                ranges_changed |= range_control(ui, dim.title(), range, *bounds);
                ui.add_space(6.0);
            }
            ui.separator();

            brand_action = multiselect(ui, "Brand", &brands, &state.selection.brands, |_| None);
            type_action = multiselect(ui, "Blade Type", &types, &state.selection.types, |t| {
                type_colors.iter().find(|(name, _)| name == t).map(|(_, c)| *c)
            });

            ui.separator();
            if ui.button("Reset filters").clicked() {
                reset = true;
            }
        });

    match (brand_action, type_action) {
        (Some(MultiselectAction::Toggle(brand)), _) => state.toggle_brand(&brand),
        (Some(MultiselectAction::Clear), _) => {
            state.selection.brands.clear();
            state.refresh();
        }
        (None, Some(MultiselectAction::Toggle(blade_type))) => state.toggle_type(&blade_type),
        (None, Some(MultiselectAction::Clear)) => {
            state.selection.types.clear();
            state.refresh();
        }
        (None, None) if reset => state.clear_filters(),
        (None, None) if ranges_changed => state.refresh(),
        (None, None) => {}
    }
}

/// A min and a max slider over the full data range. Returns whether the
/// selected range moved.
fn range_control(ui: &mut Ui, label: &str, range: &mut NumericRange, bounds: NumericRange) -> bool {
    let before = *range;
    ui.strong(label);
    ui.add(
        egui::Slider::new(&mut range.min, bounds.min..=bounds.max)
            .step_by(SLIDER_STEP)
            .text("min"),
    );
    ui.add(
        egui::Slider::new(&mut range.max, bounds.min..=bounds.max)
            .step_by(SLIDER_STEP)
            .text("max"),
    );
    snap_to_bounds(range, bounds);
    *range != before
}

/// Step rounding may leave a handle just inside the data range; pull it
/// back onto the bound so the extreme rows stay selected.
fn snap_to_bounds(range: &mut NumericRange, bounds: NumericRange) {
    if (range.min - bounds.min).abs() < SLIDER_STEP {
        range.min = bounds.min;
    }
    if (range.max - bounds.max).abs() < SLIDER_STEP {
        range.max = bounds.max;
    }
}

/// Checkbox list over `options`. Nothing ticked means "all".
fn multiselect(
    ui: &mut Ui,
    label: &str,
    options: &[String],
    selected: &BTreeSet<String>,
    color_of: impl Fn(&str) -> Option<Color32>,
) -> Option<MultiselectAction> {
    let header = if selected.is_empty() {
        format!("{label}  (all)")
    } else {
        format!("{label}  ({}/{})", selected.len(), options.len())
    };

    let mut action = None;
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(label)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                action = Some(MultiselectAction::Clear);
            }
            for option in options {
                let mut text = RichText::new(option);
                if let Some(c) = color_of(option) {
                    text = text.color(c);
                }
                let mut checked = selected.contains(option);
                if ui.checkbox(&mut checked, text).changed() {
                    action = Some(MultiselectAction::Toggle(option.clone()));
                }
            }
        });
    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.dataset() {
            ui.label(format!(
                "{} blades loaded, {} visible",
                ds.len(),
                state.visible.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open blade measurements")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.status_message = None;
        state.set_source(DataSource::LocalFile(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, init_selection};
    use crate::data::model::{BladeDataset, BladeRecord};

    fn run_range_control(range: &mut NumericRange, bounds: NumericRange) -> bool {
        let ctx = egui::Context::default();
        let mut changed = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = range_control(ui, "Ep", range, bounds);
            });
        });
        changed
    }

    #[test]
    fn idle_slider_keeps_full_range() {
        let ds = BladeDataset::from_records(vec![
            BladeRecord::new("Stiga", "Clipper", "7-Ply", 0.853, 1.0, 1.0, 1.0),
            BladeRecord::new("Butterfly", "Viscaria", "Carbon Outer", 1.457, 1.4, 0.8, 0.7),
        ]);
        let mut selection = init_selection(&ds);
        let bounds = NumericRange::new(0.853, 1.457);
        assert_eq!(selection.ep, bounds);

        let changed = run_range_control(&mut selection.ep, bounds);
        assert!(!changed);
        assert_eq!(selection.ep, bounds);
        assert_eq!(filtered_indices(&ds, &selection), vec![0, 1]);
    }

    #[test]
    fn handles_near_a_bound_snap_onto_it() {
        let bounds = NumericRange::new(0.853, 1.457);
        let mut range = NumericRange::new(0.86, 1.453);
        snap_to_bounds(&mut range, bounds);
        assert_eq!(range, bounds);

        let mut range = NumericRange::new(1.0, 1.2);
        snap_to_bounds(&mut range, bounds);
        assert_eq!(range, NumericRange::new(1.0, 1.2));
    }
}
