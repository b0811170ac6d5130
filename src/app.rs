use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot};

const ABOUT_URL: &str = "https://ttgearlab.com/about-ttgearlab/";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BladeLabApp {
    pub state: AppState,
}

impl BladeLabApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BladeLabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading("Blade Metrics Overview");
                    ui.horizontal_wrapped(|ui: &mut Ui| {
                        ui.label("Complete overview of all TTGearLab blade lab results. See");
                        ui.hyperlink_to("here", ABOUT_URL);
                        ui.label("for a detailed explanation of the metrics and how to read them.");
                    });
                    ui.separator();

                    if self.state.charts.is_empty() {
                        ui.centered_and_justified(|ui: &mut Ui| {
                            ui.label("No data loaded  (File → Open…)");
                        });
                        return;
                    }
                    for (index, spec) in self.state.charts.iter().enumerate() {
                        plot::chart_panel(ui, index, spec);
                    }
                });
        });
    }
}
