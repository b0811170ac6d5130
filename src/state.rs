use std::time::Duration;

use crate::chart::builder::{build_chart, ChartConfig};
use crate::chart::spec::ChartSpec;
use crate::color::{ColorAssignment, PaletteMode};
use crate::config::AppConfig;
use crate::data::filter::{filter, init_selection, FilterSelection};
use crate::data::model::BladeDataset;
use crate::data::source::{CachedLoader, DataSource};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Cached access to the configured source (None until one is chosen).
    pub loader: Option<CachedLoader>,

    /// Current sidebar selection.
    pub selection: FilterSelection,

    /// Blades passing the current selection (cached).
    pub visible: BladeDataset,

    /// Type colours, built from the full dataset.
    pub color_map: Option<ColorAssignment>,

    pub palette_mode: PaletteMode,

    pub chart_configs: Vec<ChartConfig>,

    /// Charts built for the current selection.
    pub charts: Vec<ChartSpec>,

    pub cache_ttl: Duration,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set when the next load should reset the selection.
    reset_selection: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl AppState {
    /// State for `config`, with nothing loaded yet.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            loader: Some(CachedLoader::new(config.data_source(), config.cache_ttl())),
            selection: FilterSelection::default(),
            visible: BladeDataset::default(),
            color_map: None,
            palette_mode: config.palette_mode,
            chart_configs: config.charts.clone(),
            charts: Vec::new(),
            cache_ttl: config.cache_ttl(),
            status_message: None,
            reset_selection: true,
        }
    }

    /// The full dataset, if one has been loaded.
    pub fn dataset(&self) -> Option<&BladeDataset> {
        self.loader.as_ref().and_then(CachedLoader::dataset)
    }

    /// Switch to a new source and load it.
    pub fn set_source(&mut self, source: DataSource) {
        self.loader = Some(CachedLoader::new(source, self.cache_ttl));
        self.reset_selection = true;
        self.refresh();
    }

    /// Drop the cache and re-read the current source.
    pub fn reload(&mut self) {
        if let Some(loader) = self.loader.as_mut() {
            loader.invalidate();
        }
        self.refresh();
    }

    /// One interaction cycle: make sure the data is fresh, then rebuild
    /// the filtered view and every chart.
    pub fn refresh(&mut self) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };

        match loader.ensure_fresh() {
            Ok(reloaded) => {
                if reloaded {
                    self.on_dataset_loaded();
                }
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", loader.source().describe());
                self.status_message = Some(format!("Error: {e}"));
                self.visible = BladeDataset::default();
                self.charts.clear();
                return;
            }
        }
        self.refilter();
    }

    /// Rebuild the colour map and, for a new source, the selection.
    fn on_dataset_loaded(&mut self) {
        let Some(loader) = self.loader.as_ref() else {
            return;
        };
        let Some(dataset) = loader.dataset() else {
            return;
        };

        log::info!(
            "{} blades, {} brands, {} types",
            dataset.len(),
            dataset.brands.len(),
            dataset.types.len()
        );
        if dataset.is_empty() {
            log::warn!("{} has no usable rows", loader.source().describe());
        }
        self.color_map = Some(ColorAssignment::new(&dataset.types, self.palette_mode));
        if self.reset_selection {
            self.selection = init_selection(dataset);
            self.reset_selection = false;
        }
        self.status_message = (dataset.dropped_rows > 0).then(|| {
            format!(
                "{} rows skipped: Ep or Vp is zero",
                dataset.dropped_rows
            )
        });
    }

    /// Recompute `visible` and the charts after a selection change.
    pub fn refilter(&mut self) {
        let Some(dataset) = self.loader.as_ref().and_then(CachedLoader::dataset) else {
            self.visible = BladeDataset::default();
            self.charts.clear();
            return;
        };

        self.visible = filter(dataset, &self.selection);
        self.charts = match &self.color_map {
            Some(colors) => self
                .chart_configs
                .iter()
                .map(|config| build_chart(dataset, &self.visible, config, colors))
                .collect(),
            None => Vec::new(),
        };
    }

    /// Toggle a single brand in the multiselect.
    pub fn toggle_brand(&mut self, brand: &str) {
        if !self.selection.brands.remove(brand) {
            self.selection.brands.insert(brand.to_string());
        }
        self.refresh();
    }

    /// Toggle a single blade type in the multiselect.
    pub fn toggle_type(&mut self, blade_type: &str) {
        if !self.selection.types.remove(blade_type) {
            self.selection.types.insert(blade_type.to_string());
        }
        self.refresh();
    }

    /// Reset the selection to span the whole dataset.
    pub fn clear_filters(&mut self) {
        if let Some(dataset) = self.loader.as_ref().and_then(CachedLoader::dataset) {
            self.selection = init_selection(dataset);
        }
        self.refresh();
    }
}
