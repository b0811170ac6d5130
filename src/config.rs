use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::chart::builder::{default_charts, ChartConfig};
use crate::chart::scale::SizeScale;
use crate::color::PaletteMode;
use crate::data::source::{DataSource, DEFAULT_TTL};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "blade-lab.json";

/// Local copy of the lab sheet used when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "lab/blades.csv";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Parser)]
#[command(name = "blade-lab-viewer", version, about = "Blade lab measurement viewer")]
pub struct Cli {
    /// JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Local csv / json / parquet file, overrides the configured source.
    #[arg(long, conflicts_with = "sheet")]
    pub data: Option<PathBuf>,

    /// Shared spreadsheet id, overrides the configured source.
    #[arg(long)]
    pub sheet: Option<String>,

    /// Draw every chart with the larger markers of the early lab sheets.
    #[arg(long)]
    pub legacy_markers: bool,
}

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    File { path: PathBuf },
    Sheet { sheet_id: String, gid: Option<String> },
}

impl From<&SourceConfig> for DataSource {
    fn from(cfg: &SourceConfig) -> Self {
        match cfg {
            SourceConfig::File { path } => DataSource::LocalFile(path.clone()),
            SourceConfig::Sheet { sheet_id, gid } => DataSource::Sheet {
                sheet_id: sheet_id.clone(),
                gid: gid.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub cache_ttl_secs: u64,
    pub palette_mode: PaletteMode,
    pub charts: Vec<ChartConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::File {
                path: PathBuf::from(DEFAULT_DATA_FILE),
            },
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            palette_mode: PaletteMode::default(),
            charts: default_charts(SizeScale::default()),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config file (explicit, else the default name if present, else
    /// built-in defaults) with command line overrides applied.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Some(path) = &cli.data {
            config.source = SourceConfig::File { path: path.clone() };
        } else if let Some(sheet_id) = &cli.sheet {
            config.source = SourceConfig::Sheet {
                sheet_id: sheet_id.clone(),
                gid: None,
            };
        }
        if cli.legacy_markers {
            for chart in &mut config.charts {
                chart.scale = SizeScale::LEGACY;
            }
        }
        Ok(config)
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::from(&self.source)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
