use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::error::DataError;
use super::loader;
use super::model::BladeDataset;

/// How often the lab sheet is re-read at most.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

// ---------------------------------------------------------------------------
// Where the measurements come from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A local csv / json / parquet file.
    LocalFile(PathBuf),
    /// A shared spreadsheet, fetched through its CSV export.
    Sheet { sheet_id: String, gid: Option<String> },
}

impl DataSource {
    /// Short description for the status bar and logs.
    pub fn describe(&self) -> String {
        match self {
            DataSource::LocalFile(path) => path.display().to_string(),
            DataSource::Sheet { sheet_id, .. } => format!("sheet {sheet_id}"),
        }
    }

    pub fn export_url(sheet_id: &str, gid: Option<&str>) -> String {
        let mut url = format!("https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv");
        if let Some(gid) = gid {
            url.push_str("&gid=");
            url.push_str(gid);
        }
        url
    }

    /// Read the source once, uncached.
    pub fn load(&self) -> Result<BladeDataset, DataError> {
        match self {
            DataSource::LocalFile(path) => loader::load_file(path),
            DataSource::Sheet { sheet_id, gid } => {
                let url = Self::export_url(sheet_id, gid.as_deref());
                let origin = self.describe();
                log::info!("Fetching {url}");
                let body = reqwest::blocking::get(&url)
                    .and_then(|resp| resp.error_for_status())
                    .and_then(|resp| resp.text())
                    .map_err(|e| DataError::unavailable(&origin, e))?;
                let dataset = loader::load_csv_reader(body.as_bytes())?;
                log::info!(
                    "Loaded {} blades from {origin} ({} rows dropped)",
                    dataset.len(),
                    dataset.dropped_rows
                );
                Ok(dataset)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Time-to-live cache in front of a source
// ---------------------------------------------------------------------------

struct CacheEntry {
    loaded_at: Instant,
    dataset: BladeDataset,
}

/// Serves the last loaded dataset until it is older than `ttl`.
///
/// A failed reload returns the error and keeps the previous entry.
pub struct CachedLoader {
    source: DataSource,
    ttl: Duration,
    cached: Option<CacheEntry>,
}

impl CachedLoader {
    pub fn new(source: DataSource, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: None,
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|entry| now.saturating_duration_since(entry.loaded_at) < self.ttl)
    }

    /// The cached dataset, however old.
    pub fn dataset(&self) -> Option<&BladeDataset> {
        self.cached.as_ref().map(|entry| &entry.dataset)
    }

    /// Reload if the cache is empty or stale. Returns whether a load happened.
    pub fn ensure_fresh(&mut self) -> Result<bool, DataError> {
        self.ensure_fresh_at(Instant::now())
    }

    pub fn ensure_fresh_at(&mut self, now: Instant) -> Result<bool, DataError> {
        if self.is_fresh(now) {
            log::debug!("Serving cached data for {}", self.source.describe());
            return Ok(false);
        }
        let dataset = self.source.load()?;
        self.cached = Some(CacheEntry {
            loaded_at: now,
            dataset,
        });
        Ok(true)
    }

    /// Drop the cache so the next access reloads.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Brand,Name,Type,Ep,Ec,Vp,Vl").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn fresh_cache_is_not_reloaded() {
        let file = csv_file(&["Stiga,Clipper,7-Ply,1,1,1,1"]);
        let mut loader = CachedLoader::new(
            DataSource::LocalFile(file.path().to_path_buf()),
            Duration::from_secs(60),
        );
        let start = Instant::now();
        assert!(loader.ensure_fresh_at(start).unwrap());
        assert_eq!(loader.dataset().unwrap().len(), 1);

        std::fs::write(
            file.path(),
            "Brand,Name,Type,Ep,Ec,Vp,Vl\nA,B,5-Ply,1,1,1,1\nA,C,5-Ply,1,1,1,1\n",
        )
        .unwrap();
        assert!(!loader.ensure_fresh_at(start + Duration::from_secs(30)).unwrap());
        assert_eq!(loader.dataset().unwrap().len(), 1);

        assert!(loader.ensure_fresh_at(start + Duration::from_secs(61)).unwrap());
        assert_eq!(loader.dataset().unwrap().len(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let file = csv_file(&["Stiga,Clipper,7-Ply,1,1,1,1"]);
        let mut loader =
            CachedLoader::new(DataSource::LocalFile(file.path().to_path_buf()), DEFAULT_TTL);
        loader.ensure_fresh().unwrap();
        loader.invalidate();
        assert!(loader.dataset().is_none());
        assert!(loader.ensure_fresh().unwrap());
    }

    #[test]
    fn failed_reload_keeps_previous_data() {
        let file = csv_file(&["Stiga,Clipper,7-Ply,1,1,1,1"]);
        let path = file.path().to_path_buf();
        let mut loader = CachedLoader::new(DataSource::LocalFile(path), Duration::ZERO);
        loader.ensure_fresh().unwrap();
        drop(file);

        let err = loader.ensure_fresh().unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
        assert_eq!(loader.dataset().unwrap().len(), 1);
    }

    #[test]
    fn sheet_export_url() {
        assert_eq!(
            DataSource::export_url("abc", Some("7")),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=7"
        );
        assert_eq!(
            DataSource::export_url("abc", None),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv"
        );
    }
}
