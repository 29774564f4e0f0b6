use std::collections::HashSet;
use std::fs;
use std::sync::OnceLock;

use camino::{Utf8Path, Utf8PathBuf};
use csv::ReaderBuilder;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{CATEGORY_ID_WIDTH, DATABASE_ID_WIDTH, SERIES_ID_WIDTH, SeriesKey, zero_pad};
use crate::error::StatsError;

pub const SEARCH_LIMIT: usize = 20;

const CANDIDATE_PATHS: &[&str] = &["data/statistics_full.csv", "data/statistics.csv"];

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Row layout of the published series list.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "所屬資料庫", default)]
    database_label: Option<String>,
    tid: String,
    #[serde(rename = "所屬類別", default)]
    category_label: Option<String>,
    cid: String,
    #[serde(rename = "資料名稱", default)]
    series_label: Option<String>,
    sid: String,
    #[serde(rename = "統計資料檔案格式", default)]
    source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub database_label: Option<String>,
    pub category_label: Option<String>,
    pub series_label: Option<String>,
    pub database_id: String,
    pub category_id: String,
    pub series_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl CatalogEntry {
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(&self.database_id, &self.category_id, &self.series_id)
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.series_label, &self.category_label]
            .into_iter()
            .flatten()
            .any(|label| label.to_lowercase().contains(needle))
    }
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        Self {
            database_label: row.database_label,
            category_label: row.category_label,
            series_label: row.series_label,
            database_id: zero_pad(&row.tid, DATABASE_ID_WIDTH),
            category_id: zero_pad(&row.cid, CATEGORY_ID_WIDTH),
            series_id: zero_pad(&row.sid, SERIES_ID_WIDTH),
            source_url: row.source_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    Matches(Vec<&'a CatalogEntry>),
    NoResults,
}

/// Known series, in file order. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_csv_str(content: &str) -> Result<Self, StatsError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for row in reader.deserialize::<CatalogRow>() {
            let row = row.map_err(|err| StatsError::CatalogParse(err.to_string()))?;
            let entry = CatalogEntry::from(row);
            if seen.insert(entry.key()) {
                entries.push(entry);
            }
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Utf8Path) -> Result<Self, StatsError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| StatsError::CatalogRead(path.as_std_path().to_path_buf()))?;
        let catalog = Self::from_csv_str(&content)?;
        info!(path = %path, entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Loads the explicit path if given, otherwise the first catalog found in
    /// the working directory or the user data directory.
    pub fn discover(explicit: Option<&Utf8Path>) -> Result<Self, StatsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        for candidate in default_locations() {
            debug!(path = %candidate, "probing catalog location");
            if candidate.as_std_path().exists() {
                return Self::load(&candidate);
            }
        }
        Err(StatsError::CatalogUnavailable)
    }

    /// Makes `catalog` the process-wide catalog. Only the first call succeeds.
    pub fn install(catalog: Catalog) -> Result<&'static Catalog, StatsError> {
        CATALOG
            .set(catalog)
            .map_err(|_| StatsError::CatalogInstalled)?;
        Self::global()
    }

    pub fn global() -> Result<&'static Catalog, StatsError> {
        CATALOG.get().ok_or(StatsError::CatalogUnavailable)
    }

    /// Case-insensitive substring match on series and category labels, in
    /// catalog order, capped at [`SEARCH_LIMIT`].
    pub fn search(&self, keyword: &str) -> SearchOutcome<'_> {
        let needle = keyword.to_lowercase();
        let matches = self
            .entries
            .iter()
            .filter(|entry| entry.matches(&needle))
            .take(SEARCH_LIMIT)
            .collect::<Vec<_>>();
        if matches.is_empty() {
            SearchOutcome::NoResults
        } else {
            SearchOutcome::Matches(matches)
        }
    }
}

fn default_locations() -> Vec<Utf8PathBuf> {
    let mut locations = CANDIDATE_PATHS
        .iter()
        .map(|path| Utf8PathBuf::from(*path))
        .collect::<Vec<_>>();
    if let Some(path) = BaseDirs::new().and_then(|dirs| {
        Utf8PathBuf::from_path_buf(dirs.data_dir().join("tycg-stats").join("statistics.csv")).ok()
    }) {
        locations.push(path);
    }
    locations
}
