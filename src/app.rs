use chrono::Datelike;
use tracing::{debug, info};

use crate::analysis::AnalysisReport;
use crate::catalog::{Catalog, SearchOutcome};
use crate::client::StatsClient;
use crate::config::DEFAULT_AGGREGATE_LABEL;
use crate::dataset::Dataset;
use crate::domain::{SeriesKey, TimeRange};
use crate::error::StatsError;
use crate::guard::{Payload, guard};

/// The four operations exposed to callers: catalog search, raw fetch, guarded
/// fetch and analysis.
pub struct App<'c, C: StatsClient> {
    client: C,
    catalog: Option<&'c Catalog>,
    aggregate_label: String,
    current_year: Option<i32>,
}

impl<'c, C: StatsClient> App<'c, C> {
    pub fn new(client: C, catalog: Option<&'c Catalog>) -> Self {
        Self {
            client,
            catalog,
            aggregate_label: DEFAULT_AGGREGATE_LABEL.to_string(),
            current_year: None,
        }
    }

    pub fn with_aggregate_label(mut self, label: impl Into<String>) -> Self {
        self.aggregate_label = label.into();
        self
    }

    /// Pins the year the default window is computed from.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn resolve_range(
        &self,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Result<TimeRange, StatsError> {
        let year = self
            .current_year
            .unwrap_or_else(|| chrono::Local::now().year());
        TimeRange::resolve(begin, end, year)
    }

    pub fn search_catalog(&self, keyword: &str) -> Result<SearchOutcome<'c>, StatsError> {
        let catalog = self.catalog.ok_or(StatsError::CatalogUnavailable)?;
        let outcome = catalog.search(keyword);
        debug!(
            keyword,
            matches = match &outcome {
                SearchOutcome::Matches(found) => found.len(),
                SearchOutcome::NoResults => 0,
            },
            "catalog search"
        );
        Ok(outcome)
    }

    pub fn fetch_series(
        &self,
        key: &SeriesKey,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Result<Dataset, StatsError> {
        let range = self.resolve_range(begin, end)?;
        let dataset = self.client.fetch_series(key, &range)?;
        debug!(series = %key, range = %range, rows = dataset.len(), "series fetched");
        Ok(dataset)
    }

    pub fn guard_payload(&self, dataset: Dataset) -> Payload {
        guard(dataset)
    }

    /// Raw access: the series itself when small, a preview otherwise.
    pub fn statistics_data(
        &self,
        key: &SeriesKey,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Result<Payload, StatsError> {
        let dataset = self.fetch_series(key, begin, end)?;
        Ok(self.guard_payload(dataset))
    }

    /// A fetch failure becomes an "unavailable" report. A malformed year is
    /// the one caller error and returns [`StatsError::InvalidYear`] before any
    /// request is made.
    pub fn analyze(
        &self,
        key: &SeriesKey,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Result<AnalysisReport, StatsError> {
        let range = self.resolve_range(begin, end)?;
        let report = match self.client.fetch_series(key, &range) {
            Ok(dataset) => {
                AnalysisReport::build(key.clone(), range, &dataset, &self.aggregate_label)
            }
            Err(StatsError::FetchFailed) => AnalysisReport::unavailable(key.clone(), range),
            Err(err) => return Err(err),
        };
        info!(series = %key, available = report.is_available(), "analysis complete");
        Ok(report)
    }
}
