use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::config::ResolvedConfig;
use crate::dataset::Dataset;
use crate::domain::{SeriesKey, TimeRange};
use crate::error::StatsError;

/// Source of raw series rows.
///
/// Every failure (transport, status, body) surfaces as
/// [`StatsError::FetchFailed`]; implementations make a single attempt.
pub trait StatsClient: Send + Sync {
    fn fetch_series(&self, key: &SeriesKey, range: &TimeRange) -> Result<Dataset, StatsError>;
}

#[derive(Clone)]
pub struct TycgHttpClient {
    client: Client,
    endpoint: String,
}

impl TycgHttpClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, StatsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|err| StatsError::HttpClient(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|err| StatsError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl StatsClient for TycgHttpClient {
    fn fetch_series(&self, key: &SeriesKey, range: &TimeRange) -> Result<Dataset, StatsError> {
        let params = query_params(key, range);
        debug!(endpoint = %self.endpoint, series = %key, range = %range, "requesting series");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .map_err(|err| {
                warn!(series = %key, error = %err, "series request failed");
                StatsError::FetchFailed
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|err| {
            warn!(series = %key, error = %err, "failed to read series body");
            StatsError::FetchFailed
        })?;

        parse_response(status, &body).map_err(|reason| {
            warn!(series = %key, status, reason, "series response rejected");
            StatsError::FetchFailed
        })
    }
}

/// Query string understood by `GetStaticData.aspx`.
pub fn query_params(key: &SeriesKey, range: &TimeRange) -> Vec<(&'static str, String)> {
    vec![
        ("tid", key.database_id.clone()),
        ("cid", key.category_id.clone()),
        ("sid", key.series_id.clone()),
        ("begin", range.begin.to_string()),
        ("end", range.end.to_string()),
        ("type", "JSON".to_string()),
    ]
}

/// Accepts only a 200 response whose body is a non-empty JSON array of flat
/// objects. The error is a short reason for logging.
pub fn parse_response(status: u16, body: &str) -> Result<Dataset, &'static str> {
    if status != 200 {
        return Err("unexpected status");
    }
    let body = body.trim();
    if body.is_empty() {
        return Err("empty body");
    }
    let dataset: Dataset =
        serde_json::from_str(body).map_err(|_| "body is not a JSON array of records")?;
    if dataset.is_empty() {
        return Err("no records");
    }
    Ok(dataset)
}
