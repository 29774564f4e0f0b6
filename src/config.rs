use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

pub const DEFAULT_CONFIG_FILE: &str = "tycg-stats.json";
pub const DEFAULT_ENDPOINT: &str =
    "https://statisticsinfo.tycg.gov.tw/TaoyuanSTYB/RestfulAPI/GetStaticData.aspx";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AGGREGATE_LABEL: &str = "桃園市";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub accept_invalid_certs: Option<bool>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub aggregate_label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub endpoint: String,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
    pub user_agent: String,
    pub catalog: Option<Utf8PathBuf>,
    pub aggregate_label: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            // The provider's certificate chain is not in the default trust stores.
            accept_invalid_certs: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            catalog: None,
            aggregate_label: DEFAULT_AGGREGATE_LABEL.to_string(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist; the default file is optional.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, StatsError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if !config_path.exists() {
            return match path {
                Some(_) => Err(StatsError::MissingConfig(config_path)),
                None => Ok(ResolvedConfig::default()),
            };
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| StatsError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| StatsError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, StatsError> {
        let defaults = ResolvedConfig::default();

        let endpoint = config.endpoint.unwrap_or(defaults.endpoint);
        if endpoint.trim().is_empty() {
            return Err(StatsError::InvalidConfig("endpoint must not be empty".to_string()));
        }

        let timeout = match config.timeout_secs {
            Some(0) => {
                return Err(StatsError::InvalidConfig(
                    "timeout_secs must be greater than zero".to_string(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        let aggregate_label = config
            .aggregate_label
            .map(|label| label.trim().to_string())
            .unwrap_or(defaults.aggregate_label);
        if aggregate_label.is_empty() {
            return Err(StatsError::InvalidConfig(
                "aggregate_label must not be empty".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(defaults.schema_version),
            endpoint: endpoint.trim().to_string(),
            timeout,
            accept_invalid_certs: config
                .accept_invalid_certs
                .unwrap_or(defaults.accept_invalid_certs),
            user_agent: config.user_agent.unwrap_or(defaults.user_agent),
            catalog: config.catalog.map(Utf8PathBuf::from),
            aggregate_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.timeout, Duration::from_secs(30));
        assert!(resolved.accept_invalid_certs);
        assert_eq!(resolved.aggregate_label, "桃園市");
        assert_eq!(resolved.catalog, None);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = Config {
            timeout_secs: Some(0),
            ..Config::default()
        };
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, StatsError::InvalidConfig(_));
    }
}
