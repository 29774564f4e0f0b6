use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StatsError {
    #[error("invalid series specifier: {0}")]
    InvalidSpecifier(String),

    #[error("invalid year: {0}")]
    InvalidYear(String),

    #[error("missing config file {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("catalog not loaded")]
    #[diagnostic(help("pass --catalog <path> or place data/statistics.csv in the working directory"))]
    CatalogUnavailable,

    #[error("failed to read catalog at {0}")]
    CatalogRead(PathBuf),

    #[error("failed to parse catalog: {0}")]
    CatalogParse(String),

    #[error("catalog already installed")]
    CatalogInstalled,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("unable to fetch data or empty response")]
    FetchFailed,
}
