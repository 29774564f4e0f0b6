use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

pub const DATABASE_ID_WIDTH: usize = 4;
pub const CATEGORY_ID_WIDTH: usize = 4;
pub const SERIES_ID_WIDTH: usize = 6;

/// Number of years covered by the default window, both ends included.
pub const DEFAULT_WINDOW_YEARS: i32 = 5;

/// The (database, category, series) triple that names one provider series.
///
/// Codes are kept as caller-supplied text so leading zeros are never lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub database_id: String,
    pub category_id: String,
    pub series_id: String,
}

impl SeriesKey {
    pub fn new(
        database_id: impl Into<String>,
        category_id: impl Into<String>,
        series_id: impl Into<String>,
    ) -> Self {
        Self {
            database_id: database_id.into(),
            category_id: category_id.into(),
            series_id: series_id.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.database_id, self.category_id, self.series_id
        )
    }
}

impl FromStr for SeriesKey {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value.trim().split('-').map(str::trim).collect::<Vec<_>>();
        let [tid, cid, sid] = parts.as_slice() else {
            return Err(StatsError::InvalidSpecifier(value.to_string()));
        };
        let is_valid = [tid, cid, sid]
            .iter()
            .all(|part| !part.is_empty() && !part.chars().any(char::is_whitespace));
        if !is_valid {
            return Err(StatsError::InvalidSpecifier(value.to_string()));
        }
        Ok(Self::new(*tid, *cid, *sid))
    }
}

/// Left-pads a numeric code with zeros, the way identifiers lose and regain
/// their width when a catalog passes through a spreadsheet.
pub fn zero_pad(code: &str, width: usize) -> String {
    let trimmed = code.trim();
    format!("{trimmed:0>width$}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(i32);

impl Year {
    pub fn new(value: i32) -> Result<Self, StatsError> {
        if !(0..=9999).contains(&value) {
            return Err(StatsError::InvalidYear(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for Year {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let is_valid = trimmed.len() == 4 && trimmed.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(StatsError::InvalidYear(value.to_string()));
        }
        trimmed
            .parse::<i32>()
            .map(Self)
            .map_err(|_| StatsError::InvalidYear(value.to_string()))
    }
}

/// Inclusive year window sent to the provider as `begin`/`end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub begin: Year,
    pub end: Year,
}

impl TimeRange {
    pub fn new(begin: Year, end: Year) -> Self {
        Self { begin, end }
    }

    /// Five-year window ending at `current_year`.
    pub fn trailing(current_year: i32) -> Result<Self, StatsError> {
        let end = Year::new(current_year)?;
        let begin = Year::new(current_year - (DEFAULT_WINDOW_YEARS - 1))?;
        Ok(Self { begin, end })
    }

    pub fn current_default() -> Result<Self, StatsError> {
        Self::trailing(chrono::Local::now().year())
    }

    /// Both bounds must be present to be honoured; a half-open request falls
    /// back to the default window as a whole.
    pub fn resolve(
        begin: Option<&str>,
        end: Option<&str>,
        current_year: i32,
    ) -> Result<Self, StatsError> {
        match (begin, end) {
            (Some(begin), Some(end)) if !begin.trim().is_empty() && !end.trim().is_empty() => {
                Ok(Self::new(begin.parse()?, end.parse()?))
            }
            _ => Self::trailing(current_year),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.begin, self.end)
    }
}
