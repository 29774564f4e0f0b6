//! Statistical summary of a single series.
//!
//! The engine never fails outward: every section is a value, and failures are
//! carried as [`AnalysisFailure`] until the report is rendered.

mod report;
pub mod roles;
pub mod stats;

use std::fmt;

use crate::dataset::Dataset;

pub use report::{AnalysisReport, format_grouped, format_value};
pub use roles::{ColumnHint, ColumnRoles, LABEL_HINTS, infer_roles};
pub use stats::{CorrelationMatrix, LinearFit};

pub const MIN_GROWTH_ROWS: usize = 2;
pub const MIN_TREND_ROWS: usize = 3;
pub const MIN_CORRELATION_COLUMNS: usize = 2;
pub const RANKING_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisFailure {
    EmptyDataset,
    NoNumericColumn,
    Computation(String),
}

impl fmt::Display for AnalysisFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisFailure::EmptyDataset => write!(f, "no data available"),
            AnalysisFailure::NoNumericColumn => write!(f, "insufficient numeric data"),
            AnalysisFailure::Computation(message) => write!(f, "calculation error: {message}"),
        }
    }
}

/// One row of the per-unit set: its position in the dataset, label text and
/// target value.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRow {
    pub index: usize,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Descriptive {
    pub row_count: usize,
    pub target: String,
    pub total: f64,
    /// Aggregate rows removed from the per-unit set.
    pub excluded_aggregates: usize,
    pub aggregate_label: String,
    pub mean: f64,
    pub max: UnitRow,
    pub min: UnitRow,
    pub growth_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Upward,
    Downward,
}

impl TrendDirection {
    /// A flat slope counts as downward.
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Upward
        } else {
            TrendDirection::Downward
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Upward => write!(f, "upward"),
            TrendDirection::Downward => write!(f, "downward"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub fit: LinearFit,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub target: String,
    pub column: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub rank: usize,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub row_count: usize,
    pub descriptive: Result<Descriptive, AnalysisFailure>,
    pub trend: Option<Trend>,
    pub correlation: Option<Correlation>,
    pub ranking: Vec<RankEntry>,
}

impl Analysis {
    fn new(row_count: usize, descriptive: Result<Descriptive, AnalysisFailure>) -> Self {
        Self {
            row_count,
            descriptive,
            trend: None,
            correlation: None,
            ranking: Vec::new(),
        }
    }
}

/// Runs every section over `dataset`. Sections that completed before a
/// failure are kept; the failure replaces the descriptive section.
pub fn analyze_dataset(dataset: &Dataset, aggregate_label: &str) -> Analysis {
    if dataset.is_empty() {
        return Analysis::new(0, Err(AnalysisFailure::EmptyDataset));
    }
    let mut analysis = Analysis::new(dataset.len(), Err(AnalysisFailure::NoNumericColumn));
    let descriptive = run_sections(dataset, aggregate_label, &mut analysis);
    analysis.descriptive = descriptive;
    analysis
}

fn run_sections(
    dataset: &Dataset,
    aggregate_label: &str,
    out: &mut Analysis,
) -> Result<Descriptive, AnalysisFailure> {
    let roles = infer_roles(dataset)?;
    let split = split_units(dataset, &roles, aggregate_label)?;

    let descriptive = describe(dataset, &roles, &split, aggregate_label)?;

    if split.units.len() >= MIN_TREND_ROWS {
        out.trend = Some(trend(&split.units)?);
    }
    if roles.numeric.len() >= MIN_CORRELATION_COLUMNS {
        out.correlation = correlate(dataset, &roles, &split.units)?;
    }
    out.ranking = rank(&split.units);

    Ok(descriptive)
}

struct UnitSplit {
    units: Vec<UnitRow>,
    /// Target value of the first aggregate row, when one exists.
    aggregate_total: Option<f64>,
    excluded: usize,
}

fn is_aggregate(label: &str, aggregate_label: &str) -> bool {
    label.trim() == aggregate_label
}

/// Separates the aggregate ("total") rows from the per-unit rows. If nothing
/// would remain, every row is kept as a unit.
fn split_units(
    dataset: &Dataset,
    roles: &ColumnRoles,
    aggregate_label: &str,
) -> Result<UnitSplit, AnalysisFailure> {
    let target = roles.target();
    let rows = dataset
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let value = record.number(target).ok_or_else(|| {
                AnalysisFailure::Computation(format!("row {index} has no numeric '{target}'"))
            })?;
            Ok(UnitRow {
                index,
                label: record.text(&roles.label).unwrap_or_default(),
                value,
            })
        })
        .collect::<Result<Vec<_>, AnalysisFailure>>()?;

    let aggregate_total = rows
        .iter()
        .find(|row| is_aggregate(&row.label, aggregate_label))
        .map(|row| row.value);
    let units = rows
        .iter()
        .filter(|row| !is_aggregate(&row.label, aggregate_label))
        .cloned()
        .collect::<Vec<_>>();

    if units.is_empty() {
        return Ok(UnitSplit {
            units: rows,
            aggregate_total,
            excluded: 0,
        });
    }
    Ok(UnitSplit {
        excluded: rows.len() - units.len(),
        units,
        aggregate_total,
    })
}

fn finite(value: f64, what: &str) -> Result<f64, AnalysisFailure> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisFailure::Computation(format!("{what} is not finite")))
    }
}

fn describe(
    dataset: &Dataset,
    roles: &ColumnRoles,
    split: &UnitSplit,
    aggregate_label: &str,
) -> Result<Descriptive, AnalysisFailure> {
    let units = &split.units;
    let values = units.iter().map(|row| row.value).collect::<Vec<_>>();

    let total = match split.aggregate_total {
        Some(total) => total,
        None => values.iter().sum(),
    };
    let mean = stats::mean(&values)
        .ok_or_else(|| AnalysisFailure::Computation("mean of an empty set".to_string()))?;

    let max = extreme(units, |candidate, best| candidate > best)?;
    let min = extreme(units, |candidate, best| candidate < best)?;

    Ok(Descriptive {
        row_count: dataset.len(),
        target: roles.target().to_string(),
        total: finite(total, "total")?,
        excluded_aggregates: split.excluded,
        aggregate_label: aggregate_label.to_string(),
        mean: finite(mean, "mean")?,
        max,
        min,
        growth_percent: growth(units, roles.temporal)?,
    })
}

/// First row that no later row beats under `better`.
fn extreme(units: &[UnitRow], better: fn(f64, f64) -> bool) -> Result<UnitRow, AnalysisFailure> {
    let mut rows = units.iter();
    let first = rows
        .next()
        .ok_or_else(|| AnalysisFailure::Computation("extremes of an empty set".to_string()))?;
    let best = rows.fold(first, |best, row| {
        if better(row.value, best.value) {
            row
        } else {
            best
        }
    });
    Ok(best.clone())
}

fn growth(units: &[UnitRow], temporal: bool) -> Result<Option<f64>, AnalysisFailure> {
    if !temporal || units.len() < MIN_GROWTH_ROWS {
        return Ok(None);
    }
    let (Some(first), Some(last)) = (units.first(), units.last()) else {
        return Ok(None);
    };
    if first.value == 0.0 {
        return Ok(None);
    }
    let percent = (last.value - first.value) / first.value * 100.0;
    finite(percent, "growth rate").map(Some)
}

fn trend(units: &[UnitRow]) -> Result<Trend, AnalysisFailure> {
    let values = units.iter().map(|row| row.value).collect::<Vec<_>>();
    let fit = stats::linear_fit(&values)
        .ok_or_else(|| AnalysisFailure::Computation("regression needs two points".to_string()))?;
    finite(fit.slope, "regression slope")?;
    finite(fit.r_squared, "R-squared")?;
    Ok(Trend {
        direction: TrendDirection::from_slope(fit.slope),
        fit,
    })
}

fn correlate(
    dataset: &Dataset,
    roles: &ColumnRoles,
    units: &[UnitRow],
) -> Result<Option<Correlation>, AnalysisFailure> {
    let series = roles
        .numeric
        .iter()
        .map(|column| {
            let values = dataset.numeric_column(column).ok_or_else(|| {
                AnalysisFailure::Computation(format!("column '{column}' is not numeric"))
            })?;
            Ok(units.iter().map(|row| values[row.index]).collect::<Vec<_>>())
        })
        .collect::<Result<Vec<_>, AnalysisFailure>>()?;

    let matrix = CorrelationMatrix::compute(roles.numeric.clone(), &series);
    Ok(matrix
        .strongest_partner(0)
        .map(|(column, coefficient)| Correlation {
            target: roles.target().to_string(),
            column: column.to_string(),
            coefficient,
        }))
}

/// Largest values first; equal values keep row order.
fn rank(units: &[UnitRow]) -> Vec<RankEntry> {
    let mut sorted = units.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
    sorted
        .into_iter()
        .take(RANKING_SIZE)
        .enumerate()
        .map(|(i, row)| RankEntry {
            rank: i + 1,
            label: row.label.clone(),
            value: row.value,
        })
        .collect()
}
