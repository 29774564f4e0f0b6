use std::fmt::{self, Write as _};

use crate::dataset::{Dataset, Record};
use crate::domain::{SeriesKey, TimeRange};

use super::{Analysis, AnalysisFailure, Descriptive, analyze_dataset};

pub const SAMPLE_ROWS: usize = 5;

/// Text report for one series. Rendering happens in `Display`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub key: SeriesKey,
    pub range: TimeRange,
    pub analysis: Analysis,
    pub sample: Vec<Record>,
}

impl AnalysisReport {
    pub fn build(
        key: SeriesKey,
        range: TimeRange,
        dataset: &Dataset,
        aggregate_label: &str,
    ) -> Self {
        Self {
            key,
            range,
            analysis: analyze_dataset(dataset, aggregate_label),
            sample: dataset.head(SAMPLE_ROWS).to_vec(),
        }
    }

    /// Report for a series whose data could not be fetched.
    pub fn unavailable(key: SeriesKey, range: TimeRange) -> Self {
        Self::build(key, range, &Dataset::default(), "")
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.analysis.descriptive, Err(AnalysisFailure::EmptyDataset))
    }

    fn descriptive_section(&self) -> String {
        match &self.analysis.descriptive {
            Ok(stats) => render_descriptive(stats),
            Err(failure) => format!("- {failure}"),
        }
    }

    fn tests_section(&self) -> String {
        let mut lines = Vec::new();
        if let Some(trend) = &self.analysis.trend {
            lines.push(format!(
                "{}. Trend (simple linear regression): slope {:.4}, R-squared {:.4}; the series trends {} (R-squared closer to 1 means a clearer trend).",
                lines.len() + 1,
                trend.fit.slope,
                trend.fit.r_squared,
                trend.direction
            ));
        }
        if let Some(correlation) = &self.analysis.correlation {
            lines.push(format!(
                "{}. Correlation (Pearson): '{}' and '{}' have coefficient {:.4}.",
                lines.len() + 1,
                correlation.target,
                correlation.column,
                correlation.coefficient
            ));
        }
        if lines.is_empty() {
            return "- Not enough data for trend or correlation analysis.".to_string();
        }
        lines.join("\n")
    }

    fn ranking_section(&self) -> String {
        if self.analysis.ranking.is_empty() {
            return "- No ranking available.".to_string();
        }
        let mut out = format!("Highest values (top {}):", self.analysis.ranking.len());
        for entry in &self.analysis.ranking {
            let _ = write!(
                out,
                "\n   - #{}: {} ({})",
                entry.rank,
                entry.label,
                format_value(entry.value)
            );
        }
        out
    }
}

fn render_descriptive(stats: &Descriptive) -> String {
    let mut lines = Vec::new();
    let note = if stats.excluded_aggregates > 0 {
        format!(" (aggregate row \"{}\" excluded)", stats.aggregate_label)
    } else {
        String::new()
    };
    lines.push(format!("- Records: {}{note}", stats.row_count));
    lines.push(format!("- Target column: {}", stats.target));
    lines.push(format!("- Total: {}", format_grouped(stats.total, 0)));
    lines.push(format!("- Mean: {}", format_grouped(stats.mean, 2)));
    lines.push(format!(
        "- Extremes: highest {} ({}), lowest {} ({})",
        stats.max.label,
        format_value(stats.max.value),
        stats.min.label,
        format_value(stats.min.value)
    ));
    if let Some(growth) = stats.growth_percent {
        lines.push(format!("- Growth over the period: {growth:.2}%"));
    }
    lines.join("\n")
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_available() {
            return writeln!(f, "Unable to fetch data for {}; analysis not possible.", self.key);
        }
        let sample = serde_json::to_string(&self.sample).map_err(|_| fmt::Error)?;

        writeln!(f, "### Statistical Summary")?;
        writeln!(f)?;
        writeln!(f, "**1. Basic Info**")?;
        writeln!(f, "- Source: {}", self.key)?;
        writeln!(f, "- Time range: {}", self.range)?;
        writeln!(f, "- Records: {}", self.analysis.row_count)?;
        writeln!(f)?;
        writeln!(f, "**2. Descriptive Stats**")?;
        writeln!(f, "{}", self.descriptive_section())?;
        writeln!(f)?;
        writeln!(f, "**3. Statistical Analysis**")?;
        writeln!(f, "{}", self.tests_section())?;
        writeln!(f)?;
        writeln!(f, "**4. Top 10**")?;
        writeln!(f, "{}", self.ranking_section())?;
        writeln!(f)?;
        writeln!(f, "**5. Sample Data (first {SAMPLE_ROWS})**")?;
        writeln!(f, "{sample}")
    }
}

/// Magnitudes from here on are printed in exponent form.
pub const EXPONENT_THRESHOLD: f64 = 1e15;

fn is_huge(value: f64) -> bool {
    value.abs() >= EXPONENT_THRESHOLD
}

/// Fixed decimals with `,` between thousands: `1234.5` -> `1,234.50`.
/// Huge values switch to exponent form: `4e200`, `2.00e200`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if is_huge(value) {
        return format!("{value:.decimals$e}");
    }
    let plain = format!("{value:.decimals$}");
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Shortest form of a raw value: `500`, `12.5`, `3e200`.
pub fn format_value(value: f64) -> String {
    if is_huge(value) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}
