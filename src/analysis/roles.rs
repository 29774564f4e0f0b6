use crate::dataset::Dataset;

use super::AnalysisFailure;

/// A token that marks a column as a row label when it appears in the column
/// name. `temporal` hints also make the row order a time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHint {
    pub token: &'static str,
    pub temporal: bool,
}

impl ColumnHint {
    pub fn matches(&self, column: &str) -> bool {
        column.to_lowercase().contains(self.token)
    }
}

pub const LABEL_HINTS: &[ColumnHint] = &[
    ColumnHint { token: "年", temporal: true },
    ColumnHint { token: "月", temporal: true },
    ColumnHint { token: "別", temporal: false },
    ColumnHint { token: "名稱", temporal: false },
    ColumnHint { token: "區", temporal: false },
    ColumnHint { token: "year", temporal: true },
    ColumnHint { token: "month", temporal: true },
    ColumnHint { token: "district", temporal: false },
    ColumnHint { token: "name", temporal: false },
];

pub fn is_label_column(column: &str) -> bool {
    LABEL_HINTS.iter().any(|hint| hint.matches(column))
}

pub fn is_temporal_column(column: &str) -> bool {
    LABEL_HINTS
        .iter()
        .filter(|hint| hint.temporal)
        .any(|hint| hint.matches(column))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub label: String,
    /// Columns where every row coerces to a number, in schema order.
    pub numeric: Vec<String>,
    pub temporal: bool,
}

impl ColumnRoles {
    pub fn target(&self) -> &str {
        &self.numeric[0]
    }
}

pub fn infer_roles(dataset: &Dataset) -> Result<ColumnRoles, AnalysisFailure> {
    let columns = dataset.columns();
    let label = columns
        .iter()
        .find(|column| is_label_column(column))
        .or_else(|| columns.first())
        .cloned()
        .ok_or(AnalysisFailure::NoNumericColumn)?;

    let numeric = columns
        .iter()
        .filter(|column| **column != label)
        .filter(|column| dataset.numeric_column(column).is_some())
        .cloned()
        .collect::<Vec<_>>();
    if numeric.is_empty() {
        return Err(AnalysisFailure::NoNumericColumn);
    }

    Ok(ColumnRoles {
        temporal: is_temporal_column(&label),
        label,
        numeric,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn dataset(value: serde_json::Value) -> Dataset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn hint_column_wins_over_schema_order() {
        let data = dataset(json!([{"人數": 1, "區域別": "A", "戶數": 2}]));
        let roles = infer_roles(&data).unwrap();
        assert_eq!(roles.label, "區域別");
        assert_eq!(roles.numeric, vec!["人數", "戶數"]);
        assert_eq!(roles.target(), "人數");
        assert!(!roles.temporal);
    }

    #[test]
    fn first_column_is_fallback_label() {
        let data = dataset(json!([{"Item": "A", "Value": "10"}]));
        let roles = infer_roles(&data).unwrap();
        assert_eq!(roles.label, "Item");
        assert_eq!(roles.target(), "Value");
    }

    #[test]
    fn temporal_hints() {
        assert!(is_temporal_column("年別"));
        assert!(is_temporal_column("統計月份"));
        assert!(is_temporal_column("Year"));
        assert!(!is_temporal_column("行政區"));
        assert!(!is_temporal_column("District"));
    }

    #[test]
    fn partially_numeric_column_is_not_a_candidate() {
        let data = dataset(json!([
            {"年別": "2023", "a": "x", "b": 1},
            {"年別": "2024", "a": 2, "b": 2}
        ]));
        let roles = infer_roles(&data).unwrap();
        assert_eq!(roles.numeric, vec!["b"]);
        assert!(roles.temporal);
    }

    #[test]
    fn no_numeric_column() {
        let data = dataset(json!([{"區": "A", "備註": "n/a"}]));
        assert_matches!(infer_roles(&data), Err(AnalysisFailure::NoNumericColumn));
    }
}
