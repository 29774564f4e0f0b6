use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One provider row. Column set and order vary per series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Text form of a cell; numbers render in their JSON form, null and
    /// missing cells yield `None`.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.0.get(column).and_then(coerce_number)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Numeric coercion of a single cell: JSON numbers, or strings that parse as a
/// finite number once trimmed.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Rows in provider order. Order is the time axis for growth and regression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(Vec<Record>);

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn into_records(self) -> Vec<Record> {
        self.0
    }

    /// Union of column names, in the order they are first seen.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.0 {
            for column in record.columns() {
                if !columns.iter().any(|known| known == column) {
                    columns.push(column.to_string());
                }
            }
        }
        columns
    }

    /// The whole column as numbers, or `None` if any row fails coercion or
    /// lacks the column.
    pub fn numeric_column(&self, column: &str) -> Option<Vec<f64>> {
        self.0.iter().map(|record| record.number(column)).collect()
    }

    pub fn head(&self, n: usize) -> &[Record] {
        &self.0[..n.min(self.0.len())]
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dataset(value: Value) -> Dataset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn columns_follow_provider_order() {
        let data = dataset(json!([
            {"年別": "2023", "人數": 10},
            {"年別": "2024", "備註": "x", "人數": 12}
        ]));
        assert_eq!(data.columns(), vec!["年別", "人數", "備註"]);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(coerce_number(&json!(12)), Some(12.0));
        assert_eq!(coerce_number(&json!(" 3.5 ")), Some(3.5));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn numeric_column_requires_every_row() {
        let data = dataset(json!([
            {"區": "A", "v": "1", "w": 1},
            {"區": "B", "v": "x", "w": 2},
            {"區": "C", "w": 3}
        ]));
        assert_eq!(data.numeric_column("v"), None);
        assert_eq!(data.numeric_column("w"), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn text_accessor_keeps_leading_zeros() {
        let data = dataset(json!([{"code": "0005", "n": 7}]));
        let record = &data.records()[0];
        assert_eq!(record.text("code").as_deref(), Some("0005"));
        assert_eq!(record.text("n").as_deref(), Some("7"));
        assert_eq!(record.text("missing"), None);
    }
}
