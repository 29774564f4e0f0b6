use serde::Serialize;

use crate::dataset::{Dataset, Record};

/// Largest series returned verbatim.
pub const FULL_PAYLOAD_LIMIT: usize = 50;
pub const PREVIEW_ROWS: usize = 5;

const ANALYZE_INSTRUCTION: &str = "Use the `analyze` operation for statistics over the full series instead of reading the raw records.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Full(Dataset),
    Preview(PreviewPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPayload {
    pub status: &'static str,
    pub message: String,
    pub instruction: &'static str,
    pub preview_data: Vec<Record>,
    #[serde(skip)]
    pub total: usize,
}

/// Large series are cut down to a preview so a bounded consumer is never
/// handed an unbounded payload.
pub fn guard(dataset: Dataset) -> Payload {
    let total = dataset.len();
    if total <= FULL_PAYLOAD_LIMIT {
        return Payload::Full(dataset);
    }
    Payload::Preview(PreviewPayload {
        status: "success",
        message: format!(
            "Series too large ({total} records); showing the first {PREVIEW_ROWS} as a preview."
        ),
        instruction: ANALYZE_INSTRUCTION,
        preview_data: dataset.head(PREVIEW_ROWS).to_vec(),
        total,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::{Map, Value, json};

    use super::*;

    fn rows(n: usize) -> Dataset {
        (0..n)
            .map(|i| {
                let mut fields = Map::new();
                fields.insert("區".to_string(), Value::from(format!("r{i}")));
                fields.insert("v".to_string(), Value::from(i));
                Record::new(fields)
            })
            .collect()
    }

    #[test]
    fn fifty_rows_pass_through() {
        assert_matches!(guard(rows(50)), Payload::Full(ref data) if data.len() == 50);
    }

    #[test]
    fn fifty_one_rows_are_previewed() {
        let Payload::Preview(preview) = guard(rows(51)) else {
            panic!("expected preview");
        };
        assert_eq!(preview.total, 51);
        assert_eq!(preview.preview_data.len(), 5);
        assert_eq!(preview.preview_data[0].text("區").as_deref(), Some("r0"));
        assert!(preview.message.contains("51"));
    }

    #[test]
    fn preview_serializes_with_guidance() {
        let value = serde_json::to_value(guard(rows(60))).unwrap();
        assert_eq!(value["status"], json!("success"));
        assert_eq!(value["preview_data"].as_array().map(Vec::len), Some(5));
        assert!(value.get("total").is_none());

        let value = serde_json::to_value(guard(rows(2))).unwrap();
        assert!(value.is_array());
    }
}
