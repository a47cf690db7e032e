//! Candidate and existing material records
//!
//! Records arrive either typed (from the CLI or the inventory file) or as
//! untyped JSON from a caller. Untyped input is read tolerantly: a field that
//! is missing or not a string is treated as absent instead of failing. Only
//! the overall shape (object / array) is validated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MatchError, Result};

/// Keys accepted for the origin tag in untyped input
const ORIGIN_KEYS: &[&str] = &["origin_tag", "originTag", "origin"];

/// Keys that are scored or identify the record; everything else is `extra`
const RESERVED_KEYS: &[&str] = &[
    "id",
    "name",
    "category",
    "subcategory",
    "origin_tag",
    "originTag",
    "origin",
];

/// A new material pending insertion, checked for duplicates first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    /// Exact-match key
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(
        default,
        alias = "originTag",
        alias = "origin",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_tag: Option<String>,
}

impl CandidateRecord {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            subcategory: None,
            origin_tag: None,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin_tag = Some(origin.into());
        self
    }

    /// Build a candidate from untyped JSON.
    ///
    /// Fails only when `value` is not an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            MatchError::InvalidArgument(format!(
                "candidate must be an object, got {}",
                type_name(value)
            ))
        })?;

        Ok(Self {
            name: string_field(obj, &["name"]).unwrap_or_default(),
            category: string_field(obj, &["category"]).unwrap_or_default(),
            subcategory: string_field(obj, &["subcategory"]),
            origin_tag: string_field(obj, ORIGIN_KEYS),
        })
    }
}

/// A previously stored material with a stable id
///
/// Display attributes such as quantity, unit and cost live in `extra` and
/// are never scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExistingRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(
        default,
        alias = "originTag",
        alias = "origin",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_tag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExistingRecord {
    /// Create a stored record from a candidate once it has an id
    pub fn from_candidate(id: impl Into<String>, candidate: &CandidateRecord) -> Self {
        Self {
            id: id.into(),
            name: candidate.name.clone(),
            category: candidate.category.clone(),
            subcategory: candidate.subcategory.clone(),
            origin_tag: candidate.origin_tag.clone(),
            extra: Map::new(),
        }
    }

    /// Build a record from untyped JSON.
    ///
    /// The id may be a string or a number; anything else is rejected since a
    /// match without an id cannot be merged into.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            MatchError::InvalidArgument(format!(
                "existing record must be an object, got {}",
                type_name(value)
            ))
        })?;

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(MatchError::InvalidArgument(
                    "existing record is missing a string or numeric id".to_string(),
                ))
            }
        };

        let extra = obj
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            name: string_field(obj, &["name"]).unwrap_or_default(),
            category: string_field(obj, &["category"]).unwrap_or_default(),
            subcategory: string_field(obj, &["subcategory"]),
            origin_tag: string_field(obj, ORIGIN_KEYS),
            extra,
        })
    }

    /// Stored quantity, if the record has a numeric one
    pub fn recorded_quantity(&self) -> Option<f64> {
        self.extra.get("quantity").and_then(Value::as_f64)
    }

    /// Quantity on hand, 0 when absent or not numeric
    pub fn quantity(&self) -> f64 {
        self.recorded_quantity().unwrap_or(0.0)
    }

    pub fn unit(&self) -> Option<&str> {
        self.extra.get("unit").and_then(Value::as_str)
    }

    pub fn cost(&self) -> Option<f64> {
        self.extra.get("cost").and_then(Value::as_f64)
    }
}

/// Parse a collection of existing records from untyped JSON.
///
/// Fails only when `value` is not an array. Elements that are not objects or
/// have no usable id are skipped, since they cannot be merged into.
pub fn records_from_value(value: &Value) -> Result<Vec<ExistingRecord>> {
    let items = value.as_array().ok_or_else(|| {
        MatchError::InvalidArgument(format!(
            "existing records must be an array, got {}",
            type_name(value)
        ))
    })?;

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match ExistingRecord::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("Skipping existing record at index {index}: {err}");
                None
            }
        })
        .collect())
}

/// First key holding a non-empty string
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_from_value() {
        let value = json!({
            "name": "Reclaimed Oak",
            "category": "wood",
            "subcategory": "oak",
            "originTag": "UK"
        });

        let candidate = CandidateRecord::from_value(&value).unwrap();
        assert_eq!(candidate.name, "Reclaimed Oak");
        assert_eq!(candidate.category, "wood");
        assert_eq!(candidate.subcategory.as_deref(), Some("oak"));
        assert_eq!(candidate.origin_tag.as_deref(), Some("UK"));
    }

    #[test]
    fn test_candidate_non_string_fields_are_absent() {
        let value = json!({
            "name": "Steel Bracket",
            "category": "metal",
            "subcategory": 42,
            "origin_tag": null
        });

        let candidate = CandidateRecord::from_value(&value).unwrap();
        assert!(candidate.subcategory.is_none());
        assert!(candidate.origin_tag.is_none());
    }

    #[test]
    fn test_candidate_rejects_non_object() {
        let err = CandidateRecord::from_value(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_existing_record_keeps_display_attributes() {
        let value = json!({
            "id": 7,
            "name": "Hemp Fibre",
            "category": "textile",
            "quantity": 12.5,
            "unit": "kg",
            "cost": 3.2
        });

        let record = ExistingRecord::from_value(&value).unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.quantity(), 12.5);
        assert_eq!(record.unit(), Some("kg"));
        assert_eq!(record.cost(), Some(3.2));
        assert!(!record.extra.contains_key("name"));
    }

    #[test]
    fn test_existing_record_requires_id() {
        let err = ExistingRecord::from_value(&json!({"name": "x", "category": "y"})).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
    }

    #[test]
    fn test_records_from_value_skips_unusable_elements() {
        let records = records_from_value(&json!([
            {"id": "a", "name": "Oak", "category": "wood"},
            {"id": null, "name": "Pine", "category": "wood"},
            {"id": "", "name": "Ash", "category": "wood"},
            {"id": [1], "name": "Elm", "category": "wood"},
            "not a record",
            {"id": 9, "name": "Birch", "category": "wood"}
        ]))
        .unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "9"]);
    }

    #[test]
    fn test_recorded_quantity() {
        let record = ExistingRecord::from_value(&json!({"id": "a", "quantity": "lots"})).unwrap();
        assert_eq!(record.recorded_quantity(), None);
        assert_eq!(record.quantity(), 0.0);
    }

    #[test]
    fn test_records_from_value_rejects_non_array() {
        let err = records_from_value(&json!({"id": "a"})).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
    }

    #[test]
    fn test_existing_record_serde_flattens_extra() {
        let record: ExistingRecord = serde_json::from_value(json!({
            "id": "abc",
            "name": "Cork Sheet",
            "category": "cork",
            "quantity": 4
        }))
        .unwrap();
        assert_eq!(record.quantity(), 4.0);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["quantity"], 4);
        assert!(back.get("subcategory").is_none());
    }
}
