//! Record payload validation against an entity definition
//!
//! Runs between definition resolution and persistence: required fields must
//! be present and non-null, values must conform to their field type, select
//! values must come from the field's option list, and keys the definition
//! does not know are rejected.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tessera_api_types::{EntityField, FieldType};

/// One validation problem, keyed by the offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a record payload against the definition's ordered field list
///
/// Returns every issue found rather than stopping at the first, so clients
/// can fix a form in one round trip.
pub fn validate_record(fields: &[EntityField], data: &Value) -> Vec<FieldIssue> {
    let Value::Object(map) = data else {
        return vec![FieldIssue::new("$", "record data must be a JSON object")];
    };

    let mut issues = Vec::new();

    for key in map.keys() {
        if !fields.iter().any(|field| field.key == *key) {
            issues.push(FieldIssue::new(key, "unknown field"));
        }
    }

    for field in fields {
        let value = map.get(&field.key);
        match value {
            None | Some(Value::Null) => {
                if field.is_required {
                    issues.push(FieldIssue::new(&field.key, "required field is missing"));
                }
            }
            Some(value) => {
                if let Some(message) = check_type(field, value) {
                    issues.push(FieldIssue::new(&field.key, message));
                }
            }
        }
    }

    issues
}

/// Type/option conformance for a single non-null value
fn check_type(field: &EntityField, value: &Value) -> Option<String> {
    match field.field_type {
        FieldType::Text | FieldType::Textarea => value
            .as_str()
            .is_none()
            .then(|| format!("expected a string, got {}", kind_of(value))),
        FieldType::Email => match value.as_str() {
            Some(s) if s.contains('@') => None,
            Some(_) => Some("expected an email address".to_string()),
            None => Some(format!("expected a string, got {}", kind_of(value))),
        },
        FieldType::Url => match value.as_str() {
            Some(s) if s.starts_with("http://") || s.starts_with("https://") => None,
            Some(_) => Some("expected an http(s) URL".to_string()),
            None => Some(format!("expected a string, got {}", kind_of(value))),
        },
        FieldType::Phone => match value.as_str() {
            Some(s)
                if !s.trim().is_empty()
                    && s.chars()
                        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.')) =>
            {
                None
            }
            Some(_) => Some("expected a phone number".to_string()),
            None => Some(format!("expected a string, got {}", kind_of(value))),
        },
        FieldType::Number | FieldType::Currency => value
            .as_f64()
            .is_none()
            .then(|| format!("expected a number, got {}", kind_of(value))),
        FieldType::Checkbox => value
            .as_bool()
            .is_none()
            .then(|| format!("expected a boolean, got {}", kind_of(value))),
        FieldType::Date => match value.as_str() {
            Some(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => None,
            Some(_) => Some("expected a date in YYYY-MM-DD form".to_string()),
            None => Some(format!("expected a string, got {}", kind_of(value))),
        },
        FieldType::DateTime => match value.as_str() {
            Some(s) if DateTime::parse_from_rfc3339(s).is_ok() => None,
            Some(_) => Some("expected an RFC 3339 timestamp".to_string()),
            None => Some(format!("expected a string, got {}", kind_of(value))),
        },
        FieldType::Select => match value.as_str() {
            Some(s) if field.options.iter().any(|opt| opt == s) => None,
            Some(s) => Some(format!("{s:?} is not one of the field's options")),
            None => Some(format!("expected a string, got {}", kind_of(value))),
        },
        FieldType::MultiSelect => match value.as_array() {
            Some(items) => {
                for item in items {
                    match item.as_str() {
                        Some(s) if field.options.iter().any(|opt| opt == s) => {}
                        Some(s) => return Some(format!("{s:?} is not one of the field's options")),
                        None => return Some("expected an array of strings".to_string()),
                    }
                }
                None
            }
            None => Some(format!("expected an array, got {}", kind_of(value))),
        },
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
