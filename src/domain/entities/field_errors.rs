use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// フィールド単位のバリデーションエラー
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `{"field": ["msg", ...]}` / `{"field": "msg"}` 形式のボディを読む
    ///
    /// 配列や認識できない形式は `non_field_errors` にまとめる。
    pub fn from_json(body: &Value) -> Self {
        let mut errors = Self::new();
        let source = body
            .get("field_errors")
            .or_else(|| body.get("errors"))
            .unwrap_or(body);

        match source {
            Value::Object(map) => {
                for (field, value) in map {
                    match value {
                        Value::Array(items) => {
                            for item in items {
                                errors.add(field, message_text(item));
                            }
                        }
                        other => errors.add(field, message_text(other)),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    errors.add(NON_FIELD_ERRORS, message_text(item));
                }
            }
            Value::Null => {}
            other => errors.add(NON_FIELD_ERRORS, message_text(other)),
        }

        if errors.is_empty() {
            errors.add(NON_FIELD_ERRORS, "request was rejected");
        }
        errors
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_list_and_scalar_messages() {
        let errors = FieldErrors::from_json(&json!({
            "name": ["This field may not be blank."],
            "charge_out_rate": "Must be positive"
        }));
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("name"),
            Some(&["This field may not be blank.".to_string()][..])
        );
        assert_eq!(
            errors.get("charge_out_rate"),
            Some(&["Must be positive".to_string()][..])
        );
    }

    #[test]
    fn unwraps_nested_error_container() {
        let errors = FieldErrors::from_json(&json!({
            "field_errors": {"contact_id": ["Unknown contact"]}
        }));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["contact_id"]);
    }

    #[test]
    fn unrecognised_bodies_become_non_field_errors() {
        let errors = FieldErrors::from_json(&json!("bad request"));
        assert_eq!(
            errors.get(NON_FIELD_ERRORS),
            Some(&["bad request".to_string()][..])
        );

        let empty = FieldErrors::from_json(&json!({}));
        assert!(empty.get(NON_FIELD_ERRORS).is_some());
    }

    #[test]
    fn array_bodies_keep_each_message() {
        let errors = FieldErrors::from_json(&json!({"errors": ["a", "b"]}));
        assert_eq!(
            errors.get(NON_FIELD_ERRORS),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(errors.len(), 1);

        let bare = FieldErrors::from_json(&json!(["Job is locked"]));
        assert_eq!(
            bare.get(NON_FIELD_ERRORS),
            Some(&["Job is locked".to_string()][..])
        );
    }
}
