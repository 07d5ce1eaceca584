//! Strict decoding of generated content.
//!
//! Generated text is untrusted. The content must hold exactly one JSON
//! object (optionally wrapped in a Markdown fence or surrounded by prose);
//! individual fields are then read leniently so that one malformed field
//! does not discard the rest of the record.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// A decoded JSON object.
pub type Fields = Map<String, Value>;

/// Decode content into a JSON object.
pub fn decode_object(content: &str) -> Result<Fields, DecodeError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(first_err) => embedded_json(trimmed)
            .ok_or_else(|| DecodeError::NotJson(first_err.to_string()))?,
    };

    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(DecodeError::NotAnObject(json_kind(&other))),
    }
}

/// Read one field, returning `None` when it is missing, null, or does not
/// match the expected type.
pub fn field<T: DeserializeOwned>(fields: &Fields, key: &str) -> Option<T> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => serde_json::from_value(value.clone()).ok(),
    }
}

/// Read an array field element by element, keeping the elements that match
/// `T`. A missing or non-array field reads as empty.
pub fn list_field<T: DeserializeOwned>(fields: &Fields, key: &str) -> Vec<T> {
    match fields.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// A nested object field.
pub fn object_field<'a>(fields: &'a Fields, key: &str) -> Option<&'a Fields> {
    fields.get(key).and_then(Value::as_object)
}

/// Read a string field, ignoring blank values.
pub fn text_field(fields: &Fields, key: &str) -> Option<String> {
    field::<String>(fields, key).filter(|s| !s.trim().is_empty())
}

/// Try to recover a JSON object from fenced or prose-wrapped content.
fn embedded_json(content: &str) -> Option<Value> {
    if let Some(fenced) = fenced_block(content) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced.trim()) {
            return Some(value);
        }
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&content[start..=end]).ok()
}

/// The body of the first Markdown code fence, without its language tag.
fn fenced_block(content: &str) -> Option<&str> {
    let open = content.find("```")?;
    let after_open = &content[open + 3..];
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_object() {
        let fields = decode_object(r#"{"problemType": "how_to"}"#).unwrap();
        assert_eq!(fields["problemType"], "how_to");
    }

    #[test]
    fn test_decode_fenced_object() {
        let content = "Here you go:\n```json\n{\"a\": [1, 2]}\n```\nThanks";
        let fields = decode_object(content).unwrap();
        assert_eq!(fields["a"][1], 2);
    }

    #[test]
    fn test_decode_prose_wrapped_object() {
        let fields = decode_object("Sure! {\"ok\": true} Hope that helps.").unwrap();
        assert_eq!(fields["ok"], true);
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert_eq!(decode_object("   "), Err(DecodeError::Empty));
        assert_eq!(decode_object("[1, 2]"), Err(DecodeError::NotAnObject("an array")));
        assert!(matches!(decode_object("not json at all"), Err(DecodeError::NotJson(_))));
    }

    #[test]
    fn test_field_tolerates_type_mismatch() {
        let fields = decode_object(r#"{"tasks": "oops", "entities": ["a"], "gone": null}"#).unwrap();
        assert_eq!(field::<Vec<String>>(&fields, "tasks"), None);
        assert_eq!(field::<Vec<String>>(&fields, "entities"), Some(vec!["a".to_string()]));
        assert_eq!(field::<Vec<String>>(&fields, "gone"), None);
        assert_eq!(text_field(&fields, "missing"), None);
    }

    #[test]
    fn test_list_field_keeps_matching_elements() {
        let fields = decode_object(r#"{"tasks": ["a", 3, "b", null], "one": "x"}"#).unwrap();
        assert_eq!(list_field::<String>(&fields, "tasks"), vec!["a", "b"]);
        assert!(list_field::<String>(&fields, "one").is_empty());
        assert!(list_field::<String>(&fields, "missing").is_empty());
    }

    #[test]
    fn test_object_field() {
        let fields = decode_object(r#"{"verdict": {"reason": "r"}, "flat": 1}"#).unwrap();
        assert_eq!(object_field(&fields, "verdict").unwrap()["reason"], "r");
        assert!(object_field(&fields, "flat").is_none());
    }
}
