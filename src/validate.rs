use serde_json::Value;

use crate::error::ApiError;

/// Schema check for song creation: `{"file": {"id": <integer>}}`. The id
/// may also arrive as an integer-valued string. Returns the referenced
/// file id.
pub fn song_create(payload: &Value) -> Result<i32, ApiError> {
    let file = payload
        .as_object()
        .and_then(|o| o.get("file"))
        .ok_or_else(|| invalid("'file' is a required property"))?;

    let id = file
        .as_object()
        .and_then(|o| o.get("id"))
        .ok_or_else(|| invalid("'file.id' is a required property"))?;

    match id {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| invalid("'file.id' is not a valid file id")),
        Value::String(s) => s
            .parse::<i32>()
            .map_err(|_| invalid("'file.id' is not a valid file id")),
        _ => Err(invalid("'file.id' must be an integer")),
    }
}

/// Schema check for song edit: `{"name": <non-empty string>}`. Returns the
/// new filename.
pub fn song_edit(payload: &Value) -> Result<String, ApiError> {
    let name = payload
        .as_object()
        .and_then(|o| o.get("name"))
        .ok_or_else(|| invalid("'name' is a required property"))?;

    match name.as_str() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        Some(_) => Err(invalid("'name' must not be empty")),
        None => Err(invalid("'name' must be a string")),
    }
}

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_accepts_integer_and_string_ids() {
        assert_eq!(song_create(&json!({"file": {"id": 7}})).unwrap(), 7);
        assert_eq!(song_create(&json!({"file": {"id": "7"}})).unwrap(), 7);
    }

    #[test]
    fn create_rejects_missing_or_malformed_references() {
        assert!(song_create(&json!({})).is_err());
        assert!(song_create(&json!({"file": 7})).is_err());
        assert!(song_create(&json!({"file": {}})).is_err());
        assert!(song_create(&json!({"file": {"id": "seven"}})).is_err());
        assert!(song_create(&json!({"file": {"id": true}})).is_err());
    }

    #[test]
    fn edit_requires_a_name_string() {
        assert_eq!(song_edit(&json!({"name": "new.mp3"})).unwrap(), "new.mp3");
        assert!(song_edit(&json!({})).is_err());
        assert!(song_edit(&json!({"name": 3})).is_err());
        assert!(song_edit(&json!({"name": ""})).is_err());
    }
}
