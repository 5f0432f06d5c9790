use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::NotesError;

/// A persisted note, serialized in table column order. The timestamp columns
/// only carry defaults, so rows written outside this service may hold NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Request body for create and update, kept as raw JSON values so that
/// title/content truthiness and the strict `completed == true` check can be
/// applied exactly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub completed: Option<Value>,
}

/// A validated note body, ready to be written by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub completed: bool,
}

impl NoteInput {
    pub fn into_draft(self) -> Result<NoteDraft, NotesError> {
        let title = truthy_text(self.title).ok_or(NotesError::TitleRequired)?;
        Ok(NoteDraft {
            title,
            content: truthy_text(self.content).unwrap_or_default(),
            completed: matches!(self.completed, Some(Value::Bool(true))),
        })
    }
}

/// Path ids are handed over untouched; anything that is not a 32-bit integer
/// is something the store would refuse.
pub fn parse_note_id(raw: &str) -> Result<i32, NotesError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| NotesError::InvalidId(raw.to_string()))
}

fn truthy_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(body: Value) -> NoteInput {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn content_defaults_to_empty_string() {
        let draft = input(json!({ "title": "Buy milk" })).into_draft().unwrap();
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.content, "");
        assert!(!draft.completed);
    }

    #[test]
    fn falsy_titles_are_rejected() {
        for body in [
            json!({}),
            json!({ "title": null }),
            json!({ "title": "" }),
            json!({ "title": false }),
            json!({ "title": 0 }),
            json!({ "content": "only content" }),
        ] {
            let err = input(body.clone()).into_draft().unwrap_err();
            assert!(matches!(err, NotesError::TitleRequired), "{body}");
        }
    }

    #[test]
    fn completed_requires_boolean_true() {
        for (value, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!("true"), false),
            (json!(1), false),
            (json!("yes"), false),
            (json!({}), false),
            (json!(null), false),
        ] {
            let draft = input(json!({ "title": "t", "completed": value.clone() }))
                .into_draft()
                .unwrap();
            assert_eq!(draft.completed, expected, "completed = {value}");
        }
    }

    #[test]
    fn non_string_values_keep_their_json_text() {
        let draft = input(json!({ "title": 42, "content": true }))
            .into_draft()
            .unwrap();
        assert_eq!(draft.title, "42");
        assert_eq!(draft.content, "true");

        let draft = input(json!({ "title": "t", "content": 0 })).into_draft().unwrap();
        assert_eq!(draft.content, "");
    }

    #[test]
    fn null_timestamps_are_carried_through() {
        let note: Note = serde_json::from_value(json!({
            "id": 3,
            "title": "undated",
            "content": null,
            "created_at": null,
            "updated_at": null,
            "completed": false,
        }))
        .unwrap();
        assert_eq!(note.created_at, None);
        let back = serde_json::to_value(&note).unwrap();
        assert_eq!(back["updated_at"], Value::Null);
    }

    #[test]
    fn note_ids_must_be_integers() {
        assert_eq!(parse_note_id("17").unwrap(), 17);
        assert_eq!(parse_note_id(" 8 ").unwrap(), 8);
        assert!(matches!(parse_note_id("abc"), Err(NotesError::InvalidId(_))));
        assert!(matches!(parse_note_id("99999999999"), Err(NotesError::InvalidId(_))));
        assert!(matches!(parse_note_id("1.5"), Err(NotesError::InvalidId(_))));
    }
}
