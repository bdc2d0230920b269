use super::db_ops::DocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr, sync::Arc};
use uuid::Uuid;

/// A schema-less record as it lives in the collection.
pub type Document = Map<String, Value>;

/// Key under which every document exposes its identifier.
pub const ID: &str = "_id";
pub const USERNAME: &str = "username";
pub const TITLE: &str = "title";
pub const NOTE: &str = "note";
pub const DATE: &str = "date";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DocumentStore>,
}

/// Store-generated document identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocId(Uuid);

impl DocId {
    pub fn generate() -> Self {
        DocId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for DocId {
    fn from(id: Uuid) -> Self {
        DocId(id)
    }
}

impl FromStr for DocId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DocId(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Serializes a record into the document shape the store expects.
pub fn to_document<T: Serialize>(record: &T) -> serde_json::Result<Document> {
    serde_json::from_value(serde_json::to_value(record)?)
}

/// A field only counts as supplied when it is present and non-empty.
fn supplied(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct User {
    pub name: Option<Value>,
    pub username: String,
    pub password: String,
    #[serde(rename = "Date")]
    pub date: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    pub name: Option<Value>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<Value>,
}

impl SignupForm {
    pub fn into_user(self) -> Option<User> {
        Some(User {
            username: supplied(self.username)?,
            password: supplied(self.password)?,
            name: self.name,
            date: self.date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn validate(self) -> Option<(String, String)> {
        Some((supplied(self.username)?, supplied(self.password)?))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub username: String,
    pub title: String,
    pub note: String,
    pub date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteForm {
    pub username: Option<String>,
    pub title: Option<String>,
    pub note: Option<String>,
    pub date: Option<String>,
}

impl NoteForm {
    pub fn into_note(self) -> Option<Note> {
        Some(Note {
            username: supplied(self.username)?,
            title: supplied(self.title)?,
            note: supplied(self.note)?,
            date: supplied(self.date)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteEdit {
    pub title: Option<String>,
    pub note: Option<String>,
}

impl NoteEdit {
    pub fn validate(self) -> Option<(String, String)> {
        Some((supplied(self.title)?, supplied(self.note)?))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub username: Option<String>,
}

impl OwnerQuery {
    pub fn validate(self) -> Option<String> {
        supplied(self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doc_id_round_trips_through_display() {
        let id = DocId::generate();
        let parsed: DocId = id.to_string().parse().expect("parses");
        assert_eq!(id, parsed);
        assert!("not-an-id".parse::<DocId>().is_err());
    }

    #[test]
    fn test_empty_strings_are_missing() {
        let form = NoteForm {
            username: Some("u".into()),
            title: Some("".into()),
            note: Some("n".into()),
            date: Some("d".into()),
        };
        assert!(form.into_note().is_none());

        let creds = Credentials {
            username: Some("u".into()),
            password: None,
        };
        assert!(creds.validate().is_none());
    }

    #[test]
    fn test_user_document_keeps_unset_fields_as_null() {
        let user = SignupForm {
            name: None,
            username: Some("jack".into()),
            password: Some("hunter2".into()),
            date: Some(json!(1700000000)),
        }
        .into_user()
        .expect("valid");
        let doc = to_document(&user).expect("serializes");
        assert_eq!(
            Value::Object(doc),
            json!({
                "name": null,
                "username": "jack",
                "password": "hunter2",
                "Date": 1700000000
            })
        );
    }
}
