//! The document store behind every route. Handlers only ever see
//! [`DocumentStore`]; which backend sits behind it is decided once, at
//! startup, by [`connect`].

use super::{
    config,
    models::{self, DocId, Document},
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Conjunction of conditions a document has to satisfy.
///
/// Existence checks are the only thing telling notes apart from users:
/// a note is anything with a `title`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    pub id: Option<DocId>,
    pub equals: Vec<(&'static str, Value)>,
    pub exists: Vec<&'static str>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: DocId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn field_eq(
        mut self,
        field: &'static str,
        value: impl Into<Value>,
    ) -> Self {
        self.equals.push((field, value.into()));
        self
    }

    pub fn exists(mut self, field: &'static str) -> Self {
        self.exists.push(field);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let id_matches = match self.id {
            Some(id) => {
                doc.get(models::ID).and_then(Value::as_str)
                    == Some(&id.to_string()[..])
            }
            None => true,
        };

        id_matches
            && self
                .equals
                .iter()
                .all(|(field, value)| doc.get(*field) == Some(value))
            && self.exists.iter().all(|field| doc.contains_key(*field))
    }
}

/// Keeps `_id` plus whichever of `fields` the document actually has.
pub fn project(doc: &Document, fields: &[&str]) -> Document {
    doc.iter()
        .filter(|(k, _)| {
            k.as_str() == models::ID || fields.contains(&k.as_str())
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<Map<_, _>>()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>>;

    /// All matches in insertion order, each cut down to `projection`. An
    /// empty projection returns whole documents.
    async fn find(
        &self,
        filter: &Filter,
        projection: &[&str],
    ) -> StoreResult<Vec<Document>>;

    /// Stores `doc` under a freshly generated id, ignoring any `_id` the
    /// caller put in it.
    async fn insert_one(&self, doc: Document) -> StoreResult<DocId>;

    /// Overwrites `set` on the first match. Returns how many documents
    /// matched (0 or 1).
    async fn update_one(&self, filter: &Filter, set: Document)
        -> StoreResult<u64>;

    /// Removes the first match. Returns how many documents were deleted
    /// (0 or 1).
    async fn delete_one(&self, filter: &Filter) -> StoreResult<u64>;
}

pub async fn connect(url: &str) -> StoreResult<Arc<dyn DocumentStore>> {
    if url == config::MEMORY_URL {
        info!("Using the in-memory document store");
        return Ok(Arc::new(MemoryStore::default()));
    }
    let store = PgStore::connect(url, config::COLLECTION_NAME).await?;
    info!("Connected to the database");

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_filter_matches() {
        let id = DocId::generate();
        let note = doc(json!({
            "_id": id.to_string(),
            "username": "jack",
            "title": "groceries",
            "note": "eggs",
            "date": "today"
        }));
        let user = doc(json!({
            "_id": DocId::generate().to_string(),
            "username": "jack",
            "password": "pw"
        }));

        let notes_of_jack =
            Filter::new().field_eq("username", "jack").exists("title");
        assert!(notes_of_jack.matches(&note));
        assert!(!notes_of_jack.matches(&user));

        assert!(Filter::new().id(id).matches(&note));
        assert!(!Filter::new().id(id).matches(&user));
        assert!(!Filter::new().field_eq("username", "jill").matches(&note));
        assert!(Filter::new().matches(&user));
    }

    #[test]
    fn test_exists_counts_null_values() {
        let odd = doc(json!({ "username": "jack", "title": null }));
        assert!(Filter::new().exists("title").matches(&odd));
    }

    #[test]
    fn test_project_keeps_id() {
        let full = doc(json!({
            "_id": "abc",
            "username": "jack",
            "title": "t",
            "note": "n"
        }));
        let projected = project(&full, &["title", "note", "date"]);
        assert_eq!(
            Value::Object(projected),
            json!({ "_id": "abc", "title": "t", "note": "n" })
        );
    }
}
