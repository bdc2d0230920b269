use super::{project, DocumentStore, Filter, StoreResult};
use crate::models::{self, DocId, Document};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

/// Keeps the collection in a vector, in insertion order. Nothing is
/// persisted; the lock only guards the vector itself.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Document>>,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>> {
        let docs = self.docs.read().await;

        Ok(docs.iter().find(|d| filter.matches(d)).cloned())
    }

    async fn find(
        &self,
        filter: &Filter,
        projection: &[&str],
    ) -> StoreResult<Vec<Document>> {
        let docs = self.docs.read().await;

        Ok(docs
            .iter()
            .filter(|d| filter.matches(d))
            .map(|d| {
                if projection.is_empty() {
                    d.clone()
                } else {
                    project(d, projection)
                }
            })
            .collect())
    }

    async fn insert_one(&self, mut doc: Document) -> StoreResult<DocId> {
        let id = DocId::generate();
        doc.insert(models::ID.to_string(), Value::String(id.to_string()));
        self.docs.write().await.push(doc);

        Ok(id)
    }

    async fn update_one(
        &self,
        filter: &Filter,
        set: Document,
    ) -> StoreResult<u64> {
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(0);
        };
        for (field, value) in set {
            if field != models::ID {
                doc.insert(field, value);
            }
        }

        Ok(1)
    }

    async fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|d| filter.matches(d)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }
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

    #[tokio::test]
    async fn test_insert_assigns_fresh_id() {
        let store = MemoryStore::default();
        let id = store
            .insert_one(doc(json!({ "_id": "mine", "username": "jack" })))
            .await
            .unwrap();

        let found = store
            .find_one(&Filter::new().id(id))
            .await
            .unwrap()
            .expect("inserted doc");
        assert_eq!(found["_id"], json!(id.to_string()));
        assert_eq!(found["username"], json!("jack"));
        assert!(store
            .find_one(&Filter::new().field_eq("_id", "mine"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order() {
        let store = MemoryStore::default();
        for title in ["b", "a", "c"] {
            store
                .insert_one(doc(json!({ "username": "u", "title": title })))
                .await
                .unwrap();
        }
        store
            .insert_one(doc(json!({ "username": "u", "password": "pw" })))
            .await
            .unwrap();

        let notes = store
            .find(
                &Filter::new().field_eq("username", "u").exists("title"),
                &["title"],
            )
            .await
            .unwrap();
        let titles: Vec<_> = notes.iter().map(|n| n["title"].clone()).collect();
        assert_eq!(titles, vec![json!("b"), json!("a"), json!("c")]);
        assert!(notes.iter().all(|n| !n.contains_key("username")));
    }

    #[tokio::test]
    async fn test_update_and_delete_touch_one_doc() {
        let store = MemoryStore::default();
        let first = store
            .insert_one(doc(json!({ "username": "u", "title": "same" })))
            .await
            .unwrap();
        store
            .insert_one(doc(json!({ "username": "u", "title": "same" })))
            .await
            .unwrap();

        let same = Filter::new().field_eq("title", "same");
        let matched = store
            .update_one(&same, doc(json!({ "title": "changed" })))
            .await
            .unwrap();
        assert_eq!(matched, 1);
        let changed = store
            .find_one(&Filter::new().id(first))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed["title"], json!("changed"));

        assert_eq!(store.delete_one(&same).await.unwrap(), 1);
        assert_eq!(store.delete_one(&same).await.unwrap(), 0);
        assert_eq!(
            store
                .update_one(&same, doc(json!({ "title": "x" })))
                .await
                .unwrap(),
            0
        );
    }
}
