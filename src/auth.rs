//! Account records. Passwords are stored and compared as plain text, and a
//! successful sign-in hands the whole record (password included) back to
//! the caller; clients of this API rely on that shape.

use super::{
    db_ops::{DocumentStore, Filter},
    models::{self, Document, User},
};
use anyhow::Result;

#[derive(Debug, PartialEq, Eq)]
pub enum Registration {
    Created,
    UsernameTaken,
}

/// The lookup and the insert are two separate store calls, so two
/// concurrent registrations of one username can both succeed.
pub async fn register(
    db: &dyn DocumentStore,
    user: &User,
) -> Result<Registration> {
    let same_name =
        Filter::new().field_eq(models::USERNAME, &user.username[..]);
    if db.find_one(&same_name).await?.is_some() {
        return Ok(Registration::UsernameTaken);
    }
    db.insert_one(models::to_document(user)?).await?;

    Ok(Registration::Created)
}

/// Returns the stored record when both fields match exactly.
pub async fn authenticate(
    db: &dyn DocumentStore,
    username: &str,
    password: &str,
) -> Result<Option<Document>> {
    let user = db
        .find_one(
            &Filter::new()
                .field_eq(models::USERNAME, username)
                .field_eq("password", password),
        )
        .await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_ops::MemoryStore;
    use serde_json::json;

    fn jack() -> User {
        User {
            name: Some(json!("Jack")),
            username: "jack".to_string(),
            password: "hunter2".to_string(),
            date: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let db = MemoryStore::default();
        assert_eq!(
            register(&db, &jack()).await.unwrap(),
            Registration::Created
        );
        assert_eq!(
            register(&db, &jack()).await.unwrap(),
            Registration::UsernameTaken
        );

        let user = authenticate(&db, "jack", "hunter2")
            .await
            .unwrap()
            .expect("signed in");
        assert_eq!(user["password"], json!("hunter2"));
        assert_eq!(user["name"], json!("Jack"));
        assert!(user.contains_key("_id"));

        assert!(authenticate(&db, "jack", "hunter3")
            .await
            .unwrap()
            .is_none());
        assert!(authenticate(&db, "jill", "hunter2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_note_owner_does_not_block_registration() {
        let db = MemoryStore::default();
        db.insert_one(
            models::to_document(&models::Note {
                username: "jack".into(),
                title: "t".into(),
                note: "n".into(),
                date: "d".into(),
            })
            .unwrap(),
        )
        .await
        .unwrap();

        // Any record carrying the username counts, notes included.
        assert_eq!(
            register(&db, &jack()).await.unwrap(),
            Registration::UsernameTaken
        );
    }
}
