use super::{
    auth::{self, Registration},
    db_ops::Filter,
    errors::{Envelope, OrServerError, ServerError},
    extractors::{JsonBody, QueryParams},
    models::{
        self, AppState, Credentials, DocId, NoteEdit, NoteForm, OwnerQuery,
        SignupForm,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};

/// `Date.prototype.toLocaleString()` as rendered for en-US, which is what
/// clients already display, e.g. `10/16/2026, 3:04:05 PM`.
const LOCALE_TIMESTAMP: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub fn local_timestamp() -> String {
    chrono::Local::now().format(LOCALE_TIMESTAMP).to_string()
}

pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, Envelope::Message.wrap("Server started..."))
}

pub async fn signup(
    State(AppState { db }): State<AppState>,
    JsonBody(form): JsonBody<SignupForm>,
) -> Result<impl IntoResponse, ServerError> {
    let Some(user) = form.into_user() else {
        return Err(ServerError::bad_request(
            Envelope::Error,
            "Username and password are required",
        ));
    };

    match auth::register(&*db, &user)
        .await
        .or_server_error(Envelope::Error, "Something went wrong")?
    {
        Registration::Created => Ok((
            StatusCode::OK,
            Envelope::Message.wrap("User added successfully"),
        )),
        Registration::UsernameTaken => Err(ServerError::bad_request(
            Envelope::Error,
            "Username already exists",
        )),
    }
}

pub async fn signin(
    State(AppState { db }): State<AppState>,
    JsonBody(creds): JsonBody<Credentials>,
) -> Result<impl IntoResponse, ServerError> {
    let Some((username, password)) = creds.validate() else {
        return Err(ServerError::bad_request(
            Envelope::Error,
            "Username and password are required",
        ));
    };

    let user = auth::authenticate(&*db, &username, &password)
        .await
        .or_server_error(Envelope::Error, "Something went wrong")?
        .ok_or_else(|| {
            ServerError::rejected(
                Envelope::Error,
                "User not found. Invalid credentials.",
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Sign-in successful! Welcome.",
            "user": user,
        })),
    ))
}

pub async fn create_note(
    State(AppState { db }): State<AppState>,
    JsonBody(form): JsonBody<NoteForm>,
) -> Result<impl IntoResponse, ServerError> {
    const FAILED: &str = "An error occured while adding note....";
    let Some(note) = form.into_note() else {
        return Err(ServerError::bad_request(
            Envelope::Message,
            "All fields are required.",
        ));
    };

    let doc = models::to_document(&note)
        .or_server_error(Envelope::Message, FAILED)?;
    let id = db
        .insert_one(doc)
        .await
        .or_server_error(Envelope::Message, FAILED)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Notes saved successfully..!",
            "noteId": id.to_string(),
        })),
    ))
}

pub async fn list_notes(
    State(AppState { db }): State<AppState>,
    QueryParams(query): QueryParams<OwnerQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let Some(username) = query.validate() else {
        return Err(ServerError::bad_request(
            Envelope::Message,
            "Username is required",
        ));
    };

    let notes = db
        .find(
            &Filter::new()
                .field_eq(models::USERNAME, username)
                .exists(models::TITLE),
            &[models::TITLE, models::NOTE, models::DATE],
        )
        .await
        .or_server_error(Envelope::Message, "Internal Server Error")?;

    Ok((StatusCode::OK, Json(notes)))
}

pub async fn update_note(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
    JsonBody(edit): JsonBody<NoteEdit>,
) -> Result<impl IntoResponse, ServerError> {
    const FAILED: &str = "Internal server error.";
    let Some((title, note)) = edit.validate() else {
        return Err(ServerError::bad_request(
            Envelope::Message,
            "Title and note contents are required.",
        ));
    };
    let id: DocId = id.parse().or_server_error(Envelope::Message, FAILED)?;

    // Any caller who knows the id may edit the note; ownership is not
    // checked here, unlike `delete_note`.
    let mut set = Map::new();
    set.insert(models::TITLE.to_string(), Value::String(title));
    set.insert(models::NOTE.to_string(), Value::String(note));
    set.insert(models::DATE.to_string(), Value::String(local_timestamp()));
    let matched = db
        .update_one(&Filter::new().id(id).exists(models::TITLE), set)
        .await
        .or_server_error(Envelope::Message, FAILED)?;
    if matched == 0 {
        return Err(ServerError::not_found(
            Envelope::Message,
            "Note not found.",
        ));
    }

    Ok((
        StatusCode::OK,
        Envelope::Message.wrap("Note updated successfully."),
    ))
}

pub async fn delete_note(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<OwnerQuery>,
) -> Result<impl IntoResponse, ServerError> {
    const FAILED: &str = "Server error";
    let Some(username) = query.validate() else {
        return Err(ServerError::bad_request(
            Envelope::Message,
            "Username is required",
        ));
    };
    tracing::debug!(%username, %id, "deleting note");
    let id: DocId = id.parse().or_server_error(Envelope::Message, FAILED)?;

    let deleted = db
        .delete_one(
            &Filter::new()
                .id(id)
                .field_eq(models::USERNAME, username)
                .exists(models::TITLE),
        )
        .await
        .or_server_error(Envelope::Message, FAILED)?;
    if deleted == 0 {
        return Err(ServerError::not_found(
            Envelope::Message,
            "Note not found",
        ));
    }

    Ok((
        StatusCode::OK,
        Envelope::Message.wrap("Note deleted successfully"),
    ))
}
