use anyhow::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

/// The top-level key a route uses for its status messages. The account
/// routes answer with `{"error": ...}` while the note routes answer with
/// `{"message": ...}`, and clients depend on both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Envelope {
    Error,
    Message,
}

impl Envelope {
    pub fn key(self) -> &'static str {
        match self {
            Envelope::Error => "error",
            Envelope::Message => "message",
        }
    }

    pub fn wrap(self, message: impl Into<String>) -> Json<Value> {
        let mut body = Map::new();
        body.insert(self.key().to_string(), Value::String(message.into()));
        Json(Value::Object(body))
    }
}

#[derive(Debug)]
pub struct ServerError {
    status: StatusCode,
    envelope: Envelope,
    message: String,
    source: Option<Error>,
}

impl ServerError {
    fn new(
        status: StatusCode,
        envelope: Envelope,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            envelope,
            message: message.into(),
            source: None,
        }
    }

    pub fn bad_request(envelope: Envelope, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, envelope, message)
    }

    pub fn not_found(envelope: Envelope, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, envelope, message)
    }

    /// A 500 with no underlying fault. Failed sign-ins are reported this
    /// way and existing clients key off the status.
    pub fn rejected(envelope: Envelope, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, envelope, message)
    }

    pub fn internal(
        envelope: Envelope,
        message: impl Into<String>,
        source: impl Into<Error>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, envelope, message)
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let Some(source) = &self.source {
            tracing::error!(
                status = %self.status,
                "{}: {source:?}",
                self.message
            );
        }
        (self.status, self.envelope.wrap(self.message)).into_response()
    }
}

/// Turns any store or runtime failure into the route's generic 500, keeping
/// the cause for the server log only.
pub trait OrServerError<T> {
    fn or_server_error(
        self,
        envelope: Envelope,
        message: &'static str,
    ) -> Result<T, ServerError>;
}

impl<T, E> OrServerError<T> for Result<T, E>
where
    E: Into<Error>,
{
    fn or_server_error(
        self,
        envelope: Envelope,
        message: &'static str,
    ) -> Result<T, ServerError> {
        self.map_err(|e| ServerError::internal(envelope, message, e))
    }
}
