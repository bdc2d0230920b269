use super::errors::{Envelope, ServerError};
use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query,
    },
    http::{request::Parts, Request},
    Json,
};

/// JSON request body that never fails on a missing body. A request without
/// a JSON content type deserializes to `T::default()`, so the handler's own
/// field validation answers it. Unparseable JSON is a 400.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for JsonBody<T>
where
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    T: Default,
    S: Send + Sync,
    B: Send + 'static,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request<B>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => {
                Ok(JsonBody(T::default()))
            }
            Err(rejection) => Err(ServerError::bad_request(
                Envelope::Error,
                rejection.body_text(),
            )),
        }
    }
}

/// Query string whose rejection keeps the JSON envelope of the note routes,
/// instead of axum's plain-text 400.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(ServerError::bad_request(
                Envelope::Message,
                rejection.body_text(),
            )),
        }
    }
}
