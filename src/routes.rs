use super::{controllers, middleware, models};
use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};

#[rustfmt::skip]
pub fn get_routes() -> Router<models::AppState> {
    Router::new()
        .route("/", get(controllers::root))
        .route("/api/signup", post(controllers::signup))
        .route("/api/signin", post(controllers::signin))
        .route("/api/notes", post(controllers::create_note))
        .route("/api/notes", get(controllers::list_notes))
        .route("/api/notes/:id", put(controllers::update_note))
        .route("/api/notes/:id", delete(controllers::delete_note))
}

/// The complete service: routes, the CORS policy and request logging.
/// Logging sits outermost so answered preflights are logged too.
pub fn app(state: models::AppState) -> Router {
    get_routes()
        .layer(middleware::cors())
        .layer(from_fn(middleware::log_requests))
        .with_state(state)
}
