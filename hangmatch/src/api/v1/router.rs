use axum::{
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;

pub fn v1_router() -> Router<AppState> {
    let sessions = Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route("/{sessionId}", get(handlers::sessions::get_session))
        .route(
            "/{sessionId}/matches",
            get(handlers::matches::list_session_matches),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router())
        .nest("/sessions", sessions)
        .route("/matches:find", post(handlers::matches::find_matches))
        .route(
            "/matches/{matchId}:accept",
            post(handlers::matches::accept_match),
        )
}
