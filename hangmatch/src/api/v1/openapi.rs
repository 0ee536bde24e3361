use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hangmatch API",
        version = "1.0.0",
        description = "Hangout matching service. Scores active intent sessions \
                       against each other and suggests who to meet and where.",
    ),
    paths(
        handlers::health::health_check,
        handlers::sessions::create_session,
        handlers::sessions::get_session,
        handlers::matches::find_matches,
        handlers::matches::list_session_matches,
        handlers::matches::accept_match,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Shared models
        models::TimeWindow,
        models::ScoreBreakdown,
        models::Venue,
        models::MatchStatus,
        // Sessions
        dto::sessions::CreateSessionRequest,
        dto::sessions::SessionResponse,
        // Matches
        dto::matching::FindMatchesRequest,
        dto::matching::MatchResponse,
        dto::matching::FindMatchesResponse,
        dto::matching::ListMatchesResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::VenueSearchStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "sessions", description = "Intent session lifecycle"),
        (name = "matches", description = "Matching runs and match records"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
