use axum::extract::{Path, State};
use axum::Json;

use crate::api::state::AppState;
use crate::api::v1::dto::matching::{
    FindMatchesRequest, FindMatchesResponse, ListMatchesResponse, MatchResponse,
};
use crate::api::v1::response::{ApiResponse, ResponseMeta};
use crate::error::{HangError, Result};
use crate::models::{MatchRecord, MatchStatus};

/// `POST /api/v1/matches:find`
///
/// Runs the matching engine against the given session and returns the ranked
/// matches. Each call is a fresh run; previously persisted records for the
/// session are left untouched.
#[utoipa::path(
    post,
    path = "/api/v1/matches:find",
    tag = "matches",
    request_body = FindMatchesRequest,
    responses(
        (status = 200, description = "Matching run completed", body = FindMatchesResponse),
        (status = 400, description = "Session expired or inactive"),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn find_matches(
    State(state): State<AppState>,
    Json(req): Json<FindMatchesRequest>,
) -> ApiResponse<FindMatchesResponse> {
    match state.engine.run(&req.session_id).await {
        Ok(outcome) => ApiResponse::success(outcome.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/sessions/{sessionId}/matches`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}/matches",
    tag = "matches",
    params(("sessionId" = String, Path, description = "Intent session ID")),
    responses(
        (status = 200, description = "Persisted matches, best first", body = ListMatchesResponse),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn list_session_matches(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<ListMatchesResponse> {
    match list_matches_inner(&state, &session_id).await {
        Ok(records) => {
            let total = records.len() as u64;
            ApiResponse::success_with_meta(
                ListMatchesResponse {
                    matches: records.into_iter().map(MatchResponse::from).collect(),
                },
                ResponseMeta { total: Some(total) },
            )
        }
        Err(e) => e.into(),
    }
}

async fn list_matches_inner(state: &AppState, session_id: &str) -> Result<Vec<MatchRecord>> {
    if state.db.get_session_by_id(session_id).await?.is_none() {
        return Err(HangError::NotFound(format!("intent session {session_id}")));
    }
    state.db.list_matches_for_session(session_id).await
}

/// `POST /api/v1/matches/{matchId}:accept`
///
/// Transitions a match from `suggested` to `accepted`. Idempotent: accepting
/// an already-accepted match returns it unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/matches/{matchId}:accept",
    tag = "matches",
    params(("matchId" = String, Path, description = "Match record ID")),
    responses(
        (status = 200, description = "Match accepted", body = MatchResponse),
        (status = 404, description = "Match not found"),
    )
)]
pub async fn accept_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResponse<MatchResponse> {
    match accept_match_inner(&state, &match_id).await {
        Ok(record) => ApiResponse::success(record.into()),
        Err(e) => e.into(),
    }
}

async fn accept_match_inner(state: &AppState, match_id: &str) -> Result<MatchRecord> {
    let updated = state
        .db
        .update_match_status(match_id, MatchStatus::Accepted)
        .await?;
    if !updated {
        return Err(HangError::NotFound(format!("match {match_id}")));
    }
    tracing::info!(%match_id, "match accepted");

    state
        .db
        .get_match_by_id(match_id)
        .await?
        .ok_or_else(|| HangError::NotFound(format!("match {match_id}")))
}
