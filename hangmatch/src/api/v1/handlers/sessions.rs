use axum::extract::{Path, State};
use axum::Json;
use nanoid::nanoid;

use crate::api::state::AppState;
use crate::api::v1::dto::sessions::{CreateSessionRequest, SessionResponse};
use crate::api::v1::response::ApiResponse;
use crate::error::Result;
use crate::models::IntentSession;

/// `POST /api/v1/sessions`
///
/// Opens a new intent session for the user. Any session the user already has
/// open is deactivated first, so each user holds at most one live intent.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Invalid request"),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResponse<SessionResponse> {
    if let Err(e) = req.validate() {
        return e.into();
    }

    match create_session_inner(&state, req).await {
        Ok(session) => ApiResponse::created(session.into()),
        Err(e) => e.into(),
    }
}

async fn create_session_inner(
    state: &AppState,
    req: CreateSessionRequest,
) -> Result<IntentSession> {
    let replaced = state.db.deactivate_sessions_for_user(&req.user_id).await?;
    if replaced > 0 {
        tracing::debug!(user_id = %req.user_id, replaced, "deactivated previous intent sessions");
    }

    let mut session = IntentSession::new(
        nanoid!(),
        req.user_id,
        req.mood,
        state.config.session.ttl_hours,
    );
    if let Some(energy) = req.energy_level {
        session.energy_level = energy;
    }
    session.activity_types = req.activity_types;
    session.time_windows = req.time_windows;
    session.wants_to_do = req.wants_to_do;
    session.does_not_want = req.does_not_want;
    session.emotional_intent_metadata = req
        .emotional_intent_metadata
        .unwrap_or(serde_json::Value::Null);

    state.db.create_session(&session).await?;
    tracing::info!(session_id = %session.id, user_id = %session.user_id, "intent session created");
    Ok(session)
}

/// `GET /api/v1/sessions/{sessionId}`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Intent session ID")),
    responses(
        (status = 200, description = "Session found", body = SessionResponse),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<SessionResponse> {
    match state.db.get_session_by_id(&session_id).await {
        Ok(Some(session)) => ApiResponse::success(session.into()),
        Ok(None) => crate::error::HangError::NotFound(format!("intent session {session_id}")).into(),
        Err(e) => e.into(),
    }
}
