use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use fluxoazul_core::AuditEvent;

use super::AppState;
use crate::{
    auth::CallerIdentity,
    error::ApiError,
    repository::Repository,
    security::{record_audit_event, AuditEventRequest},
    session::{SaveCallback, SessionStatus},
};

/// Leaves an audit trail when an idle session is signed out.
fn audit_on_expire(state: &AppState, owner: &str) -> SaveCallback {
    let repo: Repository<AuditEvent> = state.repo();
    let owner = owner.to_string();
    Box::new(move || {
        Box::pin(async move {
            let request = AuditEventRequest {
                event_type: "session_expired".to_string(),
                details: json!({ "reason": "idle" }),
            };
            if let Err(e) = record_audit_event(&repo, &owner, request) {
                tracing::warn!(error = %e, owner = %owner, "Failed to record session expiry");
            }
        })
    })
}

pub async fn start(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<(StatusCode, Json<SessionStatus>), ApiError> {
    let on_expire = audit_on_expire(&state, &caller.name);
    let status = state.sessions.start(&caller.name, Some(on_expire))?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn status(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionStatus>, ApiError> {
    Ok(Json(state.sessions.status(id)?))
}

pub async fn touch(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionStatus>, ApiError> {
    Ok(Json(state.sessions.touch(id)?))
}

pub async fn end(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.sessions.end(id)?;
    Ok(StatusCode::NO_CONTENT)
}
