use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use fluxoazul_core::AuditEvent;

use super::AppState;
use crate::{
    auth::CallerIdentity,
    error::ApiError,
    security::{self, AuditEventRequest, NonceResponse},
};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Result<Json<ChatResponse>, ApiError> {
    let reply = state.chat.reply(&request.message).await?;
    Ok(Json(ChatResponse { reply }))
}

pub async fn nonce() -> Result<Response, ApiError> {
    let nonce = security::issue_nonce();
    let policy = security::content_security_policy(&nonce);
    let header_value = HeaderValue::from_str(&policy).map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut response = Json(NonceResponse {
        nonce,
        content_security_policy: policy,
    })
    .into_response();
    response.headers_mut().insert(header::CONTENT_SECURITY_POLICY, header_value);
    Ok(response)
}

pub async fn audit_event(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<AuditEventRequest>,
) -> Result<(StatusCode, Json<AuditEvent>), ApiError> {
    let event = security::record_audit_event(&state.repo(), &caller.name, request)?;
    Ok((StatusCode::CREATED, Json(event)))
}
