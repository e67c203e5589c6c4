use axum::{
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use fluxoazul_core::AuditEvent;

use crate::repository::{Repository, RepositoryError};

#[derive(Debug, Clone, Serialize)]
pub struct NonceResponse {
    pub nonce: String,
    pub content_security_policy: String,
}

/// Fresh single-use nonce for inline scripts and styles.
pub fn issue_nonce() -> String {
    STANDARD.encode(Uuid::new_v4().as_bytes())
}

pub fn content_security_policy(nonce: &str) -> String {
    format!(
        "default-src 'self'; script-src 'self' 'nonce-{nonce}'; style-src 'self' 'nonce-{nonce}'; \
         img-src 'self' data:; connect-src 'self'; object-src 'none'; base-uri 'self'; frame-ancestors 'none'"
    )
}

pub async fn security_headers<B>(req: Request<B>, next: Next<B>) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin"));
    response
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditEventRequest {
    pub event_type: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Stores an audit event and mirrors it on the `audit` log target.
pub fn record_audit_event(
    repo: &Repository<AuditEvent>,
    actor: &str,
    request: AuditEventRequest,
) -> Result<AuditEvent, RepositoryError> {
    let event = repo.create(AuditEvent {
        id: Uuid::nil(),
        event_type: request.event_type,
        actor: actor.to_string(),
        details: request.details,
        occurred_at: OffsetDateTime::now_utc(),
    })?;

    metrics::increment_counter!("fluxoazul_audit_events_total");
    tracing::info!(
        target: "audit",
        id = %event.id,
        event_type = %event.event_type,
        actor = %event.actor,
        details = %event.details,
        "Security event recorded"
    );
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    #[test]
    fn test_nonce_is_fresh_base64() {
        let a = issue_nonce();
        let b = issue_nonce();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), 16);
    }

    #[test]
    fn test_policy_embeds_nonce() {
        let policy = content_security_policy("abc123");
        assert!(policy.contains("script-src 'self' 'nonce-abc123'"));
        assert!(policy.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_record_audit_event() {
        let repo: Repository<AuditEvent> = Repository::new(InMemoryStorage::shared());
        let event = record_audit_event(&repo, "front", AuditEventRequest {
            event_type: "csp_violation".to_string(),
            details: serde_json::json!({ "blocked_uri": "inline" }),
        })
        .unwrap();

        assert!(!event.id.is_nil());
        let stored = repo.list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].actor, "front");
        assert_eq!(stored[0].details["blocked_uri"], "inline");
    }
}
