use std::sync::Arc;

use axum::{
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

/// Authenticated caller identity, available to handlers via request extensions.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub name: String,
    pub role: String,
}

impl CallerIdentity {
    pub fn can_write(&self) -> bool {
        matches!(self.role.as_str(), "writer" | "admin")
    }
}

#[derive(Serialize)]
struct AuthError {
    success: bool,
    error: String,
}

fn reject(status: StatusCode, error: &str) -> Response {
    (status, Json(AuthError {
        success: false,
        error: error.to_string(),
    }))
    .into_response()
}

fn is_mutation(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub async fn auth_middleware<B>(
    Extension(config): Extension<Arc<AuthConfig>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Response {
    if !config.enabled {
        req.extensions_mut().insert(CallerIdentity {
            name: "anonymous".to_string(),
            role: "admin".to_string(),
        });
        return next.run(req).await;
    }

    let api_key = req.headers()
        .get("X-API-Key")
        .or_else(|| req.headers().get(header::AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s));

    let Some(key) = api_key else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "Missing API key. Provide X-API-Key header or Authorization: Bearer <key>",
        );
    };

    match config.api_keys.iter().find(|entry| entry.key.as_bytes().ct_eq(key.as_bytes()).into()) {
        Some(entry) => {
            tracing::debug!(caller = %entry.name, role = %entry.role, "Authenticated request");
            req.extensions_mut().insert(CallerIdentity {
                name: entry.name.clone(),
                role: entry.role.clone(),
            });
            next.run(req).await
        }
        None => {
            tracing::warn!("Invalid API key presented");
            reject(StatusCode::UNAUTHORIZED, "Invalid API key")
        }
    }
}

/// Rejects data-changing requests from callers without the writer or admin role.
/// Runs inside `auth_middleware`.
pub async fn require_writer<B>(req: Request<B>, next: Next<B>) -> Response {
    if !is_mutation(req.method()) {
        return next.run(req).await;
    }

    match req.extensions().get::<CallerIdentity>() {
        Some(caller) if caller.can_write() => next.run(req).await,
        Some(caller) => {
            tracing::warn!(caller = %caller.name, method = %req.method(), path = %req.uri().path(), "Write rejected for read-only key");
            reject(StatusCode::FORBIDDEN, "API key is not allowed to modify data")
        }
        None => reject(StatusCode::UNAUTHORIZED, "Missing caller identity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let reader = CallerIdentity { name: "bi".into(), role: "reader".into() };
        let writer = CallerIdentity { name: "front".into(), role: "writer".into() };
        let admin = CallerIdentity { name: "ops".into(), role: "admin".into() };
        assert!(!reader.can_write());
        assert!(writer.can_write());
        assert!(admin.can_write());
    }

    #[test]
    fn test_is_mutation() {
        assert!(!is_mutation(&Method::GET));
        assert!(is_mutation(&Method::POST));
        assert!(is_mutation(&Method::PATCH));
        assert!(is_mutation(&Method::DELETE));
    }
}
