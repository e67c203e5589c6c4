use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use fluxoazul_core::{money::AmountOverflow, FinanceError, StorageError, ValidationError};

use crate::{cash_flow::CashFlowError, repository::RepositoryError, session::SessionError, support_chat::ChatError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(ValidationError),
    #[error(transparent)]
    Finance(#[from] FinanceError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Finance(FinanceError::UndefinedRatio(_) | FinanceError::Overflow(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Finance(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Chat(ChatError::EmptyMessage) => StatusCode::BAD_REQUEST,
            ApiError::Chat(ChatError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Chat(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }
        (status, Json(ErrorBody {
            success: false,
            error: self.to_string(),
        }))
        .into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Finance(finance) => ApiError::Finance(finance),
            ValidationError::Overflow(overflow) => overflow.into(),
            other => ApiError::Validation(other),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            StorageError::AlreadyExists { .. } => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Validation(v) => v.into(),
            RepositoryError::Storage(s) => s.into(),
            RepositoryError::Serialization(s) => ApiError::Internal(s.to_string()),
        }
    }
}

impl From<AmountOverflow> for ApiError {
    fn from(e: AmountOverflow) -> Self {
        ApiError::Finance(FinanceError::Overflow(e))
    }
}

impl From<CashFlowError> for ApiError {
    fn from(e: CashFlowError) -> Self {
        match e {
            CashFlowError::Overflow(overflow) => overflow.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => ApiError::NotFound(e.to_string()),
            SessionError::Expired(_) => ApiError::Unauthorized(e.to_string()),
            SessionError::Poisoned => ApiError::Internal(e.to_string()),
        }
    }
}
