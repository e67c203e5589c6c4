use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use uuid::Uuid;

use fluxoazul_core::{Record, SupportTicket};

use super::AppState;
use crate::error::ApiError;

pub async fn list<T: Record>(State(state): State<AppState>) -> Result<Json<Vec<T>>, ApiError> {
    Ok(Json(state.repo::<T>().list()?))
}

pub async fn get<T: Record>(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<T>, ApiError> {
    Ok(Json(state.repo::<T>().get(id)?))
}

pub async fn create<T: Record>(
    State(state): State<AppState>,
    Json(record): Json<T>,
) -> Result<(StatusCode, Json<T>), ApiError> {
    let created = state.repo::<T>().create(record)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Tickets are stamped with the day they were opened.
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(mut ticket): Json<SupportTicket>,
) -> Result<(StatusCode, Json<SupportTicket>), ApiError> {
    ticket.created_on.get_or_insert_with(|| OffsetDateTime::now_utc().date());
    let created = state.repo::<SupportTicket>().create(ticket)?;
    tracing::info!(id = %created.id, priority = ?created.priority, "Support ticket opened");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(record): Json<T>,
) -> Result<Json<T>, ApiError> {
    Ok(Json(state.repo::<T>().update(id, record)?))
}

/// A ticket update without `created_on` keeps the stored stamp.
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(ticket): Json<SupportTicket>,
) -> Result<Json<SupportTicket>, ApiError> {
    let updated = state.repo::<SupportTicket>().modify(id, |stored| {
        let created_on = ticket.created_on.or(stored.created_on);
        *stored = SupportTicket { created_on, ..ticket.clone() };
        Ok(())
    })?;
    tracing::debug!(%id, status = ?updated.status, "Support ticket updated");
    Ok(Json(updated))
}

pub async fn delete<T: Record>(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.repo::<T>().delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
