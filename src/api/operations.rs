use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use fluxoazul_core::{InventoryItem, Lead, LeadStage, Reminder};

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub delta: Decimal,
}

pub async fn adjust_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    let item = state
        .repo::<InventoryItem>()
        .modify(id, |item| item.adjust(request.delta).map(|_| ()))?;
    tracing::info!(%id, delta = %request.delta, quantity = %item.quantity, "Stock adjusted");
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
pub struct StageRequest {
    pub stage: LeadStage,
}

pub async fn move_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StageRequest>,
) -> Result<Json<Lead>, ApiError> {
    let lead = state.repo::<Lead>().modify(id, |lead| {
        lead.stage = request.stage;
        Ok(())
    })?;
    tracing::debug!(%id, stage = ?lead.stage, "Lead moved");
    Ok(Json(lead))
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub today: Option<Date>,
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Serialize)]
pub struct UpcomingReminders {
    pub today: Date,
    pub due_soon: Vec<Reminder>,
    pub overdue: Vec<Reminder>,
}

pub async fn upcoming_reminders(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<UpcomingReminders>, ApiError> {
    let today = query.today.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let mut reminders = state.repo::<Reminder>().list()?;
    reminders.sort_by_key(|r| r.due_date);

    let (overdue, rest): (Vec<Reminder>, Vec<Reminder>) = reminders.into_iter().partition(|r| r.is_overdue(today));
    let due_soon = rest.into_iter().filter(|r| r.is_due_within(today, query.days)).collect();

    Ok(Json(UpcomingReminders { today, due_soon, overdue }))
}
