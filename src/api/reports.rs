use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use fluxoazul_core::{
    calc::{self, BreakEvenInput, BreakEvenResult, PricingInput, PricingQuote, VariableCosts},
    money::{format_brl, format_percent},
    BankBalance, InventoryItem, Lead, Reminder, SupportTicket, Transaction,
};

use super::AppState;
use crate::{
    cash_flow::{self, CashFlowReport},
    dashboard::{self, DashboardInputs, DashboardSummary},
    dre::{self, Period},
    error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct BreakEvenRequest {
    pub fixed_costs: Decimal,
    #[serde(default)]
    pub owner_draw: Decimal,
    #[serde(default)]
    pub variable_costs: VariableCosts,
    pub margin: Decimal,
    #[serde(default)]
    pub working_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BreakEvenResponse {
    #[serde(flatten)]
    pub result: BreakEvenResult,
    pub break_even_display: String,
    pub daily_revenue_display: String,
    pub variable_pct_display: String,
}

pub async fn break_even(
    State(state): State<AppState>,
    Json(request): Json<BreakEvenRequest>,
) -> Result<Json<BreakEvenResponse>, ApiError> {
    let input = BreakEvenInput {
        fixed_costs: request.fixed_costs,
        owner_draw: request.owner_draw,
        variable_costs: request.variable_costs,
        margin: request.margin,
        working_days: request.working_days.unwrap_or(state.working_days),
    };
    let result = calc::break_even(&input)?;
    metrics::increment_counter!("fluxoazul_calculations_total", "kind" => "break_even");
    tracing::debug!(revenue = %result.break_even_revenue, "Break-even calculated");

    Ok(Json(BreakEvenResponse {
        break_even_display: format_brl(result.break_even_revenue),
        daily_revenue_display: format_brl(result.daily_revenue),
        variable_pct_display: format_percent(result.variable_pct),
        result,
    }))
}

#[derive(Debug, Serialize)]
pub struct PricingResponse {
    #[serde(flatten)]
    pub quote: PricingQuote,
    pub sale_price_display: String,
}

pub async fn pricing(Json(input): Json<PricingInput>) -> Result<Json<PricingResponse>, ApiError> {
    let quote = calc::quote(&input)?;
    metrics::increment_counter!("fluxoazul_calculations_total", "kind" => "pricing");

    Ok(Json(PricingResponse {
        sale_price_display: format_brl(quote.sale_price),
        quote,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DreQuery {
    #[serde(default)]
    pub from: Option<Date>,
    #[serde(default)]
    pub to: Option<Date>,
    /// `text` renders the statement as a table instead of JSON.
    #[serde(default)]
    pub format: Option<String>,
}

pub async fn dre(State(state): State<AppState>, Query(query): Query<DreQuery>) -> Result<Response, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::BadRequest(format!("range start {} is after range end {}", from, to)));
        }
    }

    let transactions = state.repo::<Transaction>().list()?;
    let statement = dre::build(&transactions, &Period { from: query.from, to: query.to })?;

    match query.format.as_deref() {
        Some("text") => Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], statement.to_string()).into_response()),
        Some("json") | None => Ok(Json(statement).into_response()),
        Some(other) => Err(ApiError::BadRequest(format!("unsupported format: {}", other))),
    }
}

#[derive(Debug, Deserialize)]
pub struct CashFlowQuery {
    pub from: Date,
    pub to: Date,
    #[serde(default)]
    pub opening_balance: Option<Decimal>,
}

pub async fn cash_flow(
    State(state): State<AppState>,
    Query(query): Query<CashFlowQuery>,
) -> Result<Json<CashFlowReport>, ApiError> {
    let transactions = state.repo::<Transaction>().list()?;
    let report = cash_flow::monthly(
        &transactions,
        query.opening_balance.unwrap_or(Decimal::ZERO),
        query.from,
        query.to,
    )?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub today: Option<Date>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let transactions = state.repo::<Transaction>().list()?;
    let bank_balances = state.repo::<BankBalance>().list()?;
    let inventory = state.repo::<InventoryItem>().list()?;
    let reminders = state.repo::<Reminder>().list()?;
    let tickets = state.repo::<SupportTicket>().list()?;
    let leads = state.repo::<Lead>().list()?;

    let today = query.today.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let summary = dashboard::summarize(
        &DashboardInputs {
            transactions: &transactions,
            bank_balances: &bank_balances,
            inventory: &inventory,
            reminders: &reminders,
            tickets: &tickets,
            leads: &leads,
        },
        today,
    )?;
    Ok(Json(summary))
}
