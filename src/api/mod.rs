//! HTTP surface: JSON handlers over the repositories, formulas and reports.

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};

use fluxoazul_core::{
    BankBalance, Contact, InventoryItem, Lead, PricingItem, Record, Reminder, StorageBackend, SupportTicket,
    Transaction,
};

use crate::{
    auth::{auth_middleware, require_writer},
    config::{AuthConfig, Config},
    repository::Repository,
    security::security_headers,
    session::SessionManager,
    support_chat::SupportChat,
};

mod operations;
mod records;
mod reports;
mod sessions;
mod support;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageBackend>,
    pub sessions: Arc<SessionManager>,
    pub chat: Arc<SupportChat>,
    pub working_days: u32,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(config: &Config, storage: Arc<dyn StorageBackend>, metrics: PrometheusHandle) -> Self {
        Self {
            storage,
            sessions: Arc::new(SessionManager::new(config.session.idle_config())),
            chat: Arc::new(SupportChat::new(reqwest::Client::new(), config.support_chat.clone())),
            working_days: config.finance.working_days,
            metrics,
        }
    }

    pub fn repo<T: Record>(&self) -> Repository<T> {
        Repository::new(self.storage.clone())
    }
}

fn crud<T: Record>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router
        .route(path, get(records::list::<T>).post(records::create::<T>))
        .route(
            &format!("{}/:id", path),
            get(records::get::<T>).put(records::update::<T>).delete(records::delete::<T>),
        )
}

fn data_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/api/tickets", get(records::list::<SupportTicket>).post(records::create_ticket))
        .route(
            "/api/tickets/:id",
            get(records::get::<SupportTicket>)
                .put(records::update_ticket)
                .delete(records::delete::<SupportTicket>),
        )
        .route("/api/inventory/:id/adjust", post(operations::adjust_inventory))
        .route("/api/leads/:id/stage", patch(operations::move_lead));

    let router = crud::<Transaction>(router, "/api/transactions");
    let router = crud::<Contact>(router, "/api/contacts");
    let router = crud::<InventoryItem>(router, "/api/inventory");
    let router = crud::<BankBalance>(router, "/api/bank-balances");
    let router = crud::<Reminder>(router, "/api/reminders");
    let router = crud::<PricingItem>(router, "/api/pricing-items");
    let router = crud::<Lead>(router, "/api/leads");

    router.route_layer(middleware::from_fn(require_writer))
}

fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/api/calculators/break-even", post(reports::break_even))
        .route("/api/calculators/pricing", post(reports::pricing))
        .route("/api/reports/dre", get(reports::dre))
        .route("/api/reports/cash-flow", get(reports::cash_flow))
        .route("/api/dashboard", get(reports::dashboard))
        .route("/api/reminders/upcoming", get(operations::upcoming_reminders))
        .route("/api/sessions", post(sessions::start))
        .route("/api/sessions/:id", get(sessions::status).delete(sessions::end))
        .route("/api/sessions/:id/touch", post(sessions::touch))
        .route("/api/support/chat", post(support::chat))
        .route("/api/security/nonce", get(support::nonce))
        .route("/api/security/events", post(support::audit_event))
}

pub fn router(state: AppState, auth: Arc<AuthConfig>) -> Router {
    let api = data_routes()
        .merge(service_routes())
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .layer(middleware::from_fn(security_headers))
        .layer(Extension(auth))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
