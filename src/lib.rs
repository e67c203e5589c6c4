//! FluxoAzul service: storage, reports, sessions and the HTTP API on top of
//! the formulas and models in `fluxoazul-core`.

pub mod api;
pub mod auth;
pub mod cash_flow;
pub mod config;
pub mod dashboard;
pub mod dre;
pub mod error;
pub mod repository;
pub mod security;
pub mod seed;
pub mod session;
pub mod storage;
pub mod support_chat;
pub mod telemetry;
