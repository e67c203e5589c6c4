//! Core types, formulas and traits for FluxoAzul.
//!
//! This crate provides the record models, the `StorageBackend` trait, the
//! currency utilities and the pure pricing/break-even formulas, so storage
//! backends and the HTTP service can live in separate crates.

pub mod calc;
pub mod money;
pub mod models;
pub mod storage;

// Re-export key types at crate root for convenience
pub use calc::{BreakEvenInput, BreakEvenResult, FinanceError, PricingInput, PricingQuote, VariableCosts};
pub use models::{
    AuditEvent, BankBalance, Category, Contact, ContactKind, InventoryItem, Lead, LeadStage,
    PricingItem, Record, Reminder, SupportTicket, Table, TicketPriority, TicketStatus,
    Transaction, TransactionKind, ValidationError,
};
pub use storage::{StorageBackend, StorageError, TransactionId};
