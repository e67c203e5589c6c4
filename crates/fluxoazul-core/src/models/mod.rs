use std::fmt::Display;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{calc::FinanceError, money::AmountOverflow};

mod crm;
mod inventory;
mod support;
mod transaction;
mod treasury;

pub use crm::{Contact, ContactKind, Lead, LeadStage};
pub use inventory::{InventoryItem, PricingItem};
pub use support::{AuditEvent, SupportTicket, TicketPriority, TicketStatus};
pub use transaction::{Category, Transaction, TransactionKind};
pub use treasury::{BankBalance, Reminder};

/// Storage tables, one per record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Transactions,
    Contacts,
    Inventory,
    BankBalances,
    Reminders,
    PricingItems,
    Leads,
    Tickets,
    AuditEvents,
}

impl Table {
    pub const ALL: [Table; 9] = [
        Table::Transactions,
        Table::Contacts,
        Table::Inventory,
        Table::BankBalances,
        Table::Reminders,
        Table::PricingItems,
        Table::Leads,
        Table::Tickets,
        Table::AuditEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Transactions => "transactions",
            Table::Contacts => "contacts",
            Table::Inventory => "inventory",
            Table::BankBalances => "bank_balances",
            Table::Reminders => "reminders",
            Table::PricingItems => "pricing_items",
            Table::Leads => "leads",
            Table::Tickets => "tickets",
            Table::AuditEvents => "audit_events",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0} is not a valid email address")]
    InvalidEmail(&'static str),
    #[error(transparent)]
    Finance(#[from] FinanceError),
    #[error(transparent)]
    Overflow(#[from] AmountOverflow),
}

/// A flat record persisted in one storage table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);

    /// Form-level checks: required fields and numeric ranges.
    fn validate(&self) -> Result<(), ValidationError>;
}

macro_rules! record_id {
    () => {
        fn id(&self) -> uuid::Uuid {
            self.id
        }

        fn set_id(&mut self, id: uuid::Uuid) {
            self.id = id;
        }
    };
}
pub(crate) use record_id;

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub(crate) fn check_email(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(email) if !email.trim().is_empty() => {
            let valid = email
                .split_once('@')
                .map_or(false, |(user, domain)| !user.is_empty() && domain.contains('.'));
            if valid { Ok(()) } else { Err(ValidationError::InvalidEmail(field)) }
        }
        _ => Ok(()),
    }
}
