use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{record_id, require_text, Record, Table, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    #[serde(default)]
    pub id: Uuid,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub created_on: Option<Date>,
}

impl SupportTicket {
    pub fn is_open(&self) -> bool {
        matches!(self.status, TicketStatus::Open | TicketStatus::InProgress)
    }
}

impl Record for SupportTicket {
    const TABLE: Table = Table::Tickets;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("subject", &self.subject)?;
        require_text("message", &self.message)
    }
}

/// Security-relevant event reported by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(default)]
    pub id: Uuid,
    pub event_type: String,
    pub actor: String,
    #[serde(default)]
    pub details: serde_json::Value,
    pub occurred_at: OffsetDateTime,
}

impl Record for AuditEvent {
    const TABLE: Table = Table::AuditEvents;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("event_type", &self.event_type)
    }
}
