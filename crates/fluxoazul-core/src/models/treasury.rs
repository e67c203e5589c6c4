use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};
use uuid::Uuid;

use super::{record_id, require_text, Record, Table, ValidationError};

/// Balance of one bank account as of a date. Overdrafts are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankBalance {
    #[serde(default)]
    pub id: Uuid,
    pub bank: String,
    #[serde(default)]
    pub account: Option<String>,
    pub balance: Decimal,
    pub as_of: Date,
}

impl Record for BankBalance {
    const TABLE: Table = Table::BankBalances;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("bank", &self.bank)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(default)]
    pub id: Uuid,
    pub title: String,
    pub due_date: Date,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub done: bool,
}

impl Reminder {
    pub fn is_overdue(&self, today: Date) -> bool {
        !self.done && self.due_date < today
    }

    /// Windows reaching past the last representable date are open-ended.
    pub fn is_due_within(&self, today: Date, days: u32) -> bool {
        let within = today
            .checked_add(Duration::days(i64::from(days)))
            .map_or(true, |until| self.due_date <= until);
        !self.done && self.due_date >= today && within
    }
}

impl Record for Reminder {
    const TABLE: Table = Table::Reminders;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}
