use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_email, record_id, require_text, Record, Table, ValidationError};
use crate::money::require_non_negative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    #[default]
    Customer,
    Supplier,
    Employee,
    Other,
}

/// Customer/supplier registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: ContactKind,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Contact {
    const TABLE: Table = Table::Contacts;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        check_email("email", self.email.as_deref())
    }
}

/// Pipeline column of a CRM lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    #[default]
    New,
    Contacted,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStage {
    pub const ALL: [LeadStage; 6] = [
        LeadStage::New,
        LeadStage::Contacted,
        LeadStage::Proposal,
        LeadStage::Negotiation,
        LeadStage::Won,
        LeadStage::Lost,
    ];

    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStage::Won | LeadStage::Lost)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub stage: LeadStage,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Lead {
    const TABLE: Table = Table::Leads;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_non_negative("value", self.value, ValidationError::Negative)?;
        check_email("email", self.email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_email_validation() {
        let mut contact: Contact = serde_json::from_str(r#"{"name": "Padaria Sol"}"#).unwrap();
        assert_eq!(contact.kind, ContactKind::Customer);
        assert!(contact.validate().is_ok());

        contact.email = Some("padaria.sol".to_string());
        assert_eq!(contact.validate(), Err(ValidationError::InvalidEmail("email")));

        contact.email = Some("contato@padariasol.com.br".to_string());
        assert!(contact.validate().is_ok());
    }

    #[test]
    fn test_lead_defaults_to_new_stage() {
        let lead: Lead = serde_json::from_str(r#"{"name": "Maria", "value": 1500}"#).unwrap();
        assert_eq!(lead.stage, LeadStage::New);
        assert!(!lead.stage.is_closed());
        assert!(lead.validate().is_ok());
    }
}
