//! Declarative seed data loaded from a TOML file at startup.

use std::{path::Path, sync::Arc};

use serde::Deserialize;
use thiserror::Error;

use fluxoazul_core::{
    BankBalance, Contact, InventoryItem, Lead, PricingItem, Record, Reminder, StorageBackend, StorageError,
    SupportTicket, Transaction,
};

use crate::repository::{Repository, RepositoryError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid seed record: {0}")]
    Record(#[from] RepositoryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub bank_balances: Vec<BankBalance>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub pricing_items: Vec<PricingItem>,
    #[serde(default)]
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub tickets: Vec<SupportTicket>,
}

impl SeedData {
    pub fn parse(contents: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
            + self.contacts.len()
            + self.inventory.len()
            + self.bank_balances.len()
            + self.reminders.len()
            + self.pricing_items.len()
            + self.leads.len()
            + self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts every record in one storage transaction. Nothing is kept if
    /// any record is rejected.
    pub fn apply(self, storage: Arc<dyn StorageBackend>) -> Result<usize, SeedError> {
        let total = self.len();
        let tx = storage.begin_transaction()?;
        match self.insert_all(&storage) {
            Ok(()) => {
                storage.commit_transaction(tx)?;
                tracing::info!(records = total, "Seed data applied");
                Ok(total)
            }
            Err(e) => {
                tracing::error!(error = %e, "Seed data rejected, rolling back");
                storage.rollback_transaction(tx)?;
                Err(e)
            }
        }
    }

    fn insert_all(self, storage: &Arc<dyn StorageBackend>) -> Result<(), SeedError> {
        insert(storage, self.contacts)?;
        insert(storage, self.transactions)?;
        insert(storage, self.inventory)?;
        insert(storage, self.bank_balances)?;
        insert(storage, self.reminders)?;
        insert(storage, self.pricing_items)?;
        insert(storage, self.leads)?;
        insert(storage, self.tickets)?;
        Ok(())
    }
}

fn insert<T: Record>(storage: &Arc<dyn StorageBackend>, records: Vec<T>) -> Result<(), SeedError> {
    let repo: Repository<T> = Repository::new(storage.clone());
    for record in records {
        repo.create(record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use fluxoazul_core::Table;
    use rust_decimal_macros::dec;

    const SEED: &str = r#"
        [[transactions]]
        date = "2024-03-01"
        description = "Vendas balcão"
        kind = "revenue"
        category = "sales"
        amount = "8000"

        [[transactions]]
        date = "2024-03-05"
        description = "Aluguel"
        kind = "expense"
        category = "rent"
        amount = "2500"
        paid = false

        [[bank_balances]]
        bank = "Banco do Brasil"
        balance = "12000.50"
        as_of = "2024-03-01"
    "#;

    #[test]
    fn test_parse_seed() {
        let seed = SeedData::parse(SEED).unwrap();
        assert_eq!(seed.len(), 3);
        assert_eq!(seed.transactions[0].amount, dec!(8000));
        assert!(!seed.transactions[1].paid);
        assert!(seed.contacts.is_empty());
    }

    #[test]
    fn test_apply_seed() {
        let storage = InMemoryStorage::shared();
        let applied = SeedData::parse(SEED).unwrap().apply(storage.clone()).unwrap();
        assert_eq!(applied, 3);
        assert_eq!(storage.count(Table::Transactions).unwrap(), 2);
        assert_eq!(storage.count(Table::BankBalances).unwrap(), 1);
    }

    #[test]
    fn test_example_seed_file_applies() {
        let seed = SeedData::parse(include_str!("../seed.example.toml")).unwrap();
        let storage = InMemoryStorage::shared();
        assert_eq!(seed.apply(storage.clone()).unwrap(), 9);
        assert_eq!(storage.count(Table::Transactions).unwrap(), 4);
    }

    #[test]
    fn test_invalid_seed_rolls_back() {
        let storage = InMemoryStorage::shared();
        let seed = SeedData::parse(&format!(
            "{}\n[[inventory]]\nname = \"Farinha\"\nquantity = \"-1\"\nunit_cost = \"5\"\n",
            SEED
        ))
        .unwrap();

        assert!(matches!(seed.apply(storage.clone()), Err(SeedError::Record(RepositoryError::Validation(_)))));
        assert_eq!(storage.count(Table::Transactions).unwrap(), 0);
        assert_eq!(storage.count(Table::BankBalances).unwrap(), 0);
    }
}
