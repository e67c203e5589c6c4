use serde_json::Value;
use uuid::Uuid;

use crate::models::Table;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Other(String),
    #[error("record not found: {table}/{id}")]
    NotFound { table: Table, id: Uuid },
    #[error("record already exists: {table}/{id}")]
    AlreadyExists { table: Table, id: Uuid },
    #[error("corrupt record in {table}: {reason}")]
    Corrupt { table: Table, reason: String },
    #[error("no active transaction")]
    NoActiveTransaction,
}

pub type TransactionId = u64;

/// Table/record store. Records are opaque JSON documents keyed by id and
/// listed in insertion order.
pub trait StorageBackend: Send + Sync {
    fn insert(&self, table: Table, id: Uuid, record: &Value) -> Result<(), StorageError>;
    fn get(&self, table: Table, id: Uuid) -> Result<Value, StorageError>;
    fn list(&self, table: Table) -> Result<Vec<Value>, StorageError>;
    fn update(&self, table: Table, id: Uuid, record: &Value) -> Result<(), StorageError>;
    /// Replaces the record only if it still equals `expected`. Returns
    /// `false` when another writer changed it first.
    fn compare_and_swap(&self, table: Table, id: Uuid, expected: &Value, record: &Value) -> Result<bool, StorageError>;
    fn delete(&self, table: Table, id: Uuid) -> Result<(), StorageError>;
    fn count(&self, table: Table) -> Result<usize, StorageError>;

    fn begin_transaction(&self) -> Result<TransactionId, StorageError>;
    fn commit_transaction(&self, tx_id: TransactionId) -> Result<(), StorageError>;
    fn rollback_transaction(&self, tx_id: TransactionId) -> Result<(), StorageError>;
}
