use std::{collections::{BTreeMap, HashMap}, sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, atomic::{AtomicU64, Ordering}}};

use serde_json::Value;
use uuid::Uuid;

use fluxoazul_core::Table;

// Re-export core storage types so code using crate::storage::* keeps working
pub use fluxoazul_core::storage::{StorageBackend, StorageError, TransactionId};

#[derive(Clone)]
struct StoredRecord {
    sequence: u64,
    body: Value,
}

type Tables = BTreeMap<Table, HashMap<Uuid, StoredRecord>>;

struct Snapshot {
    tables: Tables,
    sequence_value: u64,
}

pub struct InMemoryStorage {
    tables: RwLock<Tables>,
    sequence_counter: AtomicU64,
    tx_counter: AtomicU64,
    snapshots: RwLock<HashMap<TransactionId, Snapshot>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(BTreeMap::new()),
            sequence_counter: AtomicU64::new(1),
            tx_counter: AtomicU64::new(1),
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    pub fn shared() -> Arc<dyn StorageBackend> {
        Arc::new(Self::new())
    }

    fn next_sequence(&self) -> u64 {
        self.sequence_counter.fetch_add(1, Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables.read().map_err(|_| StorageError::Other("storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables.write().map_err(|_| StorageError::Other("storage lock poisoned".to_string()))
    }

    fn snapshots(&self) -> Result<RwLockWriteGuard<'_, HashMap<TransactionId, Snapshot>>, StorageError> {
        self.snapshots.write().map_err(|_| StorageError::Other("snapshot lock poisoned".to_string()))
    }
}

impl StorageBackend for InMemoryStorage {
    fn insert(&self, table: Table, id: Uuid, record: &Value) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        let rows = tables.entry(table).or_default();
        if rows.contains_key(&id) {
            return Err(StorageError::AlreadyExists { table, id });
        }
        rows.insert(id, StoredRecord {
            sequence: self.next_sequence(),
            body: record.clone(),
        });
        Ok(())
    }

    fn get(&self, table: Table, id: Uuid) -> Result<Value, StorageError> {
        let tables = self.read()?;
        tables.get(&table)
            .and_then(|rows| rows.get(&id))
            .map(|row| row.body.clone())
            .ok_or(StorageError::NotFound { table, id })
    }

    fn list(&self, table: Table) -> Result<Vec<Value>, StorageError> {
        let tables = self.read()?;
        let mut rows: Vec<&StoredRecord> = match tables.get(&table) {
            Some(rows) => rows.values().collect(),
            None => return Ok(Vec::new()),
        };
        rows.sort_by_key(|row| row.sequence);
        Ok(rows.into_iter().map(|row| row.body.clone()).collect())
    }

    fn update(&self, table: Table, id: Uuid, record: &Value) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        let row = tables.get_mut(&table)
            .and_then(|rows| rows.get_mut(&id))
            .ok_or(StorageError::NotFound { table, id })?;
        row.body = record.clone();
        Ok(())
    }

    fn compare_and_swap(&self, table: Table, id: Uuid, expected: &Value, record: &Value) -> Result<bool, StorageError> {
        let mut tables = self.write()?;
        let row = tables.get_mut(&table)
            .and_then(|rows| rows.get_mut(&id))
            .ok_or(StorageError::NotFound { table, id })?;
        if row.body != *expected {
            return Ok(false);
        }
        row.body = record.clone();
        Ok(true)
    }

    fn delete(&self, table: Table, id: Uuid) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        tables.get_mut(&table)
            .and_then(|rows| rows.remove(&id))
            .map(|_| ())
            .ok_or(StorageError::NotFound { table, id })
    }

    fn count(&self, table: Table) -> Result<usize, StorageError> {
        Ok(self.read()?.get(&table).map_or(0, |rows| rows.len()))
    }

    fn begin_transaction(&self) -> Result<TransactionId, StorageError> {
        let tx_id = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        let snapshot = Snapshot {
            tables: self.read()?.clone(),
            sequence_value: self.sequence_counter.load(Ordering::SeqCst),
        };
        self.snapshots()?.insert(tx_id, snapshot);
        tracing::debug!(tx_id, "Transaction started");
        Ok(tx_id)
    }

    fn commit_transaction(&self, tx_id: TransactionId) -> Result<(), StorageError> {
        self.snapshots()?.remove(&tx_id)
            .ok_or(StorageError::NoActiveTransaction)?;
        tracing::debug!(tx_id, "Transaction committed");
        Ok(())
    }

    fn rollback_transaction(&self, tx_id: TransactionId) -> Result<(), StorageError> {
        let snapshot = self.snapshots()?.remove(&tx_id)
            .ok_or(StorageError::NoActiveTransaction)?;
        *self.write()? = snapshot.tables;
        self.sequence_counter.store(snapshot.sequence_value, Ordering::SeqCst);
        tracing::debug!(tx_id, "Transaction rolled back");
        Ok(())
    }
}
