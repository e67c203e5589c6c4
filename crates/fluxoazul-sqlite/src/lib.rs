//! SQLite storage backend for FluxoAzul.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard,
};

use fluxoazul_core::{StorageBackend, StorageError, Table, TransactionId};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
    tx_counter: AtomicU64,
    active_tx: Mutex<Option<TransactionId>>,
}

fn sql_err(e: rusqlite::Error) -> StorageError {
    StorageError::Other(e.to_string())
}

impl SqliteStorage {
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(sql_err)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(sql_err)?;

        let storage = Self {
            conn: Mutex::new(conn),
            tx_counter: AtomicU64::new(1),
            active_tx: Mutex::new(None),
        };
        storage.init_schema()?;
        tracing::info!(path, "SQLite storage opened");
        Ok(storage)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Other("sqlite connection lock poisoned".to_string()))
    }

    fn active_tx(&self) -> Result<MutexGuard<'_, Option<TransactionId>>, StorageError> {
        self.active_tx
            .lock()
            .map_err(|_| StorageError::Other("transaction lock poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                table_name TEXT NOT NULL,
                id TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (table_name, id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_sequence
                ON records(table_name, sequence);

            CREATE TABLE IF NOT EXISTS sequence_counter (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                value INTEGER NOT NULL
            );

            INSERT OR IGNORE INTO sequence_counter (id, value) VALUES (1, 0);
            ",
        )
        .map_err(sql_err)?;
        Ok(())
    }

    fn next_sequence(conn: &Connection) -> Result<u64, StorageError> {
        conn.execute(
            "UPDATE sequence_counter SET value = value + 1 WHERE id = 1",
            [],
        )
        .map_err(sql_err)?;
        let seq: u64 = conn
            .query_row("SELECT value FROM sequence_counter WHERE id = 1", [], |r| {
                r.get(0)
            })
            .map_err(sql_err)?;
        Ok(seq)
    }
}

fn now_str() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

fn decode(table: Table, body: &str) -> Result<Value, StorageError> {
    serde_json::from_str(body).map_err(|e| StorageError::Corrupt {
        table,
        reason: e.to_string(),
    })
}

fn encode(table: Table, record: &Value) -> Result<String, StorageError> {
    serde_json::to_string(record).map_err(|e| StorageError::Corrupt {
        table,
        reason: e.to_string(),
    })
}

impl StorageBackend for SqliteStorage {
    fn insert(&self, table: Table, id: Uuid, record: &Value) -> Result<(), StorageError> {
        let body = encode(table, record)?;
        let conn = self.conn()?;
        let seq = Self::next_sequence(&conn)?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO records (table_name, id, sequence, body, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![table.as_str(), id.to_string(), seq, body, now_str()],
            )
            .map_err(sql_err)?;
        if inserted == 0 {
            return Err(StorageError::AlreadyExists { table, id });
        }
        Ok(())
    }

    fn get(&self, table: Table, id: Uuid) -> Result<Value, StorageError> {
        let conn = self.conn()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM records WHERE table_name = ?1 AND id = ?2",
                params![table.as_str(), id.to_string()],
                |r| r.get(0),
            )
            .optional()
            .map_err(sql_err)?;
        match body {
            Some(body) => decode(table, &body),
            None => Err(StorageError::NotFound { table, id }),
        }
    }

    fn list(&self, table: Table) -> Result<Vec<Value>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT body FROM records WHERE table_name = ?1 ORDER BY sequence")
            .map_err(sql_err)?;
        let rows = stmt
            .query_map(params![table.as_str()], |r| r.get::<_, String>(0))
            .map_err(sql_err)?;

        let mut result = Vec::new();
        for row in rows {
            let body = row.map_err(sql_err)?;
            result.push(decode(table, &body)?);
        }
        Ok(result)
    }

    fn update(&self, table: Table, id: Uuid, record: &Value) -> Result<(), StorageError> {
        let body = encode(table, record)?;
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE records SET body = ?3, updated_at = ?4 WHERE table_name = ?1 AND id = ?2",
                params![table.as_str(), id.to_string(), body, now_str()],
            )
            .map_err(sql_err)?;
        if updated == 0 {
            return Err(StorageError::NotFound { table, id });
        }
        Ok(())
    }

    fn compare_and_swap(&self, table: Table, id: Uuid, expected: &Value, record: &Value) -> Result<bool, StorageError> {
        let body = encode(table, record)?;
        let conn = self.conn()?;
        let current: Option<String> = conn
            .query_row(
                "SELECT body FROM records WHERE table_name = ?1 AND id = ?2",
                params![table.as_str(), id.to_string()],
                |r| r.get(0),
            )
            .optional()
            .map_err(sql_err)?;
        let current = match current {
            Some(current) => decode(table, &current)?,
            None => return Err(StorageError::NotFound { table, id }),
        };
        if current != *expected {
            return Ok(false);
        }
        conn.execute(
            "UPDATE records SET body = ?3, updated_at = ?4 WHERE table_name = ?1 AND id = ?2",
            params![table.as_str(), id.to_string(), body, now_str()],
        )
        .map_err(sql_err)?;
        Ok(true)
    }

    fn delete(&self, table: Table, id: Uuid) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM records WHERE table_name = ?1 AND id = ?2",
                params![table.as_str(), id.to_string()],
            )
            .map_err(sql_err)?;
        if deleted == 0 {
            return Err(StorageError::NotFound { table, id });
        }
        Ok(())
    }

    fn count(&self, table: Table) -> Result<usize, StorageError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE table_name = ?1",
                params![table.as_str()],
                |r| r.get(0),
            )
            .map_err(sql_err)?;
        Ok(count as usize)
    }

    fn begin_transaction(&self) -> Result<TransactionId, StorageError> {
        let mut active = self.active_tx()?;
        if active.is_some() {
            return Err(StorageError::Other("a transaction is already active".to_string()));
        }
        let conn = self.conn()?;
        conn.execute_batch("SAVEPOINT fluxoazul_tx")
            .map_err(sql_err)?;
        let tx_id = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        *active = Some(tx_id);
        tracing::debug!(tx_id, "SQLite transaction started");
        Ok(tx_id)
    }

    fn commit_transaction(&self, tx_id: TransactionId) -> Result<(), StorageError> {
        let mut active = self.active_tx()?;
        if *active != Some(tx_id) {
            return Err(StorageError::NoActiveTransaction);
        }
        let conn = self.conn()?;
        conn.execute_batch("RELEASE SAVEPOINT fluxoazul_tx")
            .map_err(sql_err)?;
        *active = None;
        tracing::debug!(tx_id, "SQLite transaction committed");
        Ok(())
    }

    fn rollback_transaction(&self, tx_id: TransactionId) -> Result<(), StorageError> {
        let mut active = self.active_tx()?;
        if *active != Some(tx_id) {
            return Err(StorageError::NoActiveTransaction);
        }
        let conn = self.conn()?;
        // ROLLBACK TO keeps the savepoint open, so release it afterwards.
        conn.execute_batch("ROLLBACK TO SAVEPOINT fluxoazul_tx; RELEASE SAVEPOINT fluxoazul_tx")
            .map_err(sql_err)?;
        *active = None;
        tracing::debug!(tx_id, "SQLite transaction rolled back");
        Ok(())
    }
}
