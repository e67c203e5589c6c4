use std::{marker::PhantomData, sync::Arc};

use fluxoazul_core::{Record, StorageBackend, StorageError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Typed access to one storage table.
pub struct Repository<T> {
    storage: Arc<dyn StorageBackend>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// Validates and stores a record, assigning an id when it has none.
    pub fn create(&self, mut record: T) -> Result<T, RepositoryError> {
        record.validate()?;
        if record.id().is_nil() {
            record.set_id(Uuid::new_v4());
        }
        let body = serde_json::to_value(&record)?;
        self.storage.insert(T::TABLE, record.id(), &body)?;
        metrics::increment_counter!("fluxoazul_records_written_total", "table" => T::TABLE.as_str());
        tracing::debug!(table = %T::TABLE, id = %record.id(), "Record created");
        Ok(record)
    }

    pub fn get(&self, id: Uuid) -> Result<T, RepositoryError> {
        let body = self.storage.get(T::TABLE, id)?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn list(&self) -> Result<Vec<T>, RepositoryError> {
        self.storage
            .list(T::TABLE)?
            .into_iter()
            .map(|body| serde_json::from_value(body).map_err(RepositoryError::from))
            .collect()
    }

    /// Replaces the stored record; the path id wins over any id in the body.
    pub fn update(&self, id: Uuid, mut record: T) -> Result<T, RepositoryError> {
        record.validate()?;
        record.set_id(id);
        let body = serde_json::to_value(&record)?;
        self.storage.update(T::TABLE, id, &body)?;
        metrics::increment_counter!("fluxoazul_records_written_total", "table" => T::TABLE.as_str());
        tracing::debug!(table = %T::TABLE, %id, "Record updated");
        Ok(record)
    }

    /// Loads, mutates and stores a record atomically. `change` is re-run on
    /// a fresh copy whenever a concurrent writer got there first.
    pub fn modify<F>(&self, id: Uuid, mut change: F) -> Result<T, RepositoryError>
    where
        F: FnMut(&mut T) -> Result<(), ValidationError>,
    {
        let mut attempt = 1u32;
        loop {
            let current = self.storage.get(T::TABLE, id)?;
            let mut record: T = serde_json::from_value(current.clone())?;
            change(&mut record)?;
            record.validate()?;
            record.set_id(id);
            let body = serde_json::to_value(&record)?;

            if self.storage.compare_and_swap(T::TABLE, id, &current, &body)? {
                metrics::increment_counter!("fluxoazul_records_written_total", "table" => T::TABLE.as_str());
                tracing::debug!(table = %T::TABLE, %id, attempt, "Record modified");
                return Ok(record);
            }
            attempt = attempt.saturating_add(1);
        }
    }

    pub fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.storage.delete(T::TABLE, id)?;
        tracing::debug!(table = %T::TABLE, %id, "Record deleted");
        Ok(())
    }

    pub fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.storage.count(T::TABLE)?)
    }
}
