//! Appointment record storage.
//!
//! The verify flow and the HTTP layer only see `AppointmentStore`, so the
//! seeded in-memory records can be swapped for a SQLite file without
//! touching lookup logic. Records are read-only once the store is built.

pub mod memory;
pub mod seed;
pub mod sqlite;

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::db::DatabaseError;
use crate::lookup::LookupQuery;
use crate::models::{AppointmentRecord, StoreBackend};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Duplicate card number: {0}")]
    DuplicateCard(String),

    #[error("Invalid appointment record: {0}")]
    InvalidRecord(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Read-only access to appointment records.
pub trait AppointmentStore: Send + Sync {
    /// First record matching `query`, or `None`.
    fn find_by_phone_or_card(
        &self,
        query: &LookupQuery,
    ) -> Result<Option<AppointmentRecord>, StoreError>;

    /// Number of stored records.
    fn count(&self) -> Result<usize, StoreError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Check the per-record invariants shared by every backend.
pub(crate) fn validate_record(record: &AppointmentRecord) -> Result<(), StoreError> {
    if record.id.trim().is_empty() {
        return Err(StoreError::InvalidRecord("empty id".into()));
    }
    if record.phone.trim().is_empty() {
        return Err(StoreError::InvalidRecord(format!("{}: empty phone", record.id)));
    }
    if record.card_number.trim().is_empty() {
        return Err(StoreError::InvalidRecord(format!(
            "{}: empty card number",
            record.id
        )));
    }
    Ok(())
}

/// Open the store selected by configuration.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn AppointmentStore>, StoreError> {
    let store: Arc<dyn AppointmentStore> = match config.store_backend {
        StoreBackend::Memory => Arc::new(MemoryStore::seeded()?),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.db_path)?),
    };
    tracing::info!(
        backend = store.backend(),
        records = store.count()?,
        "Appointment store ready"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::seed_records;

    #[test]
    fn validate_rejects_empty_phone() {
        let mut record = seed_records().remove(0);
        record.phone = " ".into();
        assert!(matches!(
            validate_record(&record),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_card() {
        let mut record = seed_records().remove(0);
        record.card_number = String::new();
        assert!(matches!(
            validate_record(&record),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn open_store_memory_backend() {
        let config = AppConfig::default();
        let store = open_store(&config).unwrap();
        assert_eq!(store.backend(), "memory");
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn open_store_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            store_backend: StoreBackend::Sqlite,
            db_path: dir.path().join("appointments.db"),
            ..AppConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.backend(), "sqlite");
        assert_eq!(store.count().unwrap(), 2);
    }
}
