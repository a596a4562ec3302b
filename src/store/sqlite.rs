use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use super::{seed::seed_records, validate_record, AppointmentStore, StoreError};
use crate::db::{self, DatabaseError};
use crate::lookup::LookupQuery;
use crate::models::AppointmentRecord;

/// Appointments kept in a SQLite database.
///
/// The connection is not `Sync`, so every call takes the mutex. Callers on
/// the async side reach this store through `spawn_blocking`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, seeding it when empty.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        tracing::info!(path = %path.display(), "Opening appointment database");
        let conn = db::open_database(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database with the seed records.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = db::open_memory_database()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        if db::count_appointments(&conn)? == 0 {
            let records = seed_records();
            insert_all(&conn, &records)?;
            tracing::info!(count = records.len(), "Seeded appointment database");
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Insert `records` in one transaction; nothing is written on failure.
fn insert_all(conn: &Connection, records: &[AppointmentRecord]) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;
    for record in records {
        validate_record(record)?;
        db::insert_appointment(&tx, record).map_err(|e| match e {
            // SQLite names the column for `UNIQUE` columns and the index for
            // expression indexes such as the case-folded card index.
            DatabaseError::ConstraintViolation(msg) if msg.contains("appointments.id") => {
                StoreError::InvalidRecord(format!("duplicate id {}", record.id))
            }
            DatabaseError::ConstraintViolation(msg) if msg.contains("idx_appointments_card") => {
                StoreError::DuplicateCard(record.card_number.clone())
            }
            other => StoreError::Database(other),
        })?;
    }
    tx.commit().map_err(DatabaseError::from)?;
    Ok(())
}

impl AppointmentStore for SqliteStore {
    fn find_by_phone_or_card(
        &self,
        query: &LookupQuery,
    ) -> Result<Option<AppointmentRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let record =
            db::find_appointment_by_phone_or_card(&conn, query.phone(), query.card_number())?;
        Ok(record)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(db::count_appointments(&conn)?)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_is_seeded() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn lookup_matches_memory_semantics() {
        let store = SqliteStore::open_in_memory().unwrap();

        let by_phone = LookupQuery::new("+1234567890", "").unwrap();
        assert_eq!(
            store.find_by_phone_or_card(&by_phone).unwrap().unwrap().id,
            "APT-001"
        );

        let by_card = LookupQuery::new("", "vAc-2024-002").unwrap();
        assert_eq!(
            store.find_by_phone_or_card(&by_card).unwrap().unwrap().id,
            "APT-002"
        );

        let miss = LookupQuery::new("0000000000", "XXX").unwrap();
        assert!(store.find_by_phone_or_card(&miss).unwrap().is_none());
    }

    #[test]
    fn reopen_does_not_reseed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.db");

        let first = SqliteStore::open(&path).unwrap();
        assert_eq!(first.count().unwrap(), 2);
        drop(first);

        let second = SqliteStore::open(&path).unwrap();
        assert_eq!(second.count().unwrap(), 2);
    }

    #[test]
    fn insert_all_rolls_back_on_duplicate() {
        let conn = db::open_memory_database().unwrap();
        let mut records = seed_records();
        let mut dup = records[0].clone();
        dup.id = "APT-950".into();
        records.push(dup);

        let err = insert_all(&conn, &records).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCard(_)));
        assert_eq!(db::count_appointments(&conn).unwrap(), 0);
    }

    #[test]
    fn duplicate_id_is_not_reported_as_duplicate_card() {
        let conn = db::open_memory_database().unwrap();
        let mut records = seed_records();
        let mut dup = records[0].clone();
        dup.card_number = "VAC-2024-950".into();
        records.push(dup);

        let err = insert_all(&conn, &records).unwrap_err();
        match err {
            StoreError::InvalidRecord(msg) => assert!(msg.contains("APT-001"), "{msg}"),
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
        assert_eq!(db::count_appointments(&conn).unwrap(), 0);
    }
}
