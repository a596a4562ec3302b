use std::collections::HashSet;

use super::{seed::seed_records, validate_record, AppointmentStore, StoreError};
use crate::lookup::{find_match, LookupQuery};
use crate::models::AppointmentRecord;

/// Fixed, in-process collection of appointments.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Vec<AppointmentRecord>,
}

impl MemoryStore {
    /// Build a store from `records`, keeping their order.
    ///
    /// Rejects records with empty keys, repeated ids, and card numbers that
    /// collide ignoring case.
    pub fn new(records: Vec<AppointmentRecord>) -> Result<Self, StoreError> {
        let mut ids = HashSet::with_capacity(records.len());
        let mut cards = HashSet::with_capacity(records.len());
        for record in &records {
            validate_record(record)?;
            if !ids.insert(record.id.clone()) {
                return Err(StoreError::InvalidRecord(format!(
                    "duplicate id {}",
                    record.id
                )));
            }
            if !cards.insert(record.card_key()) {
                return Err(StoreError::DuplicateCard(record.card_number.clone()));
            }
        }
        Ok(Self { records })
    }

    /// Store holding the built-in seed appointments.
    pub fn seeded() -> Result<Self, StoreError> {
        Self::new(seed_records())
    }

    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }
}

impl AppointmentStore for MemoryStore {
    fn find_by_phone_or_card(
        &self,
        query: &LookupQuery,
    ) -> Result<Option<AppointmentRecord>, StoreError> {
        Ok(find_match(&self.records, query).cloned())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_finds_by_phone() {
        let store = MemoryStore::seeded().unwrap();
        let q = LookupQuery::new("+1987654321", "").unwrap();
        let found = store.find_by_phone_or_card(&q).unwrap().unwrap();
        assert_eq!(found.id, "APT-002");
    }

    #[test]
    fn miss_is_ok_none() {
        let store = MemoryStore::seeded().unwrap();
        let q = LookupQuery::new("0000000000", "XXX").unwrap();
        assert!(store.find_by_phone_or_card(&q).unwrap().is_none());
    }

    #[test]
    fn duplicate_card_rejected_ignoring_case() {
        let mut records = seed_records();
        let mut dup = records[0].clone();
        dup.id = "APT-900".into();
        dup.card_number = records[0].card_number.to_lowercase();
        records.push(dup);
        let err = MemoryStore::new(records).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCard(_)));
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut records = seed_records();
        let mut dup = records[1].clone();
        dup.id = records[0].id.clone();
        dup.card_number = "VAC-2024-902".into();
        records.push(dup);
        let err = MemoryStore::new(records).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
    }

    #[test]
    fn shared_phone_allowed_and_first_wins() {
        let mut records = seed_records();
        let mut twin = records[1].clone();
        twin.id = "APT-901".into();
        twin.card_number = "VAC-2024-901".into();
        records.push(twin);
        let store = MemoryStore::new(records).unwrap();

        let q = LookupQuery::new("+1987654321", "").unwrap();
        assert_eq!(store.find_by_phone_or_card(&q).unwrap().unwrap().id, "APT-002");
    }

    #[test]
    fn empty_store_is_valid() {
        let store = MemoryStore::new(Vec::new()).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        let q = LookupQuery::new("+1234567890", "").unwrap();
        assert!(store.find_by_phone_or_card(&q).unwrap().is_none());
    }
}
