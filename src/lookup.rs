//! Appointment lookup by phone number or card number.
//!
//! A query carries up to two keys. A record matches when its phone equals
//! the phone key exactly, or when its card number equals the card key
//! ignoring case. The first matching record wins; no partial or fuzzy
//! matching is performed. "No match" is `None`, never an error.

use thiserror::Error;

use crate::models::AppointmentRecord;

const MAX_PHONE_LEN: usize = 32;
const MAX_CARD_LEN: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Enter a phone number or an appointment card number")]
    EmptyQuery,

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid card number: {0}")]
    InvalidCardNumber(String),
}

/// Validated search keys. At least one key is present.
///
/// A key made only of whitespace is kept as entered; no stored record has
/// a blank phone or card number, so it never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    phone: Option<String>,
    card_number: Option<String>,
}

impl LookupQuery {
    /// Build a query from raw form input.
    ///
    /// Empty fields count as absent. Present fields are kept verbatim so
    /// that phone matching stays exact.
    pub fn new(phone: &str, card_number: &str) -> Result<Self, LookupError> {
        let phone = non_empty(phone);
        let card_number = non_empty(card_number);

        if phone.is_none() && card_number.is_none() {
            return Err(LookupError::EmptyQuery);
        }
        if let Some(p) = phone.filter(|p| !is_blank(p)) {
            validate_phone(p)?;
        }
        if let Some(c) = card_number.filter(|c| !is_blank(c)) {
            validate_card_number(c)?;
        }

        Ok(Self {
            phone: phone.map(str::to_string),
            card_number: card_number.map(str::to_string),
        })
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn card_number(&self) -> Option<&str> {
        self.card_number.as_deref()
    }

    /// Whether `record` satisfies this query.
    pub fn matches(&self, record: &AppointmentRecord) -> bool {
        let phone_hit = self.phone.as_deref().is_some_and(|p| record.phone == p);
        let card_hit = self
            .card_number
            .as_deref()
            .is_some_and(|c| record.card_number.to_lowercase() == c.to_lowercase());
        phone_hit || card_hit
    }
}

/// Return the first record in `records` that matches `query`.
pub fn find_match<'a, I>(records: I, query: &LookupQuery) -> Option<&'a AppointmentRecord>
where
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    records.into_iter().find(|record| query.matches(record))
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn validate_phone(phone: &str) -> Result<(), LookupError> {
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(LookupError::InvalidPhone(format!(
            "must be at most {MAX_PHONE_LEN} characters"
        )));
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ' ' | '(' | ')');
    if let Some(bad) = phone.chars().find(|c| !allowed(*c)) {
        return Err(LookupError::InvalidPhone(format!(
            "unexpected character '{bad}'"
        )));
    }
    if !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(LookupError::InvalidPhone("must contain digits".into()));
    }
    Ok(())
}

fn validate_card_number(card: &str) -> Result<(), LookupError> {
    if card.len() > MAX_CARD_LEN {
        return Err(LookupError::InvalidCardNumber(format!(
            "must be at most {MAX_CARD_LEN} characters"
        )));
    }
    if let Some(bad) = card
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(LookupError::InvalidCardNumber(format!(
            "unexpected character '{bad}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::seed_records;

    #[test]
    fn empty_inputs_rejected() {
        assert_eq!(LookupQuery::new("", ""), Err(LookupError::EmptyQuery));
    }

    #[test]
    fn whitespace_only_field_is_searched_and_matches_nothing() {
        let records = seed_records();
        for (phone, card) in [("  ", ""), ("", "\t"), ("   ", " ")] {
            let q = LookupQuery::new(phone, card).unwrap();
            assert!(find_match(&records, &q).is_none(), "{phone:?}/{card:?}");
        }
    }

    #[test]
    fn blank_field_is_dropped() {
        let q = LookupQuery::new("", "VAC-2024-001").unwrap();
        assert_eq!(q.phone(), None);
        assert_eq!(q.card_number(), Some("VAC-2024-001"));
    }

    #[test]
    fn every_seed_found_by_phone() {
        let records = seed_records();
        for record in &records {
            let q = LookupQuery::new(&record.phone, "").unwrap();
            assert_eq!(find_match(&records, &q), Some(record));
        }
    }

    #[test]
    fn every_seed_found_by_any_card_case() {
        let records = seed_records();
        for record in &records {
            for variant in [
                record.card_number.clone(),
                record.card_number.to_lowercase(),
                record.card_number.to_uppercase(),
                swap_case(&record.card_number),
            ] {
                let q = LookupQuery::new("", &variant).unwrap();
                assert_eq!(find_match(&records, &q), Some(record), "variant {variant}");
            }
        }
    }

    #[test]
    fn phone_match_is_exact() {
        let records = seed_records();
        // Prefix of a real number, and the number with formatting added.
        for phone in ["+123456789", "+1 234 567 890", "1234567890"] {
            let q = LookupQuery::new(phone, "").unwrap();
            assert!(find_match(&records, &q).is_none(), "phone {phone}");
        }
    }

    #[test]
    fn card_match_is_not_partial() {
        let records = seed_records();
        let q = LookupQuery::new("", "VAC-2024").unwrap();
        assert!(find_match(&records, &q).is_none());
    }

    #[test]
    fn either_key_is_enough() {
        let records = seed_records();
        // Phone misses, card hits.
        let q = LookupQuery::new("0000000000", "vac-2024-001").unwrap();
        assert_eq!(find_match(&records, &q).unwrap().id, "APT-001");
    }

    #[test]
    fn first_match_wins_when_keys_point_at_different_records() {
        let records = seed_records();
        // Phone of APT-002, card of APT-001: APT-001 comes first in seed order.
        let q = LookupQuery::new("+1987654321", "VAC-2024-001").unwrap();
        assert_eq!(find_match(&records, &q).unwrap().id, "APT-001");
    }

    #[test]
    fn scenario_phone_only() {
        let records = seed_records();
        let q = LookupQuery::new("+1234567890", "").unwrap();
        let found = find_match(&records, &q).unwrap();
        assert_eq!(found.id, "APT-001");
        assert_eq!(found.patient_name, "John Doe");
    }

    #[test]
    fn scenario_lowercase_card() {
        let records = seed_records();
        let q = LookupQuery::new("", "vac-2024-002").unwrap();
        let found = find_match(&records, &q).unwrap();
        assert_eq!(found.id, "APT-002");
        assert_eq!(found.patient_name, "Jane Smith");
    }

    #[test]
    fn scenario_no_match() {
        let records = seed_records();
        let q = LookupQuery::new("0000000000", "XXX").unwrap();
        assert!(find_match(&records, &q).is_none());
    }

    #[test]
    fn phone_validation() {
        assert!(LookupQuery::new("+1 (555) 010-0000", "").is_ok());
        assert!(matches!(
            LookupQuery::new("call me", ""),
            Err(LookupError::InvalidPhone(_))
        ));
        assert!(matches!(
            LookupQuery::new("+-()", ""),
            Err(LookupError::InvalidPhone(_))
        ));
        let long = "1".repeat(MAX_PHONE_LEN + 1);
        assert!(matches!(
            LookupQuery::new(&long, ""),
            Err(LookupError::InvalidPhone(_))
        ));
    }

    #[test]
    fn card_validation() {
        assert!(matches!(
            LookupQuery::new("", "VAC 2024 001"),
            Err(LookupError::InvalidCardNumber(_))
        ));
        assert!(matches!(
            LookupQuery::new("", "VAC-2024-001'; --"),
            Err(LookupError::InvalidCardNumber(_))
        ));
        let long = "A".repeat(MAX_CARD_LEN + 1);
        assert!(matches!(
            LookupQuery::new("", &long),
            Err(LookupError::InvalidCardNumber(_))
        ));
    }

    fn swap_case(s: &str) -> String {
        s.chars()
            .enumerate()
            .map(|(i, c)| {
                if i % 2 == 0 {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect()
    }
}
