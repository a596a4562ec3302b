use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A single vaccination appointment as shown on the verify page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: String,
    pub card_number: String,
    pub patient_name: String,
    pub phone: String,
    pub email: String,
    pub appointment_date: NaiveDate,
    /// Display string such as "10:30 AM". Never parsed.
    pub appointment_time: String,
    pub vaccine: String,
    pub dose_number: String,
    pub location: String,
    pub status: AppointmentStatus,
}

impl AppointmentRecord {
    /// Case-insensitive card comparison key.
    pub fn card_key(&self) -> String {
        self.card_number.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppointmentRecord {
        AppointmentRecord {
            id: "APT-900".into(),
            card_number: "VAC-2030-900".into(),
            patient_name: "Test Patient".into(),
            phone: "+15550000".into(),
            email: "test@example.com".into(),
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            appointment_time: "9:00 AM".into(),
            vaccine: "Hepatitis B".into(),
            dose_number: "1st Dose".into(),
            location: "Annex - Room 3".into(),
            status: AppointmentStatus::Confirmed,
        }
    }

    #[test]
    fn serializes_camel_case_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["cardNumber"], "VAC-2030-900");
        assert_eq!(json["patientName"], "Test Patient");
        assert_eq!(json["appointmentDate"], "2030-01-02");
        assert_eq!(json["doseNumber"], "1st Dose");
        assert_eq!(json["status"], "confirmed");
    }

    #[test]
    fn card_key_is_lowercase() {
        assert_eq!(sample().card_key(), "vac-2030-900");
    }
}
