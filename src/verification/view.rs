//! Appointment detail view for a verified record.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AppointmentRecord, AppointmentStatus};
use crate::status::{classify, StatusBadge};

/// Long date format used on the detail card, e.g. "Thursday, November 20, 2025".
pub const LONG_DATE_FORMAT: &str = "%A, %B %-d, %Y";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: String,
    pub card_number: String,
    pub header: String,
    pub status: AppointmentStatus,
    pub badge: StatusBadge,
    pub patient: PatientSection,
    pub schedule: ScheduleSection,
    pub vaccination: VaccinationSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSection {
    pub name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSection {
    pub date: NaiveDate,
    pub date_display: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationSection {
    pub vaccine: String,
    pub dose_number: String,
    pub location: String,
}

impl AppointmentView {
    pub fn from_record(record: &AppointmentRecord) -> Self {
        Self {
            id: record.id.clone(),
            card_number: record.card_number.clone(),
            header: format!(
                "Appointment ID: {} \u{2022} Card: {}",
                record.id, record.card_number
            ),
            status: record.status.clone(),
            badge: classify(&record.status),
            patient: PatientSection {
                name: record.patient_name.clone(),
                phone: record.phone.clone(),
                email: record.email.clone(),
            },
            schedule: ScheduleSection {
                date: record.appointment_date,
                date_display: record.appointment_date.format(LONG_DATE_FORMAT).to_string(),
                time: record.appointment_time.clone(),
            },
            vaccination: VaccinationSection {
                vaccine: record.vaccine.clone(),
                dose_number: record.dose_number.clone(),
                location: record.location.clone(),
            },
        }
    }
}
