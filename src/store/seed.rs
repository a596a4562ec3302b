//! Appointments available at process start.

use chrono::NaiveDate;

use crate::models::{AppointmentRecord, AppointmentStatus};

struct SeedRow {
    id: &'static str,
    card_number: &'static str,
    patient_name: &'static str,
    phone: &'static str,
    email: &'static str,
    date: (i32, u32, u32),
    time: &'static str,
    vaccine: &'static str,
    dose_number: &'static str,
    location: &'static str,
    status: &'static str,
}

const SEED: &[SeedRow] = &[
    SeedRow {
        id: "APT-001",
        card_number: "VAC-2024-001",
        patient_name: "John Doe",
        phone: "+1234567890",
        email: "john.doe@example.com",
        date: (2025, 11, 20),
        time: "10:30 AM",
        vaccine: "COVID-19 Pfizer-BioNTech",
        dose_number: "2nd Dose",
        location: "Main Health Center - Room 202",
        status: "confirmed",
    },
    SeedRow {
        id: "APT-002",
        card_number: "VAC-2024-002",
        patient_name: "Jane Smith",
        phone: "+1987654321",
        email: "jane.smith@example.com",
        date: (2025, 11, 22),
        time: "2:00 PM",
        vaccine: "Influenza Vaccine",
        dose_number: "Annual Dose",
        location: "Community Clinic - Room 101",
        status: "pending",
    },
];

/// Build the seed records in their fixed order.
pub fn seed_records() -> Vec<AppointmentRecord> {
    SEED.iter()
        .filter_map(|row| {
            let (y, m, d) = row.date;
            let Some(appointment_date) = NaiveDate::from_ymd_opt(y, m, d) else {
                tracing::warn!(id = row.id, "Skipping seed row with invalid date");
                return None;
            };
            Some(AppointmentRecord {
                id: row.id.to_string(),
                card_number: row.card_number.to_string(),
                patient_name: row.patient_name.to_string(),
                phone: row.phone.to_string(),
                email: row.email.to_string(),
                appointment_date,
                appointment_time: row.time.to_string(),
                vaccine: row.vaccine.to_string(),
                dose_number: row.dose_number.to_string(),
                location: row.location.to_string(),
                status: AppointmentStatus::parse(row.status),
            })
        })
        .collect()
}
