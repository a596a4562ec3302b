use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "id, card_number, patient_name, phone, email, appointment_date,
     appointment_time, vaccine, dose_number, location, status";

pub fn insert_appointment(
    conn: &Connection,
    record: &AppointmentRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, card_number, patient_name, phone, email, appointment_date,
         appointment_time, vaccine, dose_number, location, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id,
            record.card_number,
            record.patient_name,
            record.phone,
            record.email,
            record.appointment_date,
            record.appointment_time,
            record.vaccine,
            record.dose_number,
            record.location,
            record.status.as_str(),
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(format!("appointment {}: {e}", record.id))
        }
        other => DatabaseError::Sqlite(other),
    })?;
    Ok(())
}

/// First appointment (insertion order) whose phone equals `phone` or whose
/// card number equals `card_number` ignoring case. `None` fields never match.
pub fn find_appointment_by_phone_or_card(
    conn: &Connection,
    phone: Option<&str>,
    card_number: Option<&str>,
) -> Result<Option<AppointmentRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE (?1 IS NOT NULL AND phone = ?1)
            OR (?2 IS NOT NULL AND lower(card_number) = lower(?2))
         ORDER BY seq
         LIMIT 1"
    );
    let record = conn
        .query_row(&sql, params![phone, card_number], appointment_from_row)
        .optional()?;
    Ok(record)
}

pub fn count_appointments(conn: &Connection) -> Result<usize, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count as usize)
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRecord> {
    let status: String = row.get(10)?;
    Ok(AppointmentRecord {
        id: row.get(0)?,
        card_number: row.get(1)?,
        patient_name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        appointment_date: row.get::<_, NaiveDate>(5)?,
        appointment_time: row.get(6)?,
        vaccine: row.get(7)?,
        dose_number: row.get(8)?,
        location: row.get(9)?,
        status: AppointmentStatus::parse(&status),
    })
}
