use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, vaccine_id, date, time, status, status_date, notes FROM appointments";

/// Persist a booked dose sequence as a single atomic batch: either every
/// appointment lands or none do.
pub fn insert_appointments(
    conn: &Connection,
    appointments: &[Appointment],
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO appointments (id, user_id, vaccine_id, date, time, status, status_date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for appointment in appointments {
            stmt.execute(params![
                appointment.id.to_string(),
                appointment.user_id.to_string(),
                appointment.vaccine_id.to_string(),
                appointment.date.to_string(),
                appointment.time.format("%H:%M").to_string(),
                appointment.status.as_str(),
                appointment.status_date.map(|d| d.to_string()),
                appointment.notes,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id.to_string()], appointment_row)?;

    match rows.next() {
        Some(row) => Ok(Some(appointment_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn get_all_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY date, time"))?;
    let rows = stmt.query_map([], appointment_row)?;
    collect_appointments(rows)
}

pub fn get_appointments_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY date, time"))?;
    let rows = stmt.query_map(params![user_id.to_string()], appointment_row)?;
    collect_appointments(rows)
}

pub fn get_appointments_by_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY date, time"))?;
    let rows = stmt.query_map(params![status.as_str()], appointment_row)?;
    collect_appointments(rows)
}

/// Write the lifecycle transition: status plus status-change date, nothing else.
pub fn update_appointment_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
    status_date: NaiveDate,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET status = ?1, status_date = ?2 WHERE id = ?3",
        params![status.as_str(), status_date.to_string(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Deletes the appointment; its reactions go with it (ON DELETE CASCADE).
pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn appointment_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM appointments WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

type AppointmentRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
);

fn appointment_row(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn collect_appointments(
    rows: impl Iterator<Item = Result<AppointmentRow, rusqlite::Error>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let (id, user_id, vaccine_id, date, time, status, status_date, notes) = row;
    Ok(Appointment {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        vaccine_id: Uuid::parse_str(&vaccine_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        time: NaiveTime::parse_from_str(&time, "%H:%M")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        status: AppointmentStatus::from_str(&status)?,
        status_date: status_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        notes,
    })
}
