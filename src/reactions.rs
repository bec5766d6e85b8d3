//! Adverse-reaction records tied to completed appointments.
//!
//! A reaction can only be recorded against an appointment whose dose was
//! actually administered, so the gate here is the `Completed` status. Records
//! live and die with their appointment.

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::error::ServiceError;
use crate::models::enums::AppointmentStatus;
use crate::models::Reaction;

pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Record an adverse reaction to a completed appointment.
pub fn record_reaction(
    conn: &Connection,
    appointment_id: &Uuid,
    description: &str,
    reaction_date: NaiveDate,
) -> Result<Reaction, ServiceError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ServiceError::InvalidInput("description must not be empty".into()));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    let appointment = repository::get_appointment(conn, appointment_id)?
        .ok_or_else(|| ServiceError::not_found("Appointment", appointment_id))?;
    if appointment.status != AppointmentStatus::Completed {
        return Err(ServiceError::InvalidState(format!(
            "reactions can only be recorded for completed appointments, appointment {} is {}",
            appointment.id,
            appointment.status.as_str()
        )));
    }

    let reaction = Reaction {
        id: Uuid::new_v4(),
        appointment_id: *appointment_id,
        description: description.to_string(),
        reaction_date,
    };
    repository::insert_reaction(conn, &reaction)?;
    tracing::info!(reaction = %reaction.id, appointment = %appointment_id, "recorded reaction");
    Ok(reaction)
}

pub fn find_reaction(conn: &Connection, id: &Uuid) -> Result<Reaction, ServiceError> {
    repository::get_reaction(conn, id)?.ok_or_else(|| ServiceError::not_found("Reaction", id))
}

pub fn list_reactions(conn: &Connection) -> Result<Vec<Reaction>, ServiceError> {
    Ok(repository::get_all_reactions(conn)?)
}

/// Reactions recorded against one appointment. The appointment must exist.
pub fn reactions_by_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Vec<Reaction>, ServiceError> {
    if !repository::appointment_exists(conn, appointment_id)? {
        return Err(ServiceError::not_found("Appointment", appointment_id));
    }
    Ok(repository::get_reactions_by_appointment(conn, appointment_id)?)
}

/// Reactions across every appointment of one user.
pub fn reactions_by_user(conn: &Connection, user_id: &Uuid) -> Result<Vec<Reaction>, ServiceError> {
    if !repository::user_exists(conn, user_id)? {
        return Err(ServiceError::not_found("User", user_id));
    }
    Ok(repository::get_reactions_by_user(conn, user_id)?)
}

pub fn delete_reaction(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    if !repository::reaction_exists(conn, id)? {
        return Err(ServiceError::not_found("Reaction", id));
    }
    repository::delete_reaction(conn, id)?;
    Ok(())
}
