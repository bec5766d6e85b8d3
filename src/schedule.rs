//! Booking and lifecycle of vaccination appointments.
//!
//! A booking request expands into one appointment per vaccine dose: the
//! allergy gate vets the user/vaccine pair, the recurrence planner lays out
//! the dose dates, and the whole batch is persisted atomically in `Scheduled`
//! status. From there each appointment moves through the status state machine
//! (`Scheduled` → `Completed` | `Cancelled`) exactly once.

use chrono::{Duration, Local, Months, NaiveDate, NaiveTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::error::ServiceError;
use crate::models::enums::{AppointmentStatus, Periodicity};
use crate::models::Appointment;

pub const MAX_NOTES_LEN: usize = 200;

/// Request to book a full dose sequence for one user and one vaccine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: Uuid,
    pub vaccine_id: Uuid,
    pub start_date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

// ─── Allergy gate ─────────────────────────────────────────────────────────────

/// True when none of the vaccine's component names matches any of the user's
/// allergy names under case-insensitive comparison. Pure membership test;
/// duplicates on either side do not change the outcome.
pub fn can_book(user_allergies: &[String], vaccine_components: &[String]) -> bool {
    blocking_component(user_allergies, vaccine_components).is_none()
}

/// The first component the user is allergic to, if any.
fn blocking_component(user_allergies: &[String], vaccine_components: &[String]) -> Option<String> {
    let allergies: Vec<String> = user_allergies.iter().map(|a| a.to_lowercase()).collect();
    vaccine_components
        .iter()
        .find(|component| allergies.contains(&component.to_lowercase()))
        .cloned()
}

// ─── Recurrence planner ───────────────────────────────────────────────────────

/// Expand a starting date into the ordered dose-date sequence.
///
/// Exactly `doses` entries, non-decreasing. A single dose is just the start
/// date. Multiple doses advance each date from the previous one by `interval`
/// units of `periodicity` using calendar arithmetic (month/year advancement
/// clamps at month end). When periodicity or interval is absent or zero the
/// date simply repeats, mirroring the no-op-interval edge case of the booking
/// flow.
pub fn plan_doses(
    start_date: NaiveDate,
    doses: u32,
    periodicity: Option<Periodicity>,
    interval: Option<u32>,
) -> Result<Vec<NaiveDate>, ServiceError> {
    if doses < 1 {
        return Err(ServiceError::InvalidInput(
            "a vaccine needs at least one dose".into(),
        ));
    }

    let step = match (periodicity, interval) {
        (Some(periodicity), Some(interval)) if interval > 0 => Some((periodicity, interval)),
        _ => None,
    };

    let mut dates = Vec::with_capacity(doses as usize);
    let mut date = start_date;
    for i in 0..doses {
        dates.push(date);
        if i + 1 < doses {
            if let Some((periodicity, interval)) = step {
                date = advance(date, periodicity, interval)?;
            }
        }
    }
    Ok(dates)
}

fn advance(
    date: NaiveDate,
    periodicity: Periodicity,
    interval: u32,
) -> Result<NaiveDate, ServiceError> {
    let next = match periodicity {
        Periodicity::Days => date.checked_add_signed(Duration::days(interval.into())),
        Periodicity::Weeks => date.checked_add_signed(Duration::weeks(interval.into())),
        Periodicity::Months => date.checked_add_months(Months::new(interval)),
        Periodicity::Years => interval
            .checked_mul(12)
            .and_then(|months| date.checked_add_months(Months::new(months))),
    };
    next.ok_or_else(|| ServiceError::InvalidInput("planned dose date out of range".into()))
}

// ─── Booking orchestrator ─────────────────────────────────────────────────────

/// Book the complete dose sequence for a user/vaccine pair.
///
/// Resolves both entities, runs the allergy gate, plans the dates and persists
/// one `Scheduled` appointment per dose as a single atomic batch. On any
/// failure nothing is persisted. Returns the appointments in planned order.
pub fn book(conn: &Connection, request: &BookingRequest) -> Result<Vec<Appointment>, ServiceError> {
    let user = repository::get_user(conn, &request.user_id)?
        .ok_or_else(|| ServiceError::not_found("User", request.user_id))?;
    let vaccine = repository::get_vaccine(conn, &request.vaccine_id)?
        .ok_or_else(|| ServiceError::not_found("Vaccine", request.vaccine_id))?;

    let allergies = repository::get_user_allergy_names(conn, &user.id)?;
    let components = repository::get_vaccine_component_names(conn, &vaccine.id)?;
    if let Some(component) = blocking_component(&allergies, &components) {
        tracing::info!(
            user = %user.id,
            vaccine = %vaccine.id,
            %component,
            "booking blocked by allergy gate"
        );
        return Err(ServiceError::BlockedByAllergy { component });
    }

    if let Some(notes) = &request.notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(ServiceError::InvalidInput(format!(
                "notes must be at most {MAX_NOTES_LEN} characters"
            )));
        }
    }

    let dates = plan_doses(
        request.start_date,
        vaccine.doses,
        vaccine.periodicity,
        vaccine.interval,
    )?;

    let appointments: Vec<Appointment> = dates
        .into_iter()
        .map(|date| Appointment {
            id: Uuid::new_v4(),
            user_id: user.id,
            vaccine_id: vaccine.id,
            date,
            time: request.time,
            status: AppointmentStatus::Scheduled,
            status_date: None,
            notes: request.notes.clone(),
        })
        .collect();

    repository::insert_appointments(conn, &appointments)?;
    tracing::info!(
        user = %user.id,
        vaccine = %vaccine.id,
        doses = appointments.len(),
        "booked dose sequence"
    );
    Ok(appointments)
}

// ─── Status lifecycle ─────────────────────────────────────────────────────────

/// Close out an appointment as `Completed` or `Cancelled`.
///
/// Any other target is rejected as invalid input; an appointment already in a
/// terminal status is rejected as an invalid state rather than silently
/// re-stamped. Sets the status-change date to today and touches nothing else.
pub fn mark_outcome(
    conn: &Connection,
    appointment_id: &Uuid,
    target: AppointmentStatus,
) -> Result<Appointment, ServiceError> {
    if !target.is_terminal() {
        return Err(ServiceError::InvalidInput(format!(
            "target status must be completed or cancelled, got {}",
            target.as_str()
        )));
    }

    let mut appointment = repository::get_appointment(conn, appointment_id)?
        .ok_or_else(|| ServiceError::not_found("Appointment", appointment_id))?;

    if appointment.status.is_terminal() {
        return Err(ServiceError::InvalidState(format!(
            "appointment {} is already {}",
            appointment.id,
            appointment.status.as_str()
        )));
    }

    let today = Local::now().date_naive();
    repository::update_appointment_status(conn, appointment_id, target, today)?;

    appointment.status = target;
    appointment.status_date = Some(today);
    tracing::info!(appointment = %appointment.id, outcome = target.as_str(), "marked outcome");
    Ok(appointment)
}

// ─── Queries and deletion ─────────────────────────────────────────────────────

pub fn find_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, ServiceError> {
    repository::get_appointment(conn, id)?
        .ok_or_else(|| ServiceError::not_found("Appointment", id))
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, ServiceError> {
    Ok(repository::get_all_appointments(conn)?)
}

pub fn appointments_by_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> Result<Vec<Appointment>, ServiceError> {
    Ok(repository::get_appointments_by_status(conn, status)?)
}

/// All appointments of one user. The user itself must exist.
pub fn appointments_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Appointment>, ServiceError> {
    if !repository::user_exists(conn, user_id)? {
        return Err(ServiceError::not_found("User", user_id));
    }
    Ok(repository::get_appointments_by_user(conn, user_id)?)
}

/// Delete an appointment; its recorded reactions are removed with it.
pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    if !repository::appointment_exists(conn, id)? {
        return Err(ServiceError::not_found("Appointment", id));
    }
    repository::delete_appointment(conn, id)?;
    Ok(())
}
