//! Patient registry: personal data, address and declared allergies.
//!
//! The declared allergy set is what the booking flow's allergy gate checks
//! against, so creation and update resolve every allergy id up front instead
//! of letting a dangling reference surface later as a storage error.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::error::ServiceError;
use crate::models::enums::Sex;
use crate::models::User;

pub const MAX_NAME_LEN: usize = 60;
pub const MAX_STREET_LEN: usize = 60;
pub const MAX_DISTRICT_LEN: usize = 40;
pub const MAX_CITY_LEN: usize = 40;

/// Input payload for creating or fully replacing a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub allergy_ids: Vec<Uuid>,
}

fn validate(input: &NewUser) -> Result<(), ServiceError> {
    check_text("name", &input.name, MAX_NAME_LEN)?;
    check_text("street", &input.street, MAX_STREET_LEN)?;
    check_text("district", &input.district, MAX_DISTRICT_LEN)?;
    check_text("city", &input.city, MAX_CITY_LEN)?;

    let state_ok =
        input.state.len() == 2 && input.state.chars().all(|c| c.is_ascii_uppercase());
    if !state_ok {
        return Err(ServiceError::InvalidInput(
            "state must be a two-letter uppercase code".into(),
        ));
    }
    Ok(())
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(ServiceError::InvalidInput(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn resolve_allergies(conn: &Connection, allergy_ids: &[Uuid]) -> Result<(), ServiceError> {
    for allergy_id in allergy_ids {
        if !repository::allergy_exists(conn, allergy_id)? {
            return Err(ServiceError::not_found("Allergy", allergy_id));
        }
    }
    Ok(())
}

pub fn create_user(conn: &Connection, input: &NewUser) -> Result<User, ServiceError> {
    validate(input)?;
    resolve_allergies(conn, &input.allergy_ids)?;

    let user = User {
        id: Uuid::new_v4(),
        name: input.name.clone(),
        birth_date: input.birth_date,
        sex: input.sex,
        street: input.street.clone(),
        district: input.district.clone(),
        city: input.city.clone(),
        state: input.state.clone(),
    };
    repository::insert_user(conn, &user)?;
    repository::set_user_allergies(conn, &user.id, &input.allergy_ids)?;
    tracing::info!(user = %user.id, allergies = input.allergy_ids.len(), "created user");
    Ok(user)
}

/// Full replacement of the user's data, including the declared allergy set.
pub fn update_user(conn: &Connection, id: &Uuid, input: &NewUser) -> Result<User, ServiceError> {
    validate(input)?;
    if !repository::user_exists(conn, id)? {
        return Err(ServiceError::not_found("User", id));
    }
    resolve_allergies(conn, &input.allergy_ids)?;

    let user = User {
        id: *id,
        name: input.name.clone(),
        birth_date: input.birth_date,
        sex: input.sex,
        street: input.street.clone(),
        district: input.district.clone(),
        city: input.city.clone(),
        state: input.state.clone(),
    };
    repository::update_user(conn, &user)?;
    repository::set_user_allergies(conn, id, &input.allergy_ids)?;
    Ok(user)
}

pub fn find_user(conn: &Connection, id: &Uuid) -> Result<User, ServiceError> {
    repository::get_user(conn, id)?.ok_or_else(|| ServiceError::not_found("User", id))
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, ServiceError> {
    Ok(repository::get_all_users(conn)?)
}

/// Case-insensitive substring search on the name.
pub fn find_users_by_name(conn: &Connection, name: &str) -> Result<Vec<User>, ServiceError> {
    Ok(repository::get_users_by_name(conn, name)?)
}

pub fn user_allergy_ids(conn: &Connection, id: &Uuid) -> Result<Vec<Uuid>, ServiceError> {
    if !repository::user_exists(conn, id)? {
        return Err(ServiceError::not_found("User", id));
    }
    Ok(repository::get_user_allergy_ids(conn, id)?)
}

/// Delete a user. Fails while any appointment still references them; the
/// allergy associations go with the user.
pub fn delete_user(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    if !repository::user_exists(conn, id)? {
        return Err(ServiceError::not_found("User", id));
    }
    repository::delete_user(conn, id).map_err(|e| ServiceError::on_delete(e, "User", id))
}
