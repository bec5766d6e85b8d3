use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Sex;
use crate::models::User;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, birth_date, sex, street, district, city, state)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id.to_string(),
            user.name,
            user.birth_date.to_string(),
            user.sex.as_str(),
            user.street,
            user.district,
            user.city,
            user.state,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, sex, street, district, city, state
         FROM users WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id.to_string()], user_row)?;

    match rows.next() {
        Some(row) => Ok(Some(user_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn get_all_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, sex, street, district, city, state
         FROM users ORDER BY name",
    )?;
    let rows = stmt.query_map([], user_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

/// Case-insensitive substring search on the user name.
pub fn get_users_by_name(conn: &Connection, name: &str) -> Result<Vec<User>, DatabaseError> {
    let pattern = format!("%{name}%");
    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, sex, street, district, city, state
         FROM users WHERE LOWER(name) LIKE LOWER(?1) ORDER BY name",
    )?;
    let rows = stmt.query_map(params![pattern], user_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

pub fn update_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE users SET name = ?1, birth_date = ?2, sex = ?3, street = ?4,
         district = ?5, city = ?6, state = ?7 WHERE id = ?8",
        params![
            user.name,
            user.birth_date.to_string(),
            user.sex.as_str(),
            user.street,
            user.district,
            user.city,
            user.state,
            user.id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: user.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_user(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn user_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Replace the user's allergy set. Runs in its own transaction so a partial
/// replacement is never observable.
pub fn set_user_allergies(
    conn: &Connection,
    user_id: &Uuid,
    allergy_ids: &[Uuid],
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM user_allergies WHERE user_id = ?1",
        params![user_id.to_string()],
    )?;
    for allergy_id in allergy_ids {
        tx.execute(
            "INSERT INTO user_allergies (user_id, allergy_id) VALUES (?1, ?2)",
            params![user_id.to_string(), allergy_id.to_string()],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_user_allergy_ids(conn: &Connection, user_id: &Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT allergy_id FROM user_allergies WHERE user_id = ?1",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], |row| row.get::<_, String>(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(
            Uuid::parse_str(&row?)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        );
    }
    Ok(ids)
}

/// Allergy names declared for the user, as consumed by the allergy gate.
pub fn get_user_allergy_names(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.name FROM allergies a
         JOIN user_allergies ua ON ua.allergy_id = a.id
         WHERE ua.user_id = ?1",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], |row| row.get(0))?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

type UserRow = (String, String, String, String, String, String, String, String);

fn user_row(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
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

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    let (id, name, birth_date, sex, street, district, city, state) = row;
    Ok(User {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        birth_date: NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        sex: Sex::from_str(&sex)?,
        street,
        district,
        city,
        state,
    })
}
