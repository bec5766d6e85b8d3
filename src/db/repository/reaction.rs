use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Reaction;

pub fn insert_reaction(conn: &Connection, reaction: &Reaction) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reactions (id, appointment_id, description, reaction_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            reaction.id.to_string(),
            reaction.appointment_id.to_string(),
            reaction.description,
            reaction.reaction_date.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_reaction(conn: &Connection, id: &Uuid) -> Result<Option<Reaction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, description, reaction_date
         FROM reactions WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id.to_string()], reaction_row)?;

    match rows.next() {
        Some(row) => Ok(Some(reaction_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn get_all_reactions(conn: &Connection) -> Result<Vec<Reaction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, description, reaction_date
         FROM reactions ORDER BY reaction_date",
    )?;
    let rows = stmt.query_map([], reaction_row)?;
    collect_reactions(rows)
}

pub fn get_reactions_by_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Vec<Reaction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, description, reaction_date
         FROM reactions WHERE appointment_id = ?1 ORDER BY reaction_date",
    )?;
    let rows = stmt.query_map(params![appointment_id.to_string()], reaction_row)?;
    collect_reactions(rows)
}

/// Reactions across every appointment of one user (join through appointments).
pub fn get_reactions_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Reaction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.appointment_id, r.description, r.reaction_date
         FROM reactions r
         JOIN appointments a ON r.appointment_id = a.id
         WHERE a.user_id = ?1
         ORDER BY r.reaction_date",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], reaction_row)?;
    collect_reactions(rows)
}

pub fn delete_reaction(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM reactions WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Reaction".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn reaction_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM reactions WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

type ReactionRow = (String, String, String, String);

fn reaction_row(row: &rusqlite::Row<'_>) -> Result<ReactionRow, rusqlite::Error> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn collect_reactions(
    rows: impl Iterator<Item = Result<ReactionRow, rusqlite::Error>>,
) -> Result<Vec<Reaction>, DatabaseError> {
    let mut reactions = Vec::new();
    for row in rows {
        reactions.push(reaction_from_row(row?)?);
    }
    Ok(reactions)
}

fn reaction_from_row(row: ReactionRow) -> Result<Reaction, DatabaseError> {
    let (id, appointment_id, description, reaction_date) = row;
    Ok(Reaction {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        appointment_id: Uuid::parse_str(&appointment_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        description,
        reaction_date: NaiveDate::parse_from_str(&reaction_date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
    })
}
