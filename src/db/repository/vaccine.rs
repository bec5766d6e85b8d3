use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Periodicity;
use crate::models::Vaccine;

pub fn insert_vaccine(conn: &Connection, vaccine: &Vaccine) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vaccines (id, title, description, doses, periodicity, interval)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            vaccine.id.to_string(),
            vaccine.title,
            vaccine.description,
            vaccine.doses,
            vaccine.periodicity.map(|p| p.code()),
            vaccine.interval,
        ],
    )?;
    Ok(())
}

pub fn get_vaccine(conn: &Connection, id: &Uuid) -> Result<Option<Vaccine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, doses, periodicity, interval
         FROM vaccines WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id.to_string()], vaccine_row)?;

    match rows.next() {
        Some(row) => Ok(Some(vaccine_from_row(row?)?)),
        None => Ok(None),
    }
}

/// Title lookup under the catalog's case-insensitive uniqueness rule.
pub fn get_vaccine_by_title(conn: &Connection, title: &str) -> Result<Option<Vaccine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, doses, periodicity, interval
         FROM vaccines WHERE title = ?1 COLLATE NOCASE",
    )?;
    let mut rows = stmt.query_map(params![title], vaccine_row)?;

    match rows.next() {
        Some(row) => Ok(Some(vaccine_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn get_all_vaccines(conn: &Connection) -> Result<Vec<Vaccine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, doses, periodicity, interval
         FROM vaccines ORDER BY title",
    )?;
    let rows = stmt.query_map([], vaccine_row)?;

    let mut vaccines = Vec::new();
    for row in rows {
        vaccines.push(vaccine_from_row(row?)?);
    }
    Ok(vaccines)
}

pub fn update_vaccine(conn: &Connection, vaccine: &Vaccine) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE vaccines SET title = ?1, description = ?2, doses = ?3,
         periodicity = ?4, interval = ?5 WHERE id = ?6",
        params![
            vaccine.title,
            vaccine.description,
            vaccine.doses,
            vaccine.periodicity.map(|p| p.code()),
            vaccine.interval,
            vaccine.id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Vaccine".into(),
            id: vaccine.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_vaccine(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM vaccines WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Vaccine".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn vaccine_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM vaccines WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Replace the vaccine's component set. Runs in its own transaction so a
/// partial replacement is never observable.
pub fn set_vaccine_components(
    conn: &Connection,
    vaccine_id: &Uuid,
    component_ids: &[Uuid],
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM vaccine_components WHERE vaccine_id = ?1",
        params![vaccine_id.to_string()],
    )?;
    for component_id in component_ids {
        tx.execute(
            "INSERT INTO vaccine_components (vaccine_id, component_id) VALUES (?1, ?2)",
            params![vaccine_id.to_string(), component_id.to_string()],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_vaccine_component_ids(
    conn: &Connection,
    vaccine_id: &Uuid,
) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT component_id FROM vaccine_components WHERE vaccine_id = ?1",
    )?;
    let rows = stmt.query_map(params![vaccine_id.to_string()], |row| row.get::<_, String>(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(
            Uuid::parse_str(&row?)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        );
    }
    Ok(ids)
}

/// Component names of the vaccine, as consumed by the allergy gate.
pub fn get_vaccine_component_names(
    conn: &Connection,
    vaccine_id: &Uuid,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT c.name FROM components c
         JOIN vaccine_components vc ON vc.component_id = c.id
         WHERE vc.vaccine_id = ?1",
    )?;
    let rows = stmt.query_map(params![vaccine_id.to_string()], |row| row.get(0))?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

type VaccineRow = (String, String, String, u32, Option<i64>, Option<u32>);

fn vaccine_row(row: &rusqlite::Row<'_>) -> Result<VaccineRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn vaccine_from_row(row: VaccineRow) -> Result<Vaccine, DatabaseError> {
    let (id, title, description, doses, periodicity, interval) = row;
    Ok(Vaccine {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        title,
        description,
        doses,
        periodicity: periodicity.map(Periodicity::from_code).transpose()?,
        interval,
    })
}
