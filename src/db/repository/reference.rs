//! Reference-data stores: the allergy and component name catalogs.
//! Both are keyed name sets with case-insensitive uniqueness (COLLATE NOCASE).

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Allergy, Component};

// ─── Allergies ────────────────────────────────────────────────────────────────

pub fn insert_allergy(conn: &Connection, allergy: &Allergy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO allergies (id, name) VALUES (?1, ?2)",
        params![allergy.id.to_string(), allergy.name],
    )?;
    Ok(())
}

pub fn get_allergy(conn: &Connection, id: &Uuid) -> Result<Option<Allergy>, DatabaseError> {
    named_by_id(conn, "allergies", id)?
        .map(|(id, name)| Ok(Allergy { id, name }))
        .transpose()
}

pub fn get_allergy_by_name(conn: &Connection, name: &str) -> Result<Option<Allergy>, DatabaseError> {
    named_by_name(conn, "allergies", name)?
        .map(|(id, name)| Ok(Allergy { id, name }))
        .transpose()
}

pub fn get_all_allergies(conn: &Connection) -> Result<Vec<Allergy>, DatabaseError> {
    Ok(all_named(conn, "allergies")?
        .into_iter()
        .map(|(id, name)| Allergy { id, name })
        .collect())
}

pub fn update_allergy(conn: &Connection, allergy: &Allergy) -> Result<(), DatabaseError> {
    update_named(conn, "allergies", "Allergy", &allergy.id, &allergy.name)
}

pub fn delete_allergy(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    delete_named(conn, "allergies", "Allergy", id)
}

pub fn allergy_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    exists_named(conn, "allergies", id)
}

// ─── Components ───────────────────────────────────────────────────────────────

pub fn insert_component(conn: &Connection, component: &Component) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO components (id, name) VALUES (?1, ?2)",
        params![component.id.to_string(), component.name],
    )?;
    Ok(())
}

pub fn get_component(conn: &Connection, id: &Uuid) -> Result<Option<Component>, DatabaseError> {
    named_by_id(conn, "components", id)?
        .map(|(id, name)| Ok(Component { id, name }))
        .transpose()
}

pub fn get_component_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Component>, DatabaseError> {
    named_by_name(conn, "components", name)?
        .map(|(id, name)| Ok(Component { id, name }))
        .transpose()
}

pub fn get_all_components(conn: &Connection) -> Result<Vec<Component>, DatabaseError> {
    Ok(all_named(conn, "components")?
        .into_iter()
        .map(|(id, name)| Component { id, name })
        .collect())
}

pub fn update_component(conn: &Connection, component: &Component) -> Result<(), DatabaseError> {
    update_named(conn, "components", "Component", &component.id, &component.name)
}

pub fn delete_component(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    delete_named(conn, "components", "Component", id)
}

pub fn component_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    exists_named(conn, "components", id)
}

// ─── Shared plumbing ──────────────────────────────────────────────────────────
// Both catalogs are (id, name) tables; the table name is interpolated from a
// fixed set above, never from caller input.

fn named_by_id(
    conn: &Connection,
    table: &str,
    id: &Uuid,
) -> Result<Option<(Uuid, String)>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT id, name FROM {table} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id.to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    match rows.next() {
        Some(row) => {
            let (id, name) = row?;
            Ok(Some((
                Uuid::parse_str(&id)
                    .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
                name,
            )))
        }
        None => Ok(None),
    }
}

fn named_by_name(
    conn: &Connection,
    table: &str,
    name: &str,
) -> Result<Option<(Uuid, String)>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT id, name FROM {table} WHERE name = ?1 COLLATE NOCASE"))?;
    let mut rows = stmt.query_map(params![name], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    match rows.next() {
        Some(row) => {
            let (id, name) = row?;
            Ok(Some((
                Uuid::parse_str(&id)
                    .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
                name,
            )))
        }
        None => Ok(None),
    }
}

fn all_named(conn: &Connection, table: &str) -> Result<Vec<(Uuid, String)>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT id, name FROM {table} ORDER BY name"))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, name) = row?;
        out.push((
            Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            name,
        ));
    }
    Ok(out)
}

fn update_named(
    conn: &Connection,
    table: &str,
    entity_type: &str,
    id: &Uuid,
    name: &str,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        &format!("UPDATE {table} SET name = ?1 WHERE id = ?2"),
        params![name, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn delete_named(
    conn: &Connection,
    table: &str,
    entity_type: &str,
    id: &Uuid,
) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        &format!("DELETE FROM {table} WHERE id = ?1"),
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn exists_named(conn: &Connection, table: &str, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        &format!("SELECT COUNT(*) > 0 FROM {table} WHERE id = ?1"),
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}
