//! Reference-data management: allergy names and vaccine component names.
//!
//! Both catalogs behave identically: free-text names, unique without regard
//! to case, deletable only while nothing references them. The allergy gate in
//! the booking flow compares against these names, so uniqueness here keeps
//! the gate's matching unambiguous.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::error::ServiceError;
use crate::models::{Allergy, Component};

pub const MAX_NAME_LEN: usize = 60;

fn validated_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

// ─── Allergies ────────────────────────────────────────────────────────────────

pub fn create_allergy(conn: &Connection, name: &str) -> Result<Allergy, ServiceError> {
    let name = validated_name(name)?;
    if repository::get_allergy_by_name(conn, &name)?.is_some() {
        return Err(ServiceError::Conflict { entity: "Allergy", name });
    }
    let allergy = Allergy { id: Uuid::new_v4(), name };
    repository::insert_allergy(conn, &allergy)?;
    tracing::debug!(allergy = %allergy.id, "created allergy");
    Ok(allergy)
}

/// Rename an allergy. The new name must not collide with a different entry,
/// comparing case-insensitively; renaming to a casing variant of itself is
/// allowed.
pub fn rename_allergy(conn: &Connection, id: &Uuid, name: &str) -> Result<Allergy, ServiceError> {
    let name = validated_name(name)?;
    if !repository::allergy_exists(conn, id)? {
        return Err(ServiceError::not_found("Allergy", id));
    }
    if let Some(existing) = repository::get_allergy_by_name(conn, &name)? {
        if existing.id != *id {
            return Err(ServiceError::Conflict { entity: "Allergy", name });
        }
    }
    let allergy = Allergy { id: *id, name };
    repository::update_allergy(conn, &allergy)?;
    Ok(allergy)
}

pub fn find_allergy(conn: &Connection, id: &Uuid) -> Result<Allergy, ServiceError> {
    repository::get_allergy(conn, id)?.ok_or_else(|| ServiceError::not_found("Allergy", id))
}

pub fn find_allergy_by_name(conn: &Connection, name: &str) -> Result<Allergy, ServiceError> {
    repository::get_allergy_by_name(conn, name)?
        .ok_or_else(|| ServiceError::not_found("Allergy", name))
}

pub fn list_allergies(conn: &Connection) -> Result<Vec<Allergy>, ServiceError> {
    Ok(repository::get_all_allergies(conn)?)
}

/// Delete an allergy. Fails while any user still lists it.
pub fn delete_allergy(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    if !repository::allergy_exists(conn, id)? {
        return Err(ServiceError::not_found("Allergy", id));
    }
    repository::delete_allergy(conn, id).map_err(|e| ServiceError::on_delete(e, "Allergy", id))
}

// ─── Components ───────────────────────────────────────────────────────────────

pub fn create_component(conn: &Connection, name: &str) -> Result<Component, ServiceError> {
    let name = validated_name(name)?;
    if repository::get_component_by_name(conn, &name)?.is_some() {
        return Err(ServiceError::Conflict { entity: "Component", name });
    }
    let component = Component { id: Uuid::new_v4(), name };
    repository::insert_component(conn, &component)?;
    tracing::debug!(component = %component.id, "created component");
    Ok(component)
}

pub fn rename_component(conn: &Connection, id: &Uuid, name: &str) -> Result<Component, ServiceError> {
    let name = validated_name(name)?;
    if !repository::component_exists(conn, id)? {
        return Err(ServiceError::not_found("Component", id));
    }
    if let Some(existing) = repository::get_component_by_name(conn, &name)? {
        if existing.id != *id {
            return Err(ServiceError::Conflict { entity: "Component", name });
        }
    }
    let component = Component { id: *id, name };
    repository::update_component(conn, &component)?;
    Ok(component)
}

pub fn find_component(conn: &Connection, id: &Uuid) -> Result<Component, ServiceError> {
    repository::get_component(conn, id)?.ok_or_else(|| ServiceError::not_found("Component", id))
}

pub fn find_component_by_name(conn: &Connection, name: &str) -> Result<Component, ServiceError> {
    repository::get_component_by_name(conn, name)?
        .ok_or_else(|| ServiceError::not_found("Component", name))
}

pub fn list_components(conn: &Connection) -> Result<Vec<Component>, ServiceError> {
    Ok(repository::get_all_components(conn)?)
}

/// Delete a component. Fails while any vaccine still contains it.
pub fn delete_component(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    if !repository::component_exists(conn, id)? {
        return Err(ServiceError::not_found("Component", id));
    }
    repository::delete_component(conn, id).map_err(|e| ServiceError::on_delete(e, "Component", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    #[test]
    fn create_and_find_allergy() {
        let conn = test_db();
        let created = create_allergy(&conn, "Penicillin").unwrap();

        let by_id = find_allergy(&conn, &created.id).unwrap();
        assert_eq!(by_id.name, "Penicillin");

        let by_name = find_allergy_by_name(&conn, "penicillin").unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[test]
    fn duplicate_name_conflicts_case_insensitively() {
        let conn = test_db();
        create_allergy(&conn, "Latex").unwrap();

        let err = create_allergy(&conn, "LATEX").unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { entity: "Allergy", .. }));

        create_component(&conn, "Gelatin").unwrap();
        let err = create_component(&conn, "gelatin").unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { entity: "Component", .. }));
    }

    #[test]
    fn name_is_trimmed_and_validated() {
        let conn = test_db();
        let created = create_allergy(&conn, "  Dust mites  ").unwrap();
        assert_eq!(created.name, "Dust mites");

        assert!(matches!(
            create_allergy(&conn, "   "),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            create_component(&conn, &"x".repeat(MAX_NAME_LEN + 1)),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn rename_allows_own_casing_variant() {
        let conn = test_db();
        let created = create_allergy(&conn, "latex").unwrap();

        let renamed = rename_allergy(&conn, &created.id, "Latex").unwrap();
        assert_eq!(renamed.name, "Latex");
        assert_eq!(find_allergy(&conn, &created.id).unwrap().name, "Latex");
    }

    #[test]
    fn rename_rejects_collision_with_other_entry() {
        let conn = test_db();
        create_component(&conn, "Saline").unwrap();
        let other = create_component(&conn, "Gelatin").unwrap();

        let err = rename_component(&conn, &other.id, "saline").unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { entity: "Component", .. }));
    }

    #[test]
    fn missing_lookups_are_not_found() {
        let conn = test_db();
        assert!(matches!(
            find_allergy(&conn, &Uuid::new_v4()),
            Err(ServiceError::NotFound { entity: "Allergy", .. })
        ));
        assert!(matches!(
            find_component_by_name(&conn, "nothing"),
            Err(ServiceError::NotFound { entity: "Component", .. })
        ));
        assert!(matches!(
            rename_allergy(&conn, &Uuid::new_v4(), "Name"),
            Err(ServiceError::NotFound { entity: "Allergy", .. })
        ));
        assert!(matches!(
            delete_component(&conn, &Uuid::new_v4()),
            Err(ServiceError::NotFound { entity: "Component", .. })
        ));
    }

    #[test]
    fn list_is_sorted_by_name() {
        let conn = test_db();
        create_allergy(&conn, "Pollen").unwrap();
        create_allergy(&conn, "Dust").unwrap();
        create_allergy(&conn, "Latex").unwrap();

        let names: Vec<String> = list_allergies(&conn).unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Dust", "Latex", "Pollen"]);
    }

    #[test]
    fn unreferenced_entries_delete_cleanly() {
        let conn = test_db();
        let allergy = create_allergy(&conn, "Pollen").unwrap();
        delete_allergy(&conn, &allergy.id).unwrap();
        assert!(list_allergies(&conn).unwrap().is_empty());
    }

    // Referenced-entry deletion is exercised end to end in the users and
    // vaccines service tests, where the referencing rows exist.
}
