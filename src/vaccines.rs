//! Vaccine definitions: dose count, recurrence schedule and component list.
//!
//! The schedule fields are validated jointly: a single-dose vaccine carries
//! no periodicity or interval, a multi-dose vaccine must carry both. The
//! booking flow trusts these invariants when it expands a dose sequence.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::error::ServiceError;
use crate::models::enums::Periodicity;
use crate::models::Vaccine;

pub const MAX_TITLE_LEN: usize = 60;
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Input payload for creating or fully replacing a vaccine.
///
/// An `interval` of zero is treated as absent, matching callers that encode
/// "no interval" as 0 rather than omitting the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVaccine {
    pub title: String,
    pub description: String,
    pub doses: u32,
    pub periodicity: Option<Periodicity>,
    pub interval: Option<u32>,
    pub component_ids: Vec<Uuid>,
}

/// Validated schedule: `None` for single-dose, `Some` for multi-dose.
fn validated_schedule(input: &NewVaccine) -> Result<Option<(Periodicity, u32)>, ServiceError> {
    let interval = input.interval.filter(|&i| i > 0);

    if input.doses < 1 {
        return Err(ServiceError::InvalidInput(
            "a vaccine needs at least one dose".into(),
        ));
    }

    if input.doses == 1 {
        if input.periodicity.is_some() {
            return Err(ServiceError::InvalidInput(
                "a single-dose vaccine cannot have a periodicity".into(),
            ));
        }
        if interval.is_some() {
            return Err(ServiceError::InvalidInput(
                "a single-dose vaccine cannot have a dose interval".into(),
            ));
        }
        return Ok(None);
    }

    let periodicity = input.periodicity.ok_or_else(|| {
        ServiceError::InvalidInput("a multi-dose vaccine needs a periodicity".into())
    })?;
    let interval = interval.ok_or_else(|| {
        ServiceError::InvalidInput("a multi-dose vaccine needs a dose interval of at least 1".into())
    })?;
    Ok(Some((periodicity, interval)))
}

fn validate_text(input: &NewVaccine) -> Result<(), ServiceError> {
    if input.title.trim().is_empty() {
        return Err(ServiceError::InvalidInput("title must not be empty".into()));
    }
    if input.title.chars().count() > MAX_TITLE_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    if input.description.trim().is_empty() {
        return Err(ServiceError::InvalidInput("description must not be empty".into()));
    }
    if input.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

fn resolve_components(conn: &Connection, component_ids: &[Uuid]) -> Result<(), ServiceError> {
    for component_id in component_ids {
        if !repository::component_exists(conn, component_id)? {
            return Err(ServiceError::not_found("Component", component_id));
        }
    }
    Ok(())
}

/// Title collision check under the catalog's case-insensitive rule,
/// optionally excluding the vaccine being updated.
fn check_title(conn: &Connection, title: &str, exclude: Option<&Uuid>) -> Result<(), ServiceError> {
    if let Some(existing) = repository::get_vaccine_by_title(conn, title)? {
        if exclude != Some(&existing.id) {
            return Err(ServiceError::Conflict {
                entity: "Vaccine",
                name: title.to_string(),
            });
        }
    }
    Ok(())
}

pub fn create_vaccine(conn: &Connection, input: &NewVaccine) -> Result<Vaccine, ServiceError> {
    validate_text(input)?;
    let schedule = validated_schedule(input)?;
    check_title(conn, &input.title, None)?;
    resolve_components(conn, &input.component_ids)?;

    let vaccine = Vaccine {
        id: Uuid::new_v4(),
        title: input.title.clone(),
        description: input.description.clone(),
        doses: input.doses,
        periodicity: schedule.map(|(p, _)| p),
        interval: schedule.map(|(_, i)| i),
    };
    repository::insert_vaccine(conn, &vaccine)?;
    repository::set_vaccine_components(conn, &vaccine.id, &input.component_ids)?;
    tracing::info!(vaccine = %vaccine.id, doses = vaccine.doses, "created vaccine");
    Ok(vaccine)
}

/// Full replacement of the vaccine's data, including the component set.
pub fn update_vaccine(
    conn: &Connection,
    id: &Uuid,
    input: &NewVaccine,
) -> Result<Vaccine, ServiceError> {
    validate_text(input)?;
    let schedule = validated_schedule(input)?;
    if !repository::vaccine_exists(conn, id)? {
        return Err(ServiceError::not_found("Vaccine", id));
    }
    check_title(conn, &input.title, Some(id))?;
    resolve_components(conn, &input.component_ids)?;

    let vaccine = Vaccine {
        id: *id,
        title: input.title.clone(),
        description: input.description.clone(),
        doses: input.doses,
        periodicity: schedule.map(|(p, _)| p),
        interval: schedule.map(|(_, i)| i),
    };
    repository::update_vaccine(conn, &vaccine)?;
    repository::set_vaccine_components(conn, id, &input.component_ids)?;
    Ok(vaccine)
}

pub fn find_vaccine(conn: &Connection, id: &Uuid) -> Result<Vaccine, ServiceError> {
    repository::get_vaccine(conn, id)?.ok_or_else(|| ServiceError::not_found("Vaccine", id))
}

pub fn find_vaccine_by_title(conn: &Connection, title: &str) -> Result<Vaccine, ServiceError> {
    repository::get_vaccine_by_title(conn, title)?
        .ok_or_else(|| ServiceError::not_found("Vaccine", title))
}

pub fn list_vaccines(conn: &Connection) -> Result<Vec<Vaccine>, ServiceError> {
    Ok(repository::get_all_vaccines(conn)?)
}

pub fn vaccine_component_ids(conn: &Connection, id: &Uuid) -> Result<Vec<Uuid>, ServiceError> {
    if !repository::vaccine_exists(conn, id)? {
        return Err(ServiceError::not_found("Vaccine", id));
    }
    Ok(repository::get_vaccine_component_ids(conn, id)?)
}

/// Delete a vaccine. Fails while any appointment still references it; the
/// component associations go with the vaccine.
pub fn delete_vaccine(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    if !repository::vaccine_exists(conn, id)? {
        return Err(ServiceError::not_found("Vaccine", id));
    }
    repository::delete_vaccine(conn, id).map_err(|e| ServiceError::on_delete(e, "Vaccine", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn single_dose(title: &str) -> NewVaccine {
        NewVaccine {
            title: title.into(),
            description: "Single dose".into(),
            doses: 1,
            periodicity: None,
            interval: None,
            component_ids: vec![],
        }
    }

    fn multi_dose(title: &str) -> NewVaccine {
        NewVaccine {
            title: title.into(),
            description: "Three doses, two weeks apart".into(),
            doses: 3,
            periodicity: Some(Periodicity::Weeks),
            interval: Some(2),
            component_ids: vec![],
        }
    }

    #[test]
    fn create_multi_dose_with_components() {
        let conn = test_db();
        let saline = catalog::create_component(&conn, "Saline").unwrap();
        let gelatin = catalog::create_component(&conn, "Gelatin").unwrap();

        let mut input = multi_dose("Triple Viral");
        input.component_ids = vec![saline.id, gelatin.id];
        let created = create_vaccine(&conn, &input).unwrap();

        let found = find_vaccine(&conn, &created.id).unwrap();
        assert_eq!(found.doses, 3);
        assert_eq!(found.periodicity, Some(Periodicity::Weeks));
        assert_eq!(found.interval, Some(2));

        let mut ids = vaccine_component_ids(&conn, &created.id).unwrap();
        ids.sort();
        let mut expected = vec![saline.id, gelatin.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn single_dose_rejects_schedule_fields() {
        let conn = test_db();

        let mut bad = single_dose("Hepatitis B");
        bad.periodicity = Some(Periodicity::Days);
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));

        let mut bad = single_dose("Hepatitis B");
        bad.interval = Some(10);
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn single_dose_zero_interval_is_treated_as_absent() {
        let conn = test_db();
        let mut input = single_dose("Hepatitis B");
        input.interval = Some(0);

        let created = create_vaccine(&conn, &input).unwrap();
        assert_eq!(created.interval, None);
        assert_eq!(find_vaccine(&conn, &created.id).unwrap().interval, None);
    }

    #[test]
    fn multi_dose_requires_full_schedule() {
        let conn = test_db();

        let mut bad = multi_dose("Triple Viral");
        bad.periodicity = None;
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));

        let mut bad = multi_dose("Triple Viral");
        bad.interval = None;
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));

        let mut bad = multi_dose("Triple Viral");
        bad.interval = Some(0);
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn zero_doses_is_invalid() {
        let conn = test_db();
        let mut bad = single_dose("Hepatitis B");
        bad.doses = 0;
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn text_fields_are_validated() {
        let conn = test_db();

        let mut bad = single_dose("");
        bad.title = "".into();
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));

        let mut bad = single_dose("Hepatitis B");
        bad.description = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(matches!(create_vaccine(&conn, &bad), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn title_conflicts_case_insensitively() {
        let conn = test_db();
        create_vaccine(&conn, &single_dose("Hepatitis B")).unwrap();

        let err = create_vaccine(&conn, &single_dose("HEPATITIS B")).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { entity: "Vaccine", .. }));
    }

    #[test]
    fn update_keeps_own_title_but_rejects_others() {
        let conn = test_db();
        let first = create_vaccine(&conn, &single_dose("Hepatitis B")).unwrap();
        create_vaccine(&conn, &single_dose("Influenza")).unwrap();

        // Re-using its own title (any casing) is fine.
        let mut same = single_dose("hepatitis b");
        same.description = "Updated".into();
        update_vaccine(&conn, &first.id, &same).unwrap();
        assert_eq!(find_vaccine(&conn, &first.id).unwrap().description, "Updated");

        let err = update_vaccine(&conn, &first.id, &single_dose("influenza")).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { entity: "Vaccine", .. }));
    }

    #[test]
    fn update_replaces_schedule_and_components() {
        let conn = test_db();
        let saline = catalog::create_component(&conn, "Saline").unwrap();
        let created = create_vaccine(&conn, &single_dose("Hepatitis B")).unwrap();

        let mut changed = multi_dose("Hepatitis B");
        changed.component_ids = vec![saline.id];
        update_vaccine(&conn, &created.id, &changed).unwrap();

        let found = find_vaccine(&conn, &created.id).unwrap();
        assert_eq!(found.doses, 3);
        assert_eq!(found.periodicity, Some(Periodicity::Weeks));
        assert_eq!(vaccine_component_ids(&conn, &created.id).unwrap(), vec![saline.id]);
    }

    #[test]
    fn unknown_component_id_is_not_found() {
        let conn = test_db();
        let mut bad = single_dose("Hepatitis B");
        bad.component_ids = vec![Uuid::new_v4()];

        let err = create_vaccine(&conn, &bad).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Component", .. }));
        assert!(list_vaccines(&conn).unwrap().is_empty());
    }

    #[test]
    fn delete_referenced_component_is_blocked() {
        let conn = test_db();
        let saline = catalog::create_component(&conn, "Saline").unwrap();
        let mut input = single_dose("Hepatitis B");
        input.component_ids = vec![saline.id];
        create_vaccine(&conn, &input).unwrap();

        let err = catalog::delete_component(&conn, &saline.id).unwrap_err();
        assert!(matches!(err, ServiceError::DependencyConflict { entity: "Component", .. }));
    }

    #[test]
    fn delete_unreferenced_vaccine() {
        let conn = test_db();
        let created = create_vaccine(&conn, &single_dose("Hepatitis B")).unwrap();
        delete_vaccine(&conn, &created.id).unwrap();
        assert!(list_vaccines(&conn).unwrap().is_empty());

        let err = delete_vaccine(&conn, &created.id).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Vaccine", .. }));
    }

    #[test]
    fn find_by_title_ignores_case() {
        let conn = test_db();
        let created = create_vaccine(&conn, &single_dose("Hepatitis B")).unwrap();
        assert_eq!(find_vaccine_by_title(&conn, "hepatitis b").unwrap().id, created.id);

        let err = find_vaccine_by_title(&conn, "Influenza").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Vaccine", .. }));
    }
}
