//! Caller-visible error taxonomy for the service layer.
//!
//! The variants stay distinguishable so callers can branch on them: a safety
//! rejection (`BlockedByAllergy`) is not a plain validation failure
//! (`InvalidInput`), and a lifecycle violation (`InvalidState`) is neither.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User is allergic to vaccine component '{component}'")]
    BlockedByAllergy { component: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("{entity} named '{name}' already exists")]
    Conflict { entity: &'static str, name: String },

    #[error("Cannot delete {entity} with id {id}: it is referenced by other records")]
    DependencyConflict { entity: &'static str, id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// Map a failed delete: a foreign-key rejection means the record is still
    /// referenced, anything else passes through as a database error.
    pub(crate) fn on_delete(err: DatabaseError, entity: &'static str, id: impl ToString) -> Self {
        if err.is_foreign_key_violation() {
            Self::DependencyConflict { entity, id: id.to_string() }
        } else {
            Self::Database(err)
        }
    }
}
