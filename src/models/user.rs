use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Sex;

/// A person vaccinations are booked for. Allergy associations live in the
/// `user_allergies` join table, not on the struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}
