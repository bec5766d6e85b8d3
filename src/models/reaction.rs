use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Adverse reaction reported against a completed appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub description: String,
    pub reaction_date: NaiveDate,
}
