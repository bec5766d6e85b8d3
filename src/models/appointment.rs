use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

/// One dose of a booked vaccination sequence.
///
/// Created in `Scheduled` status; `status_date` is set only when the
/// appointment transitions to a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vaccine_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub status_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
