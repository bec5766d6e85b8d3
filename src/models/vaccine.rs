use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Periodicity;

/// Catalog entry describing a vaccine and its dose schedule.
///
/// Invariant (enforced at catalog time): `doses == 1` implies `periodicity`
/// and `interval` are both `None`; `doses > 1` implies both are `Some` and
/// `interval >= 1`. Component associations live in `vaccine_components`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub doses: u32,
    pub periodicity: Option<Periodicity>,
    pub interval: Option<u32>,
}
