use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named allergy in the reference catalog. Names are unique case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allergy {
    pub id: Uuid,
    pub name: String,
}

/// Named vaccine component in the reference catalog. Names are unique
/// case-insensitively; the allergy gate compares against these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub name: String,
}
