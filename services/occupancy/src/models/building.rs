//! Building model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Building entity with its live headcount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Building {
    pub id: String,
    pub department_name: String,
    /// Number of open sessions at this building, never negative
    pub occupancy_count: i32,
}

/// Provisioning payload, a building always starts empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBuilding {
    pub id: String,
    pub department_name: String,
}

impl NewBuilding {
    pub fn new(id: impl Into<String>, department_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            department_name: department_name.into(),
        }
    }
}

impl From<&NewBuilding> for Building {
    fn from(new: &NewBuilding) -> Self {
        Self {
            id: new.id.clone(),
            department_name: new.department_name.clone(),
            occupancy_count: 0,
        }
    }
}
