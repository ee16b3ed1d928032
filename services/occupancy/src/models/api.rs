//! HTTP request and response payloads

use serde::{Deserialize, Serialize};

use super::{Anomaly, Building, ScanOutcome, Session, SessionId};
use crate::display::DisplayZone;

/// Response for a recorded scan
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    /// `opened`, `closed` or `dropped`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<Anomaly>,
}

impl From<&ScanOutcome> for ScanResponse {
    fn from(outcome: &ScanOutcome) -> Self {
        let status = match outcome {
            ScanOutcome::Opened { .. } => "opened",
            ScanOutcome::Closed { .. } => "closed",
            ScanOutcome::Dropped(_) => "dropped",
        };

        Self {
            status,
            session_id: outcome.session_id(),
            occupancy: outcome.occupancy(),
            anomaly: outcome.anomaly(),
        }
    }
}

/// Response for building reads
#[derive(Debug, Serialize)]
pub struct BuildingResponse {
    pub id: String,
    pub department_name: String,
    pub occupancy: i32,
}

impl From<Building> for BuildingResponse {
    fn from(building: Building) -> Self {
        Self {
            id: building.id,
            department_name: building.department_name,
            occupancy: building.occupancy_count,
        }
    }
}

/// Response for session reads, timestamps rendered in the display zone
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub tag_key: String,
    pub building_id: String,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub direction: String,
    pub open: bool,
}

impl SessionResponse {
    pub fn render(session: Session, zone: &DisplayZone) -> Self {
        Self {
            session_id: session.session_id,
            open: session.is_open(),
            entry_time: zone.render(session.entry_time),
            exit_time: session.exit_time.map(|t| zone.render(t)),
            tag_key: session.tag_key,
            building_id: session.building_id,
            direction: session.direction,
        }
    }
}

/// Query parameters for session listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionQuery {
    /// Only return sessions that are still open
    #[serde(default)]
    pub open: bool,
}
