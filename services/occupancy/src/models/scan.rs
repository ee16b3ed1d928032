//! Scan events and their outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

use super::session::SessionId;

/// Direction of a validated scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Parse a raw direction, ignoring ASCII case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("IN") {
            Some(Direction::In)
        } else if raw.eq_ignore_ascii_case("OUT") {
            Some(Direction::Out)
        } else {
            None
        }
    }

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan as delivered by the ingestion adapter, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub building_id: String,
    pub direction: String,
    #[serde(default)]
    pub tag_key: Option<String>,
}

impl ScanRequest {
    pub fn new(
        building_id: impl Into<String>,
        direction: impl Into<String>,
        tag_key: Option<&str>,
    ) -> Self {
        Self {
            building_id: building_id.into(),
            direction: direction.into(),
            tag_key: tag_key.map(str::to_string),
        }
    }
}

/// Scan that passed interpretation and is ready for a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub building_id: String,
    pub direction: Direction,
    pub tag_key: String,
}

/// Non-fatal condition observed while recording a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Direction was neither `IN` nor `OUT`
    UnrecognizedDirection { raw: String },
    /// No tag key, so the scan can never be paired
    MissingTagKey,
    /// `OUT` without a matching open session
    NoOpenSession,
    /// Building id is not provisioned, counter left alone
    UnknownBuilding,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnrecognizedDirection { raw } => write!(f, "unrecognized direction {:?}", raw),
            Anomaly::MissingTagKey => f.write_str("missing tag key"),
            Anomaly::NoOpenSession => f.write_str("no open session for this tag"),
            Anomaly::UnknownBuilding => f.write_str("unknown building"),
        }
    }
}

/// Result of one `record_scan` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// New session created. `occupancy` is `None` when the building is unknown.
    Opened {
        session_id: SessionId,
        occupancy: Option<i32>,
    },
    /// Open session closed. `occupancy` is `None` when the building is unknown.
    Closed {
        session_id: SessionId,
        occupancy: Option<i32>,
    },
    /// Nothing was mutated
    Dropped(Anomaly),
}

impl ScanOutcome {
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            ScanOutcome::Opened { session_id, .. } | ScanOutcome::Closed { session_id, .. } => {
                Some(*session_id)
            }
            ScanOutcome::Dropped(_) => None,
        }
    }

    /// Building headcount after the scan, when a counter was touched
    pub fn occupancy(&self) -> Option<i32> {
        match self {
            ScanOutcome::Opened { occupancy, .. } | ScanOutcome::Closed { occupancy, .. } => {
                *occupancy
            }
            ScanOutcome::Dropped(_) => None,
        }
    }

    pub fn anomaly(&self) -> Option<Anomaly> {
        match self {
            ScanOutcome::Opened {
                occupancy: None, ..
            }
            | ScanOutcome::Closed {
                occupancy: None, ..
            } => Some(Anomaly::UnknownBuilding),
            ScanOutcome::Opened { .. } | ScanOutcome::Closed { .. } => None,
            ScanOutcome::Dropped(anomaly) => Some(anomaly.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("IN"), Some(Direction::In));
        assert_eq!(Direction::parse(" out "), Some(Direction::Out));
        assert_eq!(Direction::parse("Out"), Some(Direction::Out));
        assert_eq!(Direction::parse(""), None);
        assert_eq!(Direction::parse("INSIDE"), None);
        assert_eq!(Direction::parse("EXIT"), None);
    }

    #[test]
    fn test_outcome_reports_unknown_building() {
        let outcome = ScanOutcome::Opened {
            session_id: 7,
            occupancy: None,
        };
        assert_eq!(outcome.anomaly(), Some(Anomaly::UnknownBuilding));
        assert_eq!(outcome.session_id(), Some(7));

        let outcome = ScanOutcome::Closed {
            session_id: 7,
            occupancy: Some(0),
        };
        assert_eq!(outcome.anomaly(), None);
        assert_eq!(outcome.occupancy(), Some(0));
    }

    #[test]
    fn test_anomaly_serializes_with_kind_tag() {
        let value = serde_json::to_value(Anomaly::UnrecognizedDirection {
            raw: "SIDEWAYS".to_string(),
        })
        .unwrap();
        assert_eq!(value["kind"], "unrecognized_direction");
        assert_eq!(value["raw"], "SIDEWAYS");

        let value = serde_json::to_value(Anomaly::NoOpenSession).unwrap();
        assert_eq!(value["kind"], "no_open_session");
    }
}
