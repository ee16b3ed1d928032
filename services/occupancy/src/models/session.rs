//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Ledger-assigned, monotonically increasing session identifier
pub type SessionId = i64;

/// One entry-to-exit occupancy interval for a single tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub session_id: SessionId,
    /// Physical badge identifier used to pair an exit with its entry
    pub tag_key: String,
    pub building_id: String,
    pub entry_time: DateTime<Utc>,
    /// `None` while the tag is still inside
    pub exit_time: Option<DateTime<Utc>>,
    /// Kind of the last scan that touched the row, `IN` or `OUT`
    pub direction: String,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }
}
