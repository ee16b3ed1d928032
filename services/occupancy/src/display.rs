//! Display time zone
//!
//! Instants are stored as UTC. The configured zone only affects how they are
//! rendered in responses.

use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// Fixed UTC offset used when rendering timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(FixedOffset);

impl DisplayZone {
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Render an instant as RFC 3339 in this zone
    pub fn render(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.0)
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for DisplayZone {
    type Err = String;

    /// Accepts `UTC`, `Z`, or an offset chrono understands (`+02:00`, `-0530`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("utc") || raw == "Z" {
            return Ok(Self::utc());
        }

        raw.parse::<FixedOffset>()
            .map(Self)
            .map_err(|e| format!("Invalid display time zone offset {:?}: {}", raw, e))
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
