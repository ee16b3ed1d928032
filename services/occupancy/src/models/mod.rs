//! Occupancy ledger models

pub mod api;
pub mod building;
pub mod scan;
pub mod session;

// Re-export for convenience
pub use building::{Building, NewBuilding};
pub use scan::{Anomaly, Direction, ScanEvent, ScanOutcome, ScanRequest};
pub use session::{Session, SessionId};
