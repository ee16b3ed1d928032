//! Storage backends for the occupancy ledger
//!
//! A store owns the buildings and the session log and applies one scan as a
//! single atomic unit. Both implementations lock per building and per tag key,
//! never globally, and give up with [`LedgerError::Contention`] once the
//! configured lock timeout expires.
//!
//! [`LedgerError::Contention`]: crate::error::LedgerError::Contention

use crate::error::LedgerResult;
use crate::models::{Building, NewBuilding, ScanEvent, ScanOutcome, Session};

pub mod memory;
pub mod postgres;

pub use memory::MemoryOccupancyStore;
pub use postgres::PgOccupancyStore;

/// Persistence and locking for buildings and sessions
pub trait OccupancyStore: Send + Sync {
    /// Apply the transition rule for one scan, atomically.
    fn apply_scan(
        &self,
        event: &ScanEvent,
    ) -> impl Future<Output = LedgerResult<ScanOutcome>> + Send;

    /// Insert missing buildings, leaving existing rows untouched.
    /// Returns the number of buildings created.
    fn seed_buildings(
        &self,
        buildings: &[NewBuilding],
    ) -> impl Future<Output = LedgerResult<u64>> + Send;

    fn find_building(
        &self,
        id: &str,
    ) -> impl Future<Output = LedgerResult<Option<Building>>> + Send;

    /// All buildings ordered by id
    fn list_buildings(&self) -> impl Future<Output = LedgerResult<Vec<Building>>> + Send;

    /// Sessions referencing a building id, newest first
    fn list_sessions(
        &self,
        building_id: &str,
        open_only: bool,
    ) -> impl Future<Output = LedgerResult<Vec<Session>>> + Send;

    fn health_check(&self) -> impl Future<Output = LedgerResult<bool>> + Send;
}
