//! The occupancy ledger service
//!
//! [`OccupancyLedger::record_scan`] is the single entry point for scan
//! events. It interprets the raw request, hands validated scans to the store
//! and reports anomalies without failing the call.

use tracing::{info, warn};

use crate::error::LedgerResult;
use crate::models::{
    Anomaly, Building, Direction, NewBuilding, ScanEvent, ScanOutcome, ScanRequest, Session,
};
use crate::store::OccupancyStore;

/// Occupancy ledger over a store
#[derive(Clone)]
pub struct OccupancyLedger<S> {
    store: S,
}

impl<S: OccupancyStore> OccupancyLedger<S> {
    /// Create a new ledger
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one scan event.
    ///
    /// Malformed directions, missing tag keys, unmatched exits and unknown
    /// buildings come back as anomalies inside the outcome. Only contention
    /// and storage failures are returned as errors, and in that case nothing
    /// was written.
    pub async fn record_scan(&self, request: ScanRequest) -> LedgerResult<ScanOutcome> {
        let event = match interpret(request) {
            Ok(event) => event,
            Err(anomaly) => {
                warn!("Dropping scan: {}", anomaly);
                return Ok(ScanOutcome::Dropped(anomaly));
            }
        };

        let outcome = self.store.apply_scan(&event).await.inspect_err(|e| {
            warn!(
                "Scan {} for tag {} at building {} failed: {}",
                event.direction, event.tag_key, event.building_id, e
            );
        })?;

        match &outcome {
            ScanOutcome::Opened { session_id, .. } => info!(
                "Tag {} entered building {} (session {})",
                event.tag_key, event.building_id, session_id
            ),
            ScanOutcome::Closed { session_id, .. } => info!(
                "Tag {} left building {} (session {})",
                event.tag_key, event.building_id, session_id
            ),
            ScanOutcome::Dropped(_) => {}
        }

        if let Some(anomaly) = outcome.anomaly() {
            warn!(
                "Scan {} for tag {} at building {}: {}",
                event.direction, event.tag_key, event.building_id, anomaly
            );
        }

        Ok(outcome)
    }

    /// Provision buildings, keeping any that already exist
    pub async fn seed(&self, buildings: &[NewBuilding]) -> LedgerResult<u64> {
        let created = self.store.seed_buildings(buildings).await?;
        info!(
            "Building seed applied: {} created, {} already present",
            created,
            (buildings.len() as u64).saturating_sub(created)
        );
        Ok(created)
    }

    pub async fn building(&self, id: &str) -> LedgerResult<Option<Building>> {
        self.store.find_building(id).await
    }

    pub async fn buildings(&self) -> LedgerResult<Vec<Building>> {
        self.store.list_buildings().await
    }

    pub async fn sessions(
        &self,
        building_id: &str,
        open_only: bool,
    ) -> LedgerResult<Vec<Session>> {
        self.store.list_sessions(building_id, open_only).await
    }

    pub async fn health_check(&self) -> LedgerResult<bool> {
        self.store.health_check().await
    }
}

/// Turn a raw request into a scan a store can apply.
///
/// The direction is checked first, so a scan with both a bad direction and
/// no tag key reports the direction.
fn interpret(request: ScanRequest) -> Result<ScanEvent, Anomaly> {
    let direction =
        Direction::parse(&request.direction).ok_or_else(|| Anomaly::UnrecognizedDirection {
            raw: request.direction.clone(),
        })?;

    let tag_key = request
        .tag_key
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .ok_or(Anomaly::MissingTagKey)?;

    Ok(ScanEvent {
        building_id: request.building_id,
        direction,
        tag_key,
    })
}
