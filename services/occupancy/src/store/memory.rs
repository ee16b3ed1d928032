//! In-process occupancy store
//!
//! Every building and every tag key gets its own mutex. A scan locks its tag
//! first and its building second, then mutates the session list and the
//! counter with no await point in between, so readers never see one change
//! without the other.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;

use super::OccupancyStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Anomaly, Building, Direction, NewBuilding, ScanEvent, ScanOutcome, Session,
};
use crate::transition::{self, Transition};

type BuildingSlot = Arc<Mutex<Building>>;
type TagSlot = Arc<Mutex<Vec<Session>>>;

struct Inner {
    buildings: RwLock<HashMap<String, BuildingSlot>>,
    /// Sessions grouped by tag key
    tags: Mutex<HashMap<String, TagSlot>>,
    next_session_id: AtomicI64,
    lock_timeout: Duration,
}

/// Occupancy store kept entirely in memory
#[derive(Clone)]
pub struct MemoryOccupancyStore {
    inner: Arc<Inner>,
}

impl MemoryOccupancyStore {
    /// Create an empty store whose lock waits give up after `lock_timeout`
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                buildings: RwLock::new(HashMap::new()),
                tags: Mutex::new(HashMap::new()),
                next_session_id: AtomicI64::new(1),
                lock_timeout,
            }),
        }
    }

    async fn bounded<F>(
        &self,
        acquire: F,
        resource: impl FnOnce() -> String,
    ) -> LedgerResult<F::Output>
    where
        F: Future,
    {
        timeout(self.inner.lock_timeout, acquire)
            .await
            .map_err(|_| LedgerError::Contention {
                resource: resource(),
            })
    }

    /// Session list for a tag. Only `IN` scans create one; an `OUT` for a tag
    /// that was never seen leaves the index untouched.
    async fn tag_slot(&self, tag_key: &str, create: bool) -> LedgerResult<Option<TagSlot>> {
        let mut tags = self
            .bounded(self.inner.tags.lock(), || "tag index".to_string())
            .await?;
        if create {
            Ok(Some(tags.entry(tag_key.to_string()).or_default().clone()))
        } else {
            Ok(tags.get(tag_key).cloned())
        }
    }

    async fn building_slot(&self, building_id: &str) -> LedgerResult<Option<BuildingSlot>> {
        let buildings = self
            .bounded(self.inner.buildings.read(), || "building index".to_string())
            .await?;
        Ok(buildings.get(building_id).cloned())
    }

    async fn tag_slots(&self) -> LedgerResult<Vec<(String, TagSlot)>> {
        let tags = self
            .bounded(self.inner.tags.lock(), || "tag index".to_string())
            .await?;
        Ok(tags
            .iter()
            .map(|(tag_key, slot)| (tag_key.clone(), slot.clone()))
            .collect())
    }
}

impl OccupancyStore for MemoryOccupancyStore {
    async fn apply_scan(&self, event: &ScanEvent) -> LedgerResult<ScanOutcome> {
        let Some(tag_slot) = self
            .tag_slot(&event.tag_key, event.direction == Direction::In)
            .await?
        else {
            // An OUT for a tag with no sessions at all.
            return Ok(ScanOutcome::Dropped(Anomaly::NoOpenSession));
        };
        let mut sessions = self
            .bounded(tag_slot.lock(), || format!("tag {}", event.tag_key))
            .await?;

        let building_slot = self.building_slot(&event.building_id).await?;
        let mut building = match building_slot.as_ref() {
            Some(slot) => Some(
                self.bounded(slot.lock(), || format!("building {}", event.building_id))
                    .await?,
            ),
            None => None,
        };

        let open_session = sessions
            .iter()
            .rev()
            .find(|s| s.building_id == event.building_id && s.is_open())
            .map(|s| s.session_id);

        let now = transition::now();
        let outcome = match transition::plan(event.direction, building.is_some(), open_session) {
            Transition::Open { counter } => {
                let session_id = self.inner.next_session_id.fetch_add(1, Ordering::SeqCst);
                sessions.push(Session {
                    session_id,
                    tag_key: event.tag_key.clone(),
                    building_id: event.building_id.clone(),
                    entry_time: now,
                    exit_time: None,
                    direction: Direction::In.as_str().to_string(),
                });
                let occupancy = building.as_mut().map(|b| {
                    b.occupancy_count = counter.apply(b.occupancy_count);
                    b.occupancy_count
                });
                ScanOutcome::Opened {
                    session_id,
                    occupancy,
                }
            }
            Transition::Close {
                session_id,
                counter,
            } => {
                if let Some(session) = sessions.iter_mut().find(|s| s.session_id == session_id) {
                    session.exit_time = Some(transition::exit_time(session.entry_time, now));
                    session.direction = Direction::Out.as_str().to_string();
                }
                let occupancy = building.as_mut().map(|b| {
                    b.occupancy_count = counter.apply(b.occupancy_count);
                    b.occupancy_count
                });
                ScanOutcome::Closed {
                    session_id,
                    occupancy,
                }
            }
            Transition::Reject(anomaly) => ScanOutcome::Dropped(anomaly),
        };

        Ok(outcome)
    }

    async fn seed_buildings(&self, buildings: &[NewBuilding]) -> LedgerResult<u64> {
        let mut index = self
            .bounded(self.inner.buildings.write(), || "building index".to_string())
            .await?;

        let mut created = 0;
        for new in buildings {
            if !index.contains_key(&new.id) {
                index.insert(new.id.clone(), Arc::new(Mutex::new(Building::from(new))));
                created += 1;
            }
        }

        Ok(created)
    }

    async fn find_building(&self, id: &str) -> LedgerResult<Option<Building>> {
        match self.building_slot(id).await? {
            Some(slot) => {
                let building = self
                    .bounded(slot.lock(), || format!("building {}", id))
                    .await?;
                Ok(Some(building.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_buildings(&self) -> LedgerResult<Vec<Building>> {
        let slots: Vec<(String, BuildingSlot)> = {
            let index = self
                .bounded(self.inner.buildings.read(), || "building index".to_string())
                .await?;
            index
                .iter()
                .map(|(id, slot)| (id.clone(), slot.clone()))
                .collect()
        };

        let mut buildings = Vec::with_capacity(slots.len());
        for (id, slot) in slots {
            let building = self
                .bounded(slot.lock(), || format!("building {}", id))
                .await?;
            buildings.push(building.clone());
        }
        buildings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(buildings)
    }

    async fn list_sessions(
        &self,
        building_id: &str,
        open_only: bool,
    ) -> LedgerResult<Vec<Session>> {
        let mut found = Vec::new();
        for (tag_key, slot) in self.tag_slots().await? {
            let sessions = self
                .bounded(slot.lock(), || format!("tag {}", tag_key))
                .await?;
            found.extend(
                sessions
                    .iter()
                    .filter(|s| s.building_id == building_id && (!open_only || s.is_open()))
                    .cloned(),
            );
        }
        found.sort_by(|a, b| b.session_id.cmp(&a.session_id));
        Ok(found)
    }

    async fn health_check(&self) -> LedgerResult<bool> {
        Ok(true)
    }
}
