//! PostgreSQL occupancy store
//!
//! One transaction per scan. Inside it:
//!
//! 1. `lock_timeout` is set for the transaction only, so every wait below is
//!    bounded and surfaces as SQLSTATE `55P03`.
//! 2. A transaction-scoped advisory lock on the tag key serializes scans for
//!    the same badge, including scans at unknown buildings.
//! 3. The building row is locked with `FOR UPDATE`.
//! 4. For `OUT`, the newest open session for the tag at this building is
//!    locked with `FOR UPDATE`.
//!
//! The session write and the counter write then commit together. Any error
//! drops the transaction, which rolls it back.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use super::OccupancyStore;
use crate::error::LedgerResult;
use crate::models::{
    Building, Direction, NewBuilding, ScanEvent, ScanOutcome, Session, SessionId,
};
use crate::transition::{self, CounterChange, Transition};
use common::error::DatabaseError;

/// Advisory lock namespace for tag keys
const TAG_LOCK_CLASS: i32 = 0x4f43_5550;

/// Occupancy store backed by PostgreSQL
#[derive(Clone)]
pub struct PgOccupancyStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgOccupancyStore {
    /// Create a new store over an existing pool
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> LedgerResult<()> {
        info!("Running occupancy schema migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin_bounded(&self) -> LedgerResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis().max(1)))
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Write the new counter value of a locked building row
async fn write_counter(
    tx: &mut Transaction<'_, Postgres>,
    building_id: &str,
    current: Option<i32>,
    change: CounterChange,
) -> LedgerResult<Option<i32>> {
    let Some(current) = current else {
        return Ok(None);
    };

    let next = change.apply(current);
    if next != current {
        sqlx::query("UPDATE buildings SET occupancy_count = $2 WHERE id = $1")
            .bind(building_id)
            .bind(next)
            .execute(&mut **tx)
            .await?;
    }

    Ok(Some(next))
}

impl OccupancyStore for PgOccupancyStore {
    async fn apply_scan(&self, event: &ScanEvent) -> LedgerResult<ScanOutcome> {
        let mut tx = self.begin_bounded().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
            .bind(TAG_LOCK_CLASS)
            .bind(&event.tag_key)
            .execute(&mut *tx)
            .await?;

        let current: Option<i32> =
            sqlx::query_scalar("SELECT occupancy_count FROM buildings WHERE id = $1 FOR UPDATE")
                .bind(&event.building_id)
                .fetch_optional(&mut *tx)
                .await?;

        let open_session: Option<(SessionId, DateTime<Utc>)> = match event.direction {
            Direction::Out => {
                sqlx::query_as(
                    r#"
                    SELECT session_id, entry_time
                    FROM sessions
                    WHERE tag_key = $1 AND building_id = $2 AND exit_time IS NULL
                    ORDER BY session_id DESC
                    LIMIT 1
                    FOR UPDATE
                    "#,
                )
                .bind(&event.tag_key)
                .bind(&event.building_id)
                .fetch_optional(&mut *tx)
                .await?
            }
            Direction::In => None,
        };

        let now = transition::now();
        let outcome = match transition::plan(
            event.direction,
            current.is_some(),
            open_session.map(|(id, _)| id),
        ) {
            Transition::Open { counter } => {
                let session_id: SessionId = sqlx::query_scalar(
                    r#"
                    INSERT INTO sessions (tag_key, building_id, entry_time, direction)
                    VALUES ($1, $2, $3, $4)
                    RETURNING session_id
                    "#,
                )
                .bind(&event.tag_key)
                .bind(&event.building_id)
                .bind(now)
                .bind(Direction::In.as_str())
                .fetch_one(&mut *tx)
                .await?;

                let occupancy =
                    write_counter(&mut tx, &event.building_id, current, counter).await?;
                ScanOutcome::Opened {
                    session_id,
                    occupancy,
                }
            }
            Transition::Close {
                session_id,
                counter,
            } => {
                let entry_time = open_session.map(|(_, entry)| entry).unwrap_or(now);
                sqlx::query(
                    "UPDATE sessions SET exit_time = $2, direction = $3 WHERE session_id = $1",
                )
                .bind(session_id)
                .bind(transition::exit_time(entry_time, now))
                .bind(Direction::Out.as_str())
                .execute(&mut *tx)
                .await?;

                let occupancy =
                    write_counter(&mut tx, &event.building_id, current, counter).await?;
                ScanOutcome::Closed {
                    session_id,
                    occupancy,
                }
            }
            Transition::Reject(anomaly) => {
                tx.rollback().await?;
                return Ok(ScanOutcome::Dropped(anomaly));
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn seed_buildings(&self, buildings: &[NewBuilding]) -> LedgerResult<u64> {
        let mut tx = self.begin_bounded().await?;

        let mut created = 0;
        for new in buildings {
            let result = sqlx::query(
                r#"
                INSERT INTO buildings (id, department_name, occupancy_count)
                VALUES ($1, $2, 0)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&new.id)
            .bind(&new.department_name)
            .execute(&mut *tx)
            .await?;
            created += result.rows_affected();
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find_building(&self, id: &str) -> LedgerResult<Option<Building>> {
        let building = sqlx::query_as::<_, Building>(
            "SELECT id, department_name, occupancy_count FROM buildings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(building)
    }

    async fn list_buildings(&self) -> LedgerResult<Vec<Building>> {
        let buildings = sqlx::query_as::<_, Building>(
            "SELECT id, department_name, occupancy_count FROM buildings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(buildings)
    }

    async fn list_sessions(
        &self,
        building_id: &str,
        open_only: bool,
    ) -> LedgerResult<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT session_id, tag_key, building_id, entry_time, exit_time, direction
            FROM sessions
            WHERE building_id = $1 AND (NOT $2 OR exit_time IS NULL)
            ORDER BY session_id DESC
            "#,
        )
        .bind(building_id)
        .bind(open_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn health_check(&self) -> LedgerResult<bool> {
        Ok(common::database::health_check(&self.pool).await?)
    }
}
