//! Building occupancy ledger
//!
//! Consumes badge scans (`IN` / `OUT`) and keeps two things in lockstep: a
//! live occupancy counter per building and an append-only log of entry/exit
//! sessions keyed by the physical tag.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use occupancy::{ledger::OccupancyLedger, models::ScanRequest, seed, store::MemoryOccupancyStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = OccupancyLedger::new(MemoryOccupancyStore::new(Duration::from_secs(5)));
//!     ledger.seed(&seed::known_buildings()).await?;
//!     let outcome = ledger.record_scan(ScanRequest::new("B5", "IN", Some("X1"))).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod ledger;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;
pub mod transition;
pub mod validation;
