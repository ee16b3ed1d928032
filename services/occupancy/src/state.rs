//! Application state shared across handlers

use crate::display::DisplayZone;
use crate::ledger::OccupancyLedger;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState<S> {
    pub ledger: OccupancyLedger<S>,
    pub display_zone: DisplayZone,
}

impl<S> AppState<S> {
    pub fn new(ledger: OccupancyLedger<S>, display_zone: DisplayZone) -> Self {
        Self {
            ledger,
            display_zone,
        }
    }
}
