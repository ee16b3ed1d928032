//! Buildings provisioned at startup

use crate::models::NewBuilding;

/// Identifiers of every building the ledger knows about
pub const KNOWN_BUILDINGS: [&str; 18] = [
    "B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B9", "B10", "B11", "B12", "B13", "B14",
    "B15", "B16", "B17", "B18",
];

/// Seed list, every building empty and without a department label
pub fn known_buildings() -> Vec<NewBuilding> {
    KNOWN_BUILDINGS
        .iter()
        .map(|id| NewBuilding::new(*id, ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_list_is_unique() {
        let buildings = known_buildings();
        let ids: HashSet<_> = buildings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(buildings.len(), 18);
        assert_eq!(ids.len(), 18);
        assert!(ids.contains("B5"));
    }
}
