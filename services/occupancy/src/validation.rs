//! Input validation for scans arriving over HTTP

use regex::Regex;
use std::sync::OnceLock;

const MAX_IDENTIFIER_LEN: usize = 64;

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.:-]+$").expect("Failed to compile identifier regex")
    })
}

fn validate_identifier(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} is required", kind));
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "{} must be at most {} characters long",
            kind, MAX_IDENTIFIER_LEN
        ));
    }

    if !identifier_regex().is_match(value) {
        return Err(format!(
            "{} can only contain letters, numbers, '_', '.', ':' and '-'",
            kind
        ));
    }

    Ok(())
}

/// Validate building id
pub fn validate_building_id(building_id: &str) -> Result<(), String> {
    validate_identifier("Building id", building_id)
}

/// Validate tag key
///
/// Surrounding whitespace is ignored, as the ledger trims it. A blank tag key
/// is not checked here: the ledger reports it as a missing-tag anomaly
/// instead of rejecting the request.
pub fn validate_tag_key(tag_key: &str) -> Result<(), String> {
    let tag_key = tag_key.trim();
    if tag_key.is_empty() {
        return Ok(());
    }
    validate_identifier("Tag key", tag_key)
}
