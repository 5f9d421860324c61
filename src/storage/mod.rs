//! Persistence layer.
//!
//! Saves and loads a day's coupon sheet (the published `TicketRecord`s)
//! to/from a JSON file. Publishing to a remote store happens downstream
//! from this file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::report::TicketRecord;

/// Default sheet file path.
pub const DEFAULT_SHEET_FILE: &str = "altili_sheet.json";

/// Save a coupon sheet to a JSON file.
pub fn save_sheet(records: &[TicketRecord], path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_SHEET_FILE);
    let json = serde_json::to_string_pretty(records).context("Failed to serialise coupon sheet")?;

    std::fs::write(path, &json).context(format!("Failed to write sheet to {path}"))?;

    debug!(path, coupons = records.len(), "Sheet saved");
    Ok(())
}

/// Load a coupon sheet from a JSON file.
/// Returns None if the file doesn't exist.
pub fn load_sheet(path: Option<&str>) -> Result<Option<Vec<TicketRecord>>> {
    let path = path.unwrap_or(DEFAULT_SHEET_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved sheet found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path).context(format!("Failed to read sheet from {path}"))?;

    let records: Vec<TicketRecord> =
        serde_json::from_str(&json).context(format!("Failed to parse sheet from {path}"))?;

    info!(path, coupons = records.len(), "Sheet loaded from disk");

    Ok(Some(records))
}

/// Delete the sheet file.
pub fn delete_sheet(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_SHEET_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path).context(format!("Failed to delete sheet file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
