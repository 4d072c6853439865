//! CLI Commands

pub mod campaigns;
pub mod config;
pub mod create;
pub mod link;
pub mod verify;

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => bail!("invalid date {:?}: expected YYYY-MM-DD or RFC 3339", raw),
    }
}
