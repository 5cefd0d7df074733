//! Compatibility configuration and its request encoding.
//!
//! The type descriptor program reads the requested compatibility date and
//! flags from the path of a single request:
//!
//! ```text
//! http://dummy.com/<date>[+<flag1>+<flag2>+...]
//! ```
//!
//! Flags are not URL-encoded and keep caller order.

use chrono::NaiveDate;

use crate::error::{Result, TypesError};

/// Authority prefix of every encoded descriptor request.
pub const DESCRIPTOR_AUTHORITY: &str = "http://dummy.com";

/// Delimiter between the date and each flag.
pub const FLAG_DELIMITER: char = '+';

/// A compatibility date plus ordered feature flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityConfig {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Feature flags in caller-supplied order.
    pub flags: Vec<String>,
}

impl CompatibilityConfig {
    /// Build a configuration, checking that the date is a calendar date.
    pub fn new(date: impl Into<String>, flags: Vec<String>) -> Result<Self> {
        let date = date.into();
        validate_date(&date)?;
        Ok(Self { date, flags })
    }

    /// Build a configuration from parts that were already validated.
    pub fn from_parts(date: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            date: date.into(),
            flags,
        }
    }

    /// Encode this configuration as a descriptor request URL.
    pub fn request_path(&self) -> String {
        let mut path = format!("{}/{}", DESCRIPTOR_AUTHORITY, self.date);
        for flag in &self.flags {
            path.push(FLAG_DELIMITER);
            path.push_str(flag);
        }
        path
    }
}

fn validate_date(date: &str) -> Result<()> {
    if date.trim().is_empty() {
        return Err(TypesError::Config(
            "Config must have a compatibility date".to_string(),
        ));
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
        TypesError::Config(format!(
            "Invalid compatibility date '{}' (expected YYYY-MM-DD): {}",
            date, e
        ))
    })?;

    Ok(())
}
