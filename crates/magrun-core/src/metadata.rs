//! Per-run metadata record (`info.json`).
//!
//! Purely informational; nothing in the drive lifecycle reads it back.

use std::fs;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Wall-clock stamp and driver variant name for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunInfo {
    /// `YYYY-MM-DD`.
    pub date: String,

    /// `HH:MM:SS`.
    pub time: String,

    /// Driver variant type name (`TimeDriver`, `MinDriver`, ...).
    pub driver: String,
}

impl RunInfo {
    /// Stamp a record with the current local date and time.
    pub fn now(driver: &str) -> Self {
        let now = Local::now();
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            driver: driver.to_string(),
        }
    }

    /// Serialize to `path` as JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_formats() {
        let info = RunInfo::now("TimeDriver");
        assert_eq!(info.driver, "TimeDriver");
        assert_eq!(info.date.len(), 10);
        assert_eq!(&info.date[4..5], "-");
        assert_eq!(info.time.len(), 8);
        assert_eq!(&info.time[2..3], ":");
    }

    #[test]
    fn test_write_and_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");

        let info = RunInfo {
            date: "2026-08-29".to_string(),
            time: "12:34:56".to_string(),
            driver: "MinDriver".to_string(),
        };
        info.write(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: RunInfo = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, info);
    }
}
