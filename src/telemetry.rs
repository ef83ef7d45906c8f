//! Local error telemetry.
//!
//! Failures that the editor deliberately swallows (snapshot writes, corrupt
//! snapshots on load, rejected imports) are appended to a JSONL file so they
//! can be inspected later. Nothing leaves the machine and no document content
//! is recorded, only what failed and why.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One line of the error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// UTC time of the failure, `YYYY-MM-DDTHH:MM:SSZ`
    pub timestamp: String,
    /// What was being attempted ("save", "load", "import")
    pub operation: String,
    /// Storage key or file involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Short machine-friendly kind ("io_error", "quota_exceeded", "parse_error")
    pub error_type: String,
    /// Human-readable detail
    pub context: String,
}

impl ErrorEntry {
    pub fn new(
        operation: impl Into<String>,
        error_type: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: utc_timestamp(crate::models::now_millis() / 1000),
            operation: operation.into(),
            key: None,
            error_type: error_type.into(),
            context: context.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Format seconds since the Unix epoch as an ISO 8601 UTC timestamp.
fn utc_timestamp(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
/// Reference: Howard Hinnant, "chrono-Compatible Low-Level Date Algorithms"
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Appends [`ErrorEntry`] lines to a JSONL file.
#[derive(Debug, Clone)]
pub struct ErrorCollector {
    path: PathBuf,
    enabled: bool,
}

impl ErrorCollector {
    pub fn new(path: impl AsRef<Path>, enabled: bool) -> Self {
        Self { path: path.as_ref().to_path_buf(), enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Does nothing when collection is disabled.
    pub fn log(&self, entry: &ErrorEntry) -> std::io::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        writeln!(writer, "{}", json)?;
        writer.flush()
    }

    /// Append an entry, reporting a failure to write the log itself through tracing.
    pub fn record(&self, entry: ErrorEntry) {
        if let Err(e) = self.log(&entry) {
            tracing::debug!(path = %self.path.display(), error = %e, "could not write error log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_error_entry_creation() {
        let entry = ErrorEntry::new("save", "quota_exceeded", "snapshot is 9000 bytes")
            .with_key("pixelArtAppData");
        assert_eq!(entry.operation, "save");
        assert_eq!(entry.error_type, "quota_exceeded");
        assert_eq!(entry.key.as_deref(), Some("pixelArtAppData"));
    }

    #[test]
    fn test_collector_disabled_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("errors.jsonl");

        let collector = ErrorCollector::new(&path, false);
        collector.log(&ErrorEntry::new("load", "parse_error", "bad")).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_collector_appends_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("errors.jsonl");

        let collector = ErrorCollector::new(&path, true);
        collector.record(ErrorEntry::new("save", "io_error", "disk full"));
        collector.record(ErrorEntry::new("import", "parse_error", "Invalid JSON format"));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ErrorEntry = serde_json::from_str(lines[0]).unwrap();
        let second: ErrorEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.operation, "save");
        assert_eq!(second.error_type, "parse_error");
        assert!(!lines[0].contains("\"key\""));
    }

    #[test]
    fn test_utc_timestamp() {
        assert_eq!(utc_timestamp(0), "1970-01-01T00:00:00Z");
        assert_eq!(utc_timestamp(951_782_400), "2000-02-29T00:00:00Z");
        assert_eq!(utc_timestamp(1_700_000_000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_entry_timestamp_format() {
        let entry = ErrorEntry::new("save", "io_error", "x");
        assert_eq!(entry.timestamp.len(), 20);
        assert!(entry.timestamp.contains('T'));
        assert!(entry.timestamp.ends_with('Z'));
    }
}
