use chrono::Local;
use log::warn;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FAILURE_LOG_FILE: &str = "failed_messages.log";

/// Append-only, tab-separated record of contacts whose sends failed:
/// timestamp, row number, phone, last error.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(FAILURE_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry. A write failure only produces a warning.
    pub fn record(&self, row: usize, phone: &str, reason: &str) {
        let reason = reason.replace(['\r', '\n', '\t'], " ");
        let line = format!(
            "{}\trow {}\t{}\t{}\n",
            Local::now().to_rfc3339(),
            row,
            phone,
            reason
        );
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = result {
            warn!("could not write {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_appended_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::in_dir(dir.path());
        log.record(2, "+923001234567", "could not find message input box");
        log.record(5, "+923337654321", "timeout\nwhile typing");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields[1], "row 2");
        assert_eq!(fields[2], "+923001234567");
        assert_eq!(fields[3], "could not find message input box");
        assert!(lines[1].ends_with("timeout while typing"));
    }

    #[test]
    fn unwritable_location_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::in_dir(&dir.path().join("missing").join("dir"));
        log.record(1, "+92", "boom");
        assert!(!log.path().exists());
    }
}
