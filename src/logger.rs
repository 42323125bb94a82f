use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use chrono::Local;

use crate::error::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Event record sink. Entries always reach the `log` facade; when a log
/// file is configured they are appended there too. Monitor threads share
/// one instance behind a mutex so records never interleave.
pub struct Logger {
    file: Option<File>,
}

impl Logger {
    pub fn new() -> Self {
        Logger { file: None }
    }

    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Logger { file: Some(file) })
    }

    /// Record one event.
    pub fn log(&mut self, message: &str) -> Result<()> {
        self.write_entry("INFO", message)?;
        log::info!("{message}");
        Ok(())
    }

    /// Record a delivery that went wrong; the monitor loop carries on.
    pub fn warn(&mut self, message: &str) -> Result<()> {
        self.write_entry("WARNING", message)?;
        log::warn!("{message}");
        Ok(())
    }

    fn write_entry(&mut self, level: &str, message: &str) -> Result<()> {
        if let Some(file) = &mut self.file {
            let timestamp = Local::now().format(TIMESTAMP_FORMAT);
            writeln!(file, "[{timestamp}] [{level}] {message}")?;
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_leveled_entries_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        let mut logger = Logger::with_file(&path).unwrap();
        logger.log("window opened").unwrap();
        logger.warn("event dropped").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].contains("[INFO] window opened"));
        assert!(lines[1].contains("[WARNING] event dropped"));
    }

    #[test]
    fn appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        Logger::with_file(&path).unwrap().log("first").unwrap();
        Logger::with_file(&path).unwrap().log("second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn works_without_a_file() {
        let mut logger = Logger::new();
        logger.log("console only").unwrap();
    }
}
