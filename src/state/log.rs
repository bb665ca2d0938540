//! Bounded activity log.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Bounded textual log, newest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<String>,
}

impl ActivityLog {
    /// Maximum number of retained entries.
    pub const MAX_ENTRIES: usize = 1000;

    /// Prepend a timestamped entry, dropping the oldest beyond the cap.
    pub fn record(&mut self, message: impl AsRef<str>) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.entries
            .insert(0, format!("[{}] {}", stamp, message.as_ref()));
        self.entries.truncate(Self::MAX_ENTRIES);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Enforce the cap on a log loaded from disk.
    pub(crate) fn normalize(&mut self) {
        self.entries.truncate(Self::MAX_ENTRIES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn newest_entry_first() {
        let mut log = ActivityLog::default();
        log.record("first");
        log.record("second");

        assert_eq!(log.len(), 2);
        assert!(log.entries()[0].ends_with("second"));
        assert!(log.entries()[1].ends_with("first"));
    }

    #[test]
    fn entries_are_timestamped() {
        let mut log = ActivityLog::default();
        log.record("checked widget");

        let re = Regex::new(r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\] checked widget$").unwrap();
        assert!(re.is_match(&log.entries()[0]));
    }

    #[test]
    fn drops_oldest_beyond_cap() {
        let mut log = ActivityLog::default();
        for i in 0..ActivityLog::MAX_ENTRIES + 5 {
            log.record(format!("entry {}", i));
        }

        assert_eq!(log.len(), ActivityLog::MAX_ENTRIES);
        assert!(log.entries()[0].ends_with("entry 1004"));
        assert!(log.entries()[ActivityLog::MAX_ENTRIES - 1].ends_with("entry 5"));
    }

    #[test]
    fn clear_empties_log() {
        let mut log = ActivityLog::default();
        log.record("something");
        log.clear();
        assert!(log.is_empty());
    }
}
