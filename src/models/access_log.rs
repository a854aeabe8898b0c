use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in the access log.
pub const ACCESS_LOG_MAX: usize = 1000;

/// One retrieval of a phase or section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
    pub timestamp: DateTime<Utc>,
    /// Address that was read, e.g. `process://phase/3/section/gap-catalog`.
    pub uri: String,
    pub phase_id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl AccessLogEntry {
    pub fn new(uri: impl Into<String>, phase_id: u8, section: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            uri: uri.into(),
            phase_id,
            section,
        }
    }
}

/// Bounded, time-ordered record of retrievals.
///
/// Appending past [`ACCESS_LOG_MAX`] evicts from the front, so the log always
/// holds the most recent reads. A log built with [`AccessLog::from`] is kept
/// as given until the next [`push`](AccessLog::push) or [`truncate`](AccessLog::truncate).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessLog {
    #[serde(default)]
    entries: Vec<AccessLogEntry>,
}

impl AccessLog {
    pub fn push(&mut self, entry: AccessLogEntry) {
        self.entries.push(entry);
        self.truncate();
    }

    /// Drop the oldest entries beyond the cap.
    pub fn truncate(&mut self) {
        if self.entries.len() > ACCESS_LOG_MAX {
            let excess = self.entries.len() - ACCESS_LOG_MAX;
            self.entries.drain(..excess);
        }
    }

    /// Number of logged reads for one phase.
    pub fn reads(&self, phase_id: u8) -> usize {
        self.entries.iter().filter(|e| e.phase_id == phase_id).count()
    }

    pub fn entries(&self) -> &[AccessLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<AccessLogEntry>> for AccessLog {
    fn from(entries: Vec<AccessLogEntry>) -> Self {
        Self { entries }
    }
}
