use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Workflow status of a single phase.
///
/// - `NotStarted`: the phase has not been opened yet
/// - `InProgress`: work on the phase is under way
/// - `Completed`: the phase's output exists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" => Ok(Self::NotStarted),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "Invalid status '{}'. Must be: not-started, in-progress, or completed",
                other
            )),
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress recorded for one phase.
///
/// Every phase always has exactly one entry; a fresh session starts with
/// `not-started` and an empty note for all of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub status: ProgressStatus,
    /// Free-text note, e.g. open gaps to carry into a later phase.
    #[serde(default)]
    pub note: String,
    pub updated_at: DateTime<Utc>,
}

impl ProgressEntry {
    pub fn not_started(at: DateTime<Utc>) -> Self {
        Self {
            status: ProgressStatus::NotStarted,
            note: String::new(),
            updated_at: at,
        }
    }
}
