//! Session state: per-phase progress plus a bounded access log.
//!
//! [`SessionState`] is the plain data. [`StateStore`] loads and saves it,
//! and is a no-op on save when persistence is disabled. [`SharedState`] is
//! the handle the server clones into every request: it serializes mutations
//! behind a mutex and writes through to the store after each one.

mod persist;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::models::*;
use persist::{write_atomic, PersistedState};

/// Directory under the home directory that holds the state file.
const STATE_DIR: &str = ".skill-forge-mcp";
const STATE_FILE: &str = "state.json";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed state file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Progress for every phase plus the access log.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    progress: BTreeMap<PhaseId, ProgressEntry>,
    access_log: AccessLog,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh state: every phase `not-started`, empty log.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            progress: PhaseId::all()
                .map(|id| (id, ProgressEntry::not_started(now)))
                .collect(),
            access_log: AccessLog::default(),
        }
    }

    /// Replace the access log, e.g. to restore a saved one.
    pub fn with_access_log(mut self, access_log: AccessLog) -> Self {
        self.access_log = access_log;
        self
    }

    pub fn progress(&self, id: PhaseId) -> &ProgressEntry {
        &self.progress[&id]
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.access_log
    }

    pub fn reads(&self, id: PhaseId) -> usize {
        self.access_log.reads(id.get())
    }

    pub fn record_access(&mut self, entry: AccessLogEntry) {
        self.access_log.push(entry);
    }

    /// Overwrite the progress of one phase and stamp it with the current time.
    ///
    /// The access log is not touched.
    pub fn set_progress(
        &mut self,
        id: PhaseId,
        status: ProgressStatus,
        note: Option<String>,
    ) -> &ProgressEntry {
        let entry = ProgressEntry {
            status,
            note: note.unwrap_or_default(),
            updated_at: Utc::now(),
        };
        self.progress.insert(id, entry);
        &self.progress[&id]
    }

    /// Build state from a saved document, keeping defaults for any phase the
    /// document does not mention and dropping keys that are not phase ids.
    fn merge(saved: PersistedState) -> Self {
        let mut state = Self::new();

        if let Some(progress) = saved.progress {
            for id in PhaseId::all() {
                if let Some(entry) = progress.get(&id.to_string()) {
                    state.progress.insert(id, entry.clone());
                }
            }
        }

        if let Some(mut access_log) = saved.access_log {
            access_log.truncate();
            state.access_log = access_log;
        }

        state
    }
}

/// Loads and saves [`SessionState`] as a single JSON document.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: Option<PathBuf>,
}

impl StateStore {
    /// A store that never touches disk.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// A store that reads and writes `path`.
    pub fn enabled(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// `~/.skill-forge-mcp/state.json`
    pub fn default_path() -> Result<PathBuf, StateError> {
        let dirs = directories::BaseDirs::new().ok_or(StateError::NoHomeDir)?;
        Ok(dirs.home_dir().join(STATE_DIR).join(STATE_FILE))
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load saved state merged over the defaults.
    ///
    /// A missing, unreadable, or malformed file yields fresh state; the
    /// failure is logged and never returned.
    pub fn load(&self) -> SessionState {
        let Some(path) = &self.path else {
            return SessionState::new();
        };

        if !path.exists() {
            tracing::debug!("No saved state at {}, starting fresh", path.display());
            return SessionState::new();
        }

        match Self::read(path) {
            Ok(saved) => {
                let state = SessionState::merge(saved);
                tracing::info!(
                    "Restored state from {} ({} access log entries)",
                    path.display(),
                    state.access_log.len()
                );
                state
            }
            Err(e) => {
                tracing::warn!("Ignoring saved state: {}", e);
                SessionState::new()
            }
        }
    }

    fn read(path: &Path) -> Result<PersistedState, StateError> {
        let data = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| StateError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Trim the access log to its cap and rewrite the whole document.
    ///
    /// Does nothing when persistence is disabled.
    pub fn save(&self, state: &mut SessionState) -> Result<(), StateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        state.access_log.truncate();
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(path, json.as_bytes()).map_err(|source| StateError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Saved state to {}", path.display());
        Ok(())
    }
}

/// Process-wide handle to the session state.
///
/// Every mutation takes the lock, applies the change, and saves before
/// releasing it, so each operation is atomic with respect to the others.
#[derive(Debug, Clone)]
pub struct SharedState {
    state: Arc<Mutex<SessionState>>,
    store: StateStore,
}

impl SharedState {
    pub fn new(state: SessionState, store: StateStore) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            store,
        }
    }

    /// Load from `store` and wrap the result.
    pub fn load(store: StateStore) -> Self {
        let state = store.load();
        Self::new(state, store)
    }

    /// Append access entries and write through.
    ///
    /// A failed save is logged rather than returned: the read that produced
    /// these entries has already succeeded.
    pub fn record_access(&self, entries: impl IntoIterator<Item = AccessLogEntry>) {
        let mut state = self.state.lock().expect("session state lock poisoned");
        for entry in entries {
            state.record_access(entry);
        }
        if let Err(e) = self.store.save(&mut state) {
            tracing::warn!("Failed to persist access log: {}", e);
        }
    }

    /// Update one phase's progress and write through.
    pub fn set_progress(
        &self,
        id: PhaseId,
        status: ProgressStatus,
        note: Option<String>,
    ) -> Result<ProgressEntry, StateError> {
        let mut state = self.state.lock().expect("session state lock poisoned");
        let entry = state.set_progress(id, status, note).clone();
        self.store.save(&mut state)?;
        Ok(entry)
    }

    /// Save the current state, e.g. on shutdown.
    pub fn flush(&self) -> Result<(), StateError> {
        let mut state = self.state.lock().expect("session state lock poisoned");
        self.store.save(&mut state)
    }

    /// Run `f` against a consistent view of the state.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.lock().expect("session state lock poisoned");
        f(&state)
    }
}
