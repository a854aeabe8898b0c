use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::models::{AccessLog, ProgressEntry};

/// Shape of the state document as read back from disk.
///
/// Both halves are optional so that a partial document still restores
/// whatever it does contain. Progress keys are kept as strings here and
/// filtered to valid phase ids during the merge.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PersistedState {
    #[serde(default)]
    pub progress: Option<HashMap<String, ProgressEntry>>,
    #[serde(default)]
    pub access_log: Option<AccessLog>,
}

/// Replace `path` with `contents` via a temp file in the same directory.
///
/// Readers see either the old document or the new one, never a torn write.
pub(super) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
