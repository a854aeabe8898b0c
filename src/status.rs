//! Progress summary rendering.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{Manifest, PhaseId};
use crate::state::SessionState;

/// Status of one phase as reported by `get_status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseStatus {
    /// Phase ID
    pub phase_id: u8,
    /// Phase name
    pub name: String,
    /// Current status
    pub status: String,
    /// Number of times this phase was accessed
    pub reads: usize,
}

/// One row per phase, in manifest order.
pub fn phase_statuses(state: &SessionState, manifest: &Manifest) -> Vec<PhaseStatus> {
    PhaseId::all()
        .map(|id| {
            let phase = manifest.phase(id);
            PhaseStatus {
                phase_id: phase.id,
                name: phase.name.clone(),
                status: state.progress(id).status.as_str().to_string(),
                reads: state.reads(id),
            }
        })
        .collect()
}

/// Render progress as a markdown table.
///
/// Example output:
/// ```text
/// | Phase | Name | Status | Reads |
/// |-------|------|--------|-------|
/// | 0 | SKILL.md Specification | completed | 4 |
/// | 1 | Use Case Discovery | in-progress | 1 |
/// ```
pub fn format_status_table(state: &SessionState, manifest: &Manifest) -> String {
    let mut lines = vec![
        "| Phase | Name | Status | Reads |".to_string(),
        "|-------|------|--------|-------|".to_string(),
    ];
    for row in phase_statuses(state, manifest) {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            row.phase_id, row.name, row.status, row.reads
        ));
    }
    lines.join("\n")
}
