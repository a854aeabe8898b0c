//! Request and response types for MCP tools, prompts, and resources.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{ProgressStatus, SearchHit};
use crate::search::DEFAULT_MAX_RESULTS;
use crate::status::PhaseStatus;

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchProcessRequest {
    #[schemars(description = "Search keyword (case-insensitive partial match)")]
    pub query: String,
    #[schemars(description = "Maximum number of results to return (1-50, default 5)")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkProgressRequest {
    #[schemars(description = "Phase ID (0-8)")]
    pub phase_id: i64,
    #[schemars(description = "Phase status: 'not-started', 'in-progress', or 'completed'")]
    pub status: ProgressStatus,
    #[schemars(
        description = "Optional note (e.g., '2 gaps from Phase 3 to address in Phase 4')"
    )]
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSkillArgs {
    #[schemars(
        description = "The skill topic to create (e.g., 'React component design', 'Python error handling')"
    )]
    pub topic: String,
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    /// Total number of matches found
    pub total: usize,
    /// Matching lines with location info
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkProgressResponse {
    /// Phase ID that was updated
    pub phase_id: u8,
    /// New status value
    pub status: ProgressStatus,
    /// RFC 3339 timestamp of the update
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
    /// Status of each phase
    pub phases: Vec<PhaseStatus>,
}

/// One text item returned from a resource read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceText {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}

pub const MIME_MARKDOWN: &str = "text/markdown";
pub const MIME_JSON: &str = "application/json";
