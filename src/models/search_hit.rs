use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single line of the corpus that matched a search query.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Phase ID where match was found
    pub phase_id: u8,
    /// Section name within the phase
    pub section_name: String,
    /// Line number of the match (1-indexed)
    pub line_number: usize,
    /// Matched line text
    pub line_text: String,
}
