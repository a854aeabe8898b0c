//! Error types for corpus loading and content retrieval.
//!
//! [`ContentError`] is what retrieval operations hand back to callers. It
//! separates caller mistakes (`InvalidPhaseId`, `SectionNotFound`) from
//! authoring defects (`HeadingIntegrity`). Mapping to wire-level codes
//! happens in the transport layer, not here.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::PHASE_COUNT;

/// Errors surfaced by extraction and phase lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The phase id was not an integer in `0..=8`.
    #[error("Phase {0} does not exist. Valid range: 0-8")]
    InvalidPhaseId(String),

    /// The phase exists but has no section with this name.
    #[error("Section '{section}' not found in Phase {phase_id}. Available: {}", available.join(", "))]
    SectionNotFound {
        phase_id: u8,
        section: String,
        /// Every section name declared for the phase, in manifest order.
        available: Vec<String>,
        suggestion: Option<String>,
    },

    /// The manifest declares a heading that the phase document lacks.
    #[error("Section heading not found in phase file: {marker}")]
    HeadingIntegrity { phase_id: u8, marker: String },
}

impl ContentError {
    /// True for errors caused by the caller's input rather than the corpus.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::HeadingIntegrity { .. })
    }
}

/// Errors raised while loading and validating a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Manifest must describe exactly {PHASE_COUNT} phases, found {0}")]
    PhaseCount(usize),

    #[error("Manifest entry at index {index} has id {id}")]
    PhaseIdMismatch { index: usize, id: u8 },

    #[error("Phase {phase_id} declares section '{name}' more than once")]
    DuplicateSection { phase_id: u8, name: String },

    #[error("Phase {phase_id} depends on unknown phase {dependency}")]
    UnknownDependency { phase_id: u8, dependency: u8 },

    #[error("Default locale has no document for phase {0}")]
    MissingDocument(u8),

    #[error("Expected {PHASE_COUNT} phase documents, found {0}")]
    ExtraDocuments(usize),
}
