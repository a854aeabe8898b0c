//! Domain models for SkillForge.
//!
//! # Core Concepts
//!
//! ## Corpus Structure
//!
//! - [`Manifest`]: Index of the nine phases, each with its named sections.
//!   Validated at load so every [`PhaseId`] maps to exactly one phase.
//! - [`SectionDescriptor`]: Maps a section name to the `### ` heading that
//!   opens it in the phase document.
//!
//! ## Session State
//!
//! These live for one server process and are optionally persisted:
//!
//! - [`ProgressEntry`]: Status and note for one phase; always present for all nine.
//! - [`AccessLog`]: Bounded record of reads, used to count reads per phase.
//!
//! ## Values
//!
//! - [`SearchHit`]: One matching line, attributed to its phase and section.

mod access_log;
mod phase;
mod progress;
mod search_hit;

pub use access_log::*;
pub use phase::*;
pub use progress::*;
pub use search_hit::*;
