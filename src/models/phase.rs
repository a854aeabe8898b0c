use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ContentError, CorpusError};

/// Number of phases in the process. Ids run from `0` to `PHASE_COUNT - 1`.
pub const PHASE_COUNT: usize = 9;

/// Name of the implicit section holding everything before the first heading.
pub const OVERVIEW_SECTION: &str = "overview";

/// A validated phase id in `0..=8`.
///
/// Holding a `PhaseId` means the range check already happened at the
/// boundary, so corpus and state lookups by id cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct PhaseId(u8);

impl PhaseId {
    pub fn new(id: u8) -> Option<Self> {
        ((id as usize) < PHASE_COUNT).then_some(Self(id))
    }

    /// Parse a phase id as it appears in an address or request.
    ///
    /// Surrounding whitespace is ignored. Anything that is not an integer in
    /// range fails with [`ContentError::InvalidPhaseId`].
    pub fn parse(raw: &str) -> Result<Self, ContentError> {
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| Self::try_from(n).ok())
            .ok_or_else(|| ContentError::InvalidPhaseId(raw.trim().to_string()))
    }

    /// All phase ids in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..PHASE_COUNT as u8).map(Self)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<i64> for PhaseId {
    type Error = ContentError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ContentError::InvalidPhaseId(value.to_string()))
    }
}

impl From<PhaseId> for u8 {
    fn from(id: PhaseId) -> Self {
        id.0
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named region of a phase document, located by its `### ` heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    /// Stable address used in `process://phase/{id}/section/{name}`.
    pub name: String,
    /// Heading text as it appears after `### ` in the document.
    pub heading: String,
}

impl SectionDescriptor {
    /// The full heading line that starts this section.
    pub fn marker(&self) -> String {
        format!("### {}", self.heading)
    }
}

/// One phase of the process as described by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDescriptor {
    pub id: u8,
    pub name: String,
    pub description: String,
    /// Phases whose output this one builds on.
    #[serde(default)]
    pub depends_on: Vec<u8>,
    pub sections: Vec<SectionDescriptor>,
}

impl PhaseDescriptor {
    pub fn section(&self, name: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }
}

/// The structural index of the process: exactly nine phases, `phases[i].id == i`.
///
/// A `Manifest` can only be built through [`Manifest::new`] or
/// [`Manifest::from_json`], both of which validate the shape, so component
/// code can index phases by [`PhaseId`] without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    phases: Vec<PhaseDescriptor>,
}

#[derive(Deserialize)]
struct RawManifest {
    phases: Vec<PhaseDescriptor>,
}

impl Manifest {
    pub fn new(phases: Vec<PhaseDescriptor>) -> Result<Self, CorpusError> {
        if phases.len() != PHASE_COUNT {
            return Err(CorpusError::PhaseCount(phases.len()));
        }

        for (index, phase) in phases.iter().enumerate() {
            if phase.id as usize != index {
                return Err(CorpusError::PhaseIdMismatch {
                    index,
                    id: phase.id,
                });
            }

            let mut seen = HashSet::new();
            for section in &phase.sections {
                if !seen.insert(section.name.as_str()) {
                    return Err(CorpusError::DuplicateSection {
                        phase_id: phase.id,
                        name: section.name.clone(),
                    });
                }
            }

            if let Some(&dependency) = phase
                .depends_on
                .iter()
                .find(|&&d| d as usize >= PHASE_COUNT)
            {
                return Err(CorpusError::UnknownDependency {
                    phase_id: phase.id,
                    dependency,
                });
            }
        }

        Ok(Self { phases })
    }

    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let raw: RawManifest = serde_json::from_str(json)?;
        Self::new(raw.phases)
    }

    pub fn phase(&self, id: PhaseId) -> &PhaseDescriptor {
        &self.phases[id.index()]
    }

    pub fn phases(&self) -> &[PhaseDescriptor] {
        &self.phases
    }
}
