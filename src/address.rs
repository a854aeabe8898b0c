//! The `process://` addressing scheme.
//!
//! | Address                                  | Meaning                    |
//! |------------------------------------------|----------------------------|
//! | `process://manifest`                     | manifest of active locale  |
//! | `process://phase/{id}`                   | one full phase document    |
//! | `process://phase/{id}/section/{name}`    | one section of a phase     |
//! | `process://phases/{id},{id},...`         | several phase documents    |

use thiserror::Error;

use crate::error::ContentError;
use crate::models::PhaseId;

pub const MANIFEST_URI: &str = "process://manifest";
pub const SECTION_URI_TEMPLATE: &str = "process://phase/{phaseId}/section/{sectionName}";
pub const BATCH_URI_TEMPLATE: &str = "process://phases/{phaseIds}";

const PHASE_PREFIX: &str = "process://phase/";
const BATCH_PREFIX: &str = "process://phases/";
const SECTION_SEPARATOR: &str = "/section/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Unknown resource: {0}")]
    Unknown(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// A parsed `process://` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAddress {
    Manifest,
    Phase(PhaseId),
    Section { phase: PhaseId, section: String },
    /// Ids in request order; duplicates are kept.
    Batch(Vec<PhaseId>),
}

impl ResourceAddress {
    /// Parse an address. Ids are validated here, so a well-formed address
    /// with an out-of-range id fails with [`ContentError::InvalidPhaseId`].
    pub fn parse(uri: &str) -> Result<Self, AddressError> {
        if uri == MANIFEST_URI {
            return Ok(Self::Manifest);
        }

        if let Some(ids) = uri.strip_prefix(BATCH_PREFIX) {
            let ids = ids
                .split(',')
                .map(PhaseId::parse)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Batch(ids));
        }

        let Some(rest) = uri.strip_prefix(PHASE_PREFIX) else {
            return Err(AddressError::Unknown(uri.to_string()));
        };

        match rest.split_once(SECTION_SEPARATOR) {
            Some((id, section)) if !section.is_empty() && !section.contains('/') => {
                Ok(Self::Section {
                    phase: PhaseId::parse(id)?,
                    section: section.to_string(),
                })
            }
            Some(_) => Err(AddressError::Unknown(uri.to_string())),
            None if rest.contains('/') => Err(AddressError::Unknown(uri.to_string())),
            None => Ok(Self::Phase(PhaseId::parse(rest)?)),
        }
    }

    pub fn phase_uri(id: PhaseId) -> String {
        format!("{}{}", PHASE_PREFIX, id)
    }

    pub fn section_uri(id: PhaseId, section: &str) -> String {
        format!("{}{}{}{}", PHASE_PREFIX, id, SECTION_SEPARATOR, section)
    }
}
