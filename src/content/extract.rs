//! Section extraction from phase documents.
//!
//! A phase document is split by level-3 heading lines (`### `). Everything
//! before the first one is the implicit `overview` section; every other
//! section runs from its heading line up to the next heading line.

use super::suggest::suggest;
use crate::error::ContentError;
use crate::models::{PhaseDescriptor, OVERVIEW_SECTION};

/// Prefix that marks a level-3 heading line.
pub const HEADING_PREFIX: &str = "### ";

pub fn is_heading_marker(line: &str) -> bool {
    line.starts_with(HEADING_PREFIX)
}

/// True when `line` is the heading line that opens a section titled
/// `heading`. Only trailing whitespace (including `\r`) is ignored.
pub fn is_section_marker(line: &str, heading: &str) -> bool {
    line.strip_prefix(HEADING_PREFIX)
        .is_some_and(|rest| rest.trim_end() == heading)
}

/// Byte offset and text of every line in `document`.
fn lines_with_offsets(document: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    document.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start, line)
    })
}

/// Return the text of `section_name` within `document`.
///
/// `overview` always succeeds. Any other name must be declared by `phase`;
/// unknown names fail with [`ContentError::SectionNotFound`] carrying the
/// declared names and a suggestion, and a declared heading missing from the
/// document fails with [`ContentError::HeadingIntegrity`].
pub fn extract_section(
    document: &str,
    section_name: &str,
    phase: &PhaseDescriptor,
) -> Result<String, ContentError> {
    if section_name == OVERVIEW_SECTION {
        return Ok(overview(document).to_string());
    }

    let Some(section) = phase.section(section_name) else {
        let available = phase.section_names();
        let suggestion = suggest(section_name, &available).map(str::to_string);
        return Err(ContentError::SectionNotFound {
            phase_id: phase.id,
            section: section_name.to_string(),
            available,
            suggestion,
        });
    };

    let mut lines = lines_with_offsets(document);
    let start = lines
        .find(|(_, line)| is_section_marker(line, &section.heading))
        .map(|(offset, _)| offset)
        .ok_or_else(|| ContentError::HeadingIntegrity {
            phase_id: phase.id,
            marker: section.marker(),
        })?;

    let end = lines
        .find(|(_, line)| is_heading_marker(line))
        .map(|(offset, _)| offset)
        .unwrap_or(document.len());

    Ok(document[start..end].trim().to_string())
}

/// Everything before the first heading line, trimmed.
fn overview(document: &str) -> &str {
    let end = lines_with_offsets(document)
        .find(|(_, line)| is_heading_marker(line))
        .map(|(offset, _)| offset)
        .unwrap_or(document.len());
    document[..end].trim()
}
