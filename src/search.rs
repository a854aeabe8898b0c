//! Line-oriented keyword search across every phase document.
//!
//! This is a plain scan, not an index: phases are read in id order, lines in
//! document order, and every line containing the query (case-insensitively)
//! becomes a [`SearchHit`] until the result cap is reached.

use crate::content::{is_section_marker, Corpus, Locale};
use crate::models::{PhaseId, SearchHit, OVERVIEW_SECTION};

/// Default number of hits returned by the `search_process` tool.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Upper bound accepted for `maxResults`.
pub const MAX_RESULTS_LIMIT: usize = 50;

/// Search all phases for `query`, returning at most `max_results` hits.
///
/// Each hit is attributed to the section active at its line. A declared
/// heading line belongs to the section it opens, so searching for a heading's
/// text reports that section rather than the previous one.
pub fn search(corpus: &Corpus, locale: Locale, query: &str, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    if query.trim().is_empty() || max_results == 0 {
        return hits;
    }

    let needle = query.to_lowercase();
    let manifest = corpus.manifest(locale);

    for id in PhaseId::all() {
        let phase = manifest.phase(id);
        let mut current_section: &str = OVERVIEW_SECTION;

        for (index, line) in corpus.document(id, locale).split('\n').enumerate() {
            if let Some(section) = phase
                .sections
                .iter()
                .find(|s| is_section_marker(line, &s.heading))
            {
                current_section = section.name.as_str();
            }

            if line.to_lowercase().contains(&needle) {
                hits.push(SearchHit {
                    phase_id: id.get(),
                    section_name: current_section.to_string(),
                    line_number: index + 1,
                    line_text: line.trim().to_string(),
                });
                if hits.len() >= max_results {
                    return hits;
                }
            }
        }
    }

    hits
}

/// Render hits as the text body of a search response.
pub fn format_search_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No matches found for '{}'.", query);
    }

    let blocks: Vec<String> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. [Phase {} > {}] line {}\n   \"{}\"",
                i + 1,
                hit.phase_id,
                hit.section_name,
                hit.line_number,
                hit.line_text
            )
        })
        .collect();

    format!(
        "Found {} matches for '{}':\n\n{}",
        hits.len(),
        query,
        blocks.join("\n\n")
    )
}
