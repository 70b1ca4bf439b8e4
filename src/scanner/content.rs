//! Working-tree and directory content search

use anyhow::Result;

use super::filters::InclusionPolicy;
use super::matcher;
use super::sources::CandidateSource;
use super::types::{MatchMode, MatchRecord, SurfaceKind};
use crate::parallel::ExecutionStrategy;

/// Search every eligible source for `keyword`, line by line
///
/// Records come back in source order, then line order. A source that cannot
/// be read is logged and skipped; it never aborts the scan.
pub fn search_files(
    sources: &[CandidateSource],
    keyword: &str,
    mode: MatchMode,
    policy: &InclusionPolicy,
    strategy: ExecutionStrategy,
) -> Result<Vec<MatchRecord>> {
    let eligible: Vec<&CandidateSource> = sources
        .iter()
        .filter(|source| policy.eligible(source.display_path()))
        .collect();

    tracing::trace!(
        "Searching {} of {} files for '{}'",
        eligible.len(),
        sources.len(),
        keyword
    );

    let per_file = strategy.execute(&eligible, |source| search_source(source, keyword, mode))?;
    Ok(per_file.into_iter().flatten().collect())
}

/// Matches within a single source; empty if the source is unreadable
pub fn search_source(source: &CandidateSource, keyword: &str, mode: MatchMode) -> Vec<MatchRecord> {
    let content = match source.read_text() {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Skipping unreadable file: {:#}", e);
            return Vec::new();
        }
    };

    search_text(&content, keyword, mode)
        .map(|(line_number, line, spans)| {
            MatchRecord::new(SurfaceKind::FileContent, line.to_string(), spans)
                .with_path(source.display_path())
                .with_line(line_number)
        })
        .collect()
}

/// Matching lines of `text` as `(1-based line number, line, spans)`
pub(crate) fn search_text<'a>(
    text: &'a str,
    keyword: &'a str,
    mode: MatchMode,
) -> impl Iterator<Item = (usize, &'a str, Vec<std::ops::Range<usize>>)> + 'a {
    text.lines().enumerate().filter_map(move |(idx, line)| {
        matcher::find(line, keyword, mode).map(|spans| (idx + 1, line, spans))
    })
}
