//! Line-level keyword matching
//!
//! Matching is literal and case-sensitive. `ExactToken` compares the keyword
//! against whitespace-delimited tokens, `Substring` tests raw containment.

use super::types::MatchMode;
use std::ops::Range;

/// Returns true if `keyword` matches `line` under `mode`
pub fn matches(line: &str, keyword: &str, mode: MatchMode) -> bool {
    if keyword.is_empty() {
        return false;
    }
    match mode {
        MatchMode::ExactToken => line.split_whitespace().any(|token| token == keyword),
        MatchMode::Substring => line.contains(keyword),
    }
}

/// Byte ranges of every place `keyword` matched in `line`, used for highlighting
pub fn match_spans(line: &str, keyword: &str, mode: MatchMode) -> Vec<Range<usize>> {
    if keyword.is_empty() {
        return Vec::new();
    }
    match mode {
        MatchMode::ExactToken => token_spans(line)
            .filter(|span| &line[span.clone()] == keyword)
            .collect(),
        MatchMode::Substring => line
            .match_indices(keyword)
            .map(|(start, found)| start..start + found.len())
            .collect(),
    }
}

/// Matches `line` and returns the highlight spans in one pass; `None` on no match
pub fn find(line: &str, keyword: &str, mode: MatchMode) -> Option<Vec<Range<usize>>> {
    let spans = match_spans(line, keyword, mode);
    if spans.is_empty() { None } else { Some(spans) }
}

/// Byte ranges of the whitespace-delimited tokens of `line`
fn token_spans(line: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut start: Option<usize> = None;
    let mut chars = line.char_indices();

    std::iter::from_fn(move || {
        loop {
            match chars.next() {
                Some((idx, ch)) if ch.is_whitespace() => {
                    if let Some(begin) = start.take() {
                        return Some(begin..idx);
                    }
                }
                Some((idx, _)) => {
                    if start.is_none() {
                        start = Some(idx);
                    }
                }
                None => return start.take().map(|begin| begin..line.len()),
            }
        }
    })
}

/// Strips the single leading diff origin marker (`+`, `-` or space) from a patch line
pub fn strip_diff_marker(line: &str) -> &str {
    match line.as_bytes().first() {
        Some(b'+' | b'-' | b' ') => &line[1..],
        _ => line,
    }
}
