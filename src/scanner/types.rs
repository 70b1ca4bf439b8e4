use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// How a keyword is compared against a line of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Keyword must equal one whitespace-delimited token
    #[default]
    ExactToken,
    /// Keyword may appear anywhere in the line
    Substring,
}

/// The text surface a match was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    FileContent,
    CommitMessage,
    CommitDiff,
    BranchDiff,
}

impl SurfaceKind {
    /// Every surface, in the order they are searched for each keyword
    pub const ALL: [SurfaceKind; 4] = [
        SurfaceKind::FileContent,
        SurfaceKind::CommitMessage,
        SurfaceKind::CommitDiff,
        SurfaceKind::BranchDiff,
    ];

    /// Plural noun used in "Found in ..." / "Nothing found in ..." messages
    pub fn label(&self) -> &'static str {
        match self {
            SurfaceKind::FileContent => "files",
            SurfaceKind::CommitMessage => "commit messages",
            SurfaceKind::CommitDiff => "commit diffs",
            SurfaceKind::BranchDiff => "branch diffs",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Change kind of a file within a commit or branch comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
        };
        f.write_str(name)
    }
}

/// A single reported keyword occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub surface: SurfaceKind,

    /// File path, relative to the repository root (or as walked in standalone mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Full revision hash for commit surfaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    /// Remote-tracking reference for branch diffs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeKind>,

    /// Line number (1-indexed) within the blob the match was found in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,

    /// The matched line, or the whole message for commit messages
    pub text: String,

    /// Byte ranges of the keyword inside `text`
    pub spans: Vec<Range<usize>>,
}

impl MatchRecord {
    pub fn new(surface: SurfaceKind, text: String, spans: Vec<Range<usize>>) -> Self {
        Self {
            surface,
            path: None,
            commit: None,
            branch: None,
            change: None,
            line_number: None,
            text,
            spans,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>, change: ChangeKind) -> Self {
        self.branch = Some(branch.into());
        self.change = Some(change);
        self
    }

    pub fn with_line(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Abbreviated commit hash for display
    pub fn short_commit(&self) -> Option<&str> {
        self.commit.as_deref().map(short_hash)
    }
}

/// First seven characters of a revision hash
pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

/// An important file seen in the working tree or in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportantFile {
    pub path: PathBuf,

    /// Commit that touched the file; `None` for the working tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Per-keyword tally of matches by surface
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordSummary {
    pub keyword: String,
    pub counts: Vec<(SurfaceKind, usize)>,
}

impl KeywordSummary {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            counts: Vec::new(),
        }
    }

    pub fn record(&mut self, surface: SurfaceKind, count: usize) {
        self.counts.push((surface, count));
    }

    /// Whether the surface was searched and produced at least one match
    pub fn found(&self, surface: SurfaceKind) -> bool {
        self.count(surface) > 0
    }

    pub fn count(&self, surface: SurfaceKind) -> usize {
        self.counts
            .iter()
            .find(|(kind, _)| *kind == surface)
            .map_or(0, |(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Surfaces that were actually searched for this keyword
    pub fn searched(&self) -> impl Iterator<Item = SurfaceKind> + '_ {
        self.counts.iter().map(|(kind, _)| *kind)
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub important_files: Vec<ImportantFile>,
    pub keywords: Vec<KeywordSummary>,
}

impl RunSummary {
    pub fn total_matches(&self) -> usize {
        self.keywords.iter().map(KeywordSummary::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("0123456789abcdef"), "0123456");
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn test_record_builders() {
        let record = MatchRecord::new(SurfaceKind::BranchDiff, "x".into(), vec![0..1])
            .with_path("src/a.rs")
            .with_branch("origin/main", ChangeKind::Added)
            .with_line(3);

        assert_eq!(record.path.as_deref(), Some(std::path::Path::new("src/a.rs")));
        assert_eq!(record.branch.as_deref(), Some("origin/main"));
        assert_eq!(record.change, Some(ChangeKind::Added));
        assert_eq!(record.line_number, Some(3));
        assert_eq!(record.short_commit(), None);
    }

    #[test]
    fn test_keyword_summary_counts() {
        let mut summary = KeywordSummary::new("token");
        summary.record(SurfaceKind::FileContent, 2);
        summary.record(SurfaceKind::CommitMessage, 0);

        assert!(summary.found(SurfaceKind::FileContent));
        assert!(!summary.found(SurfaceKind::CommitMessage));
        assert!(!summary.found(SurfaceKind::CommitDiff));
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.searched().count(), 2);
    }
}
