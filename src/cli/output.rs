//! Output for pickaxe
//!
//! Text output mirrors a terminal grep: one line per match, coloured through
//! the [`Highlight`] styles. JSON output collects the whole run and prints a
//! single document at the end.

use console::{StyledObject, style};
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::ops::Range;
use std::path::Path;

use crate::scanner::types::short_hash;
use crate::scanner::{ImportantFile, MatchRecord, Reporter, RunSummary, SurfaceKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON format
    Json,
}

/// Styles used by the text output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    Keyword,
    Heading,
    Path,
    LineNumber,
    Header,
    Miss,
    Commit,
    Branch,
}

impl Highlight {
    pub fn paint<D>(self, value: D) -> StyledObject<D> {
        let styled = style(value);
        match self {
            Highlight::Keyword => styled.green().bold(),
            Highlight::Heading => styled.blue().reverse(),
            Highlight::Path => styled.white().bright(),
            Highlight::LineNumber => styled.red().bright(),
            Highlight::Header => styled.yellow(),
            Highlight::Miss => styled.red(),
            Highlight::Commit => styled.cyan(),
            Highlight::Branch => styled.magenta(),
        }
    }
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✖").red(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Heading printed before the first record of a surface
pub fn surface_header(surface: SurfaceKind) -> &'static str {
    match surface {
        SurfaceKind::FileContent => "Found in file contents:",
        SurfaceKind::CommitMessage => "Found in commit messages:",
        SurfaceKind::CommitDiff => "Found in commit diffs:",
        SurfaceKind::BranchDiff => "Found in branch diffs:",
    }
}

/// Trim `text` and paint every span that survives the trim
pub fn highlight_spans(text: &str, spans: &[Range<usize>]) -> String {
    let start = text.len() - text.trim_start().len();
    let end = text.trim_end().len().max(start);

    let mut rendered = String::with_capacity(text.len());
    let mut cursor = start;
    for span in spans {
        let span_start = span.start.clamp(cursor, end);
        let span_end = span.end.clamp(span_start, end);
        if span_start == span_end {
            continue;
        }
        rendered.push_str(&text[cursor..span_start]);
        rendered.push_str(&Highlight::Keyword.paint(&text[span_start..span_end]).to_string());
        cursor = span_end;
    }
    rendered.push_str(&text[cursor..end]);
    rendered
}

/// Render one record without the surface header
pub fn format_record(record: &MatchRecord) -> String {
    let text = highlight_spans(&record.text, &record.spans);
    let commit = record.short_commit().unwrap_or_default();
    let location = match (&record.path, record.line_number) {
        (Some(path), Some(line)) => format!(
            "{}:{}",
            Highlight::Path.paint(path.display()),
            Highlight::LineNumber.paint(line)
        ),
        (Some(path), None) => Highlight::Path.paint(path.display()).to_string(),
        _ => String::new(),
    };

    match record.surface {
        SurfaceKind::FileContent => format!("{location}: {text}"),
        SurfaceKind::CommitMessage => {
            format!("Commit {}: {text}", Highlight::Commit.paint(commit))
        }
        SurfaceKind::CommitDiff => {
            format!("Commit {} {location}: {text}", Highlight::Commit.paint(commit))
        }
        SurfaceKind::BranchDiff => {
            let branch = record.branch.as_deref().unwrap_or_default();
            let change = record.change.map(|c| c.to_string()).unwrap_or_default();
            format!(
                "{} [{change}] {location}: {text}",
                Highlight::Branch.paint(branch)
            )
        }
    }
}

pub fn format_important_file(file: &ImportantFile) -> String {
    let path = Highlight::Path.paint(file.path.display());
    match &file.commit {
        Some(commit) => format!(
            "Important file found in commit {}: {path}",
            Highlight::Commit.paint(short_hash(commit))
        ),
        None => format!("Important file found: {path}"),
    }
}

/// Line-oriented terminal reporter
pub struct TextReporter<W: Write = io::Stdout> {
    out: W,
    verbose: bool,
}

impl TextReporter {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(io::stdout(), verbose)
    }
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: impl AsRef<str>) {
        if let Err(e) = writeln!(self.out, "{}", line.as_ref()) {
            tracing::debug!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn walked(&mut self, path: &Path) {
        if self.verbose {
            self.line(path.display().to_string());
        }
    }

    fn important_files(&mut self, files: &[ImportantFile]) {
        for file in files {
            let line = format_important_file(file);
            self.line(line);
        }
    }

    fn keyword_started(&mut self, keyword: &str) {
        self.line("");
        self.line(format!("Searching for keyword: {}", Highlight::Heading.paint(keyword)));
    }

    fn surface(&mut self, _keyword: &str, surface: SurfaceKind, records: &[MatchRecord]) {
        self.line(Highlight::Header.paint(surface_header(surface)).to_string());
        for record in records {
            let line = format_record(record);
            self.line(line);
        }
    }

    fn nothing_found(&mut self, _keyword: &str, surface: SurfaceKind) {
        let line = Highlight::Miss.paint(format!("Nothing found in {surface}")).to_string();
        self.line(line);
    }

    fn finished(&mut self, summary: &RunSummary) {
        if !self.verbose {
            return;
        }
        self.line("");
        for keyword in &summary.keywords {
            let line = format!(
                "{} {}",
                Highlight::Heading.paint(&keyword.keyword),
                style(format!("({} matches)", keyword.total())).dim()
            );
            self.line(line);
        }
    }
}

#[derive(Debug, Serialize)]
struct KeywordReport {
    keyword: String,
    matches: Vec<MatchRecord>,
    nothing_found: Vec<SurfaceKind>,
}

/// Collects the run and prints one JSON document when it finishes
pub struct JsonReporter<W: Write = io::Stdout> {
    out: W,
    keywords: Vec<KeywordReport>,
}

impl JsonReporter {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            keywords: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn current(&mut self, keyword: &str) -> &mut KeywordReport {
        if self.keywords.last().is_none_or(|report| report.keyword != keyword) {
            self.keywords.push(KeywordReport {
                keyword: keyword.to_string(),
                matches: Vec::new(),
                nothing_found: Vec::new(),
            });
        }
        let last = self.keywords.len() - 1;
        &mut self.keywords[last]
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn important_files(&mut self, _files: &[ImportantFile]) {}

    fn keyword_started(&mut self, keyword: &str) {
        self.current(keyword);
    }

    fn surface(&mut self, keyword: &str, _surface: SurfaceKind, records: &[MatchRecord]) {
        self.current(keyword).matches.extend_from_slice(records);
    }

    fn nothing_found(&mut self, keyword: &str, surface: SurfaceKind) {
        self.current(keyword).nothing_found.push(surface);
    }

    fn finished(&mut self, summary: &RunSummary) {
        let document = json!({
            "important_files": summary.important_files,
            "keywords": self.keywords,
            "statistics": {
                "keywords_searched": summary.keywords.len(),
                "total_matches": summary.total_matches(),
            }
        });

        let written = serde_json::to_string_pretty(&document)
            .map_err(io::Error::from)
            .and_then(|rendered| writeln!(self.out, "{rendered}"));
        if let Err(e) = written {
            tracing::warn!("Failed to write JSON output: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ChangeKind, KeywordSummary};
    use std::path::PathBuf;

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).to_string()
    }

    fn record(surface: SurfaceKind, text: &str, spans: Vec<Range<usize>>) -> MatchRecord {
        MatchRecord::new(surface, text.to_string(), spans)
    }

    #[test]
    fn test_record_formats() {
        let file = record(SurfaceKind::FileContent, "  my token  ", vec![5..10])
            .with_path("src/a.rs")
            .with_line(3);
        assert_eq!(plain(&format_record(&file)), "src/a.rs:3: my token");

        let message = record(SurfaceKind::CommitMessage, "fix password bug", vec![4..12])
            .with_commit("0123456789abcdef");
        assert_eq!(plain(&format_record(&message)), "Commit 0123456: fix password bug");

        let diff = record(SurfaceKind::CommitDiff, "+token = 1", vec![1..6])
            .with_commit("abcdef0123")
            .with_path("config.txt")
            .with_line(4);
        assert_eq!(plain(&format_record(&diff)), "Commit abcdef0 config.txt:4: +token = 1");

        let branch = record(SurfaceKind::BranchDiff, "token", vec![0..5])
            .with_branch("origin/dev", ChangeKind::Added)
            .with_path("new.txt")
            .with_line(1);
        assert_eq!(plain(&format_record(&branch)), "origin/dev [added] new.txt:1: token");
    }

    #[test]
    fn test_highlight_spans_with_trimmed_edges() {
        console::set_colors_enabled(true);
        let rendered = highlight_spans("  token and token\n", &[2..7, 12..17]);
        assert_eq!(plain(&rendered), "token and token");
        assert_eq!(rendered.matches("token").count(), 2);
        assert!(rendered.contains('\u{1b}'));
    }

    #[test]
    fn test_important_file_lines() {
        let working = ImportantFile { path: PathBuf::from("config/.env"), commit: None };
        assert_eq!(plain(&format_important_file(&working)), "Important file found: config/.env");

        let historical = ImportantFile {
            path: PathBuf::from(".ssh/id_rsa"),
            commit: Some("fedcba9876543210".into()),
        };
        assert_eq!(
            plain(&format_important_file(&historical)),
            "Important file found in commit fedcba9: .ssh/id_rsa"
        );
    }

    #[test]
    fn test_text_reporter_sequence() {
        let mut reporter = TextReporter::new(Vec::new(), false);
        reporter.important_files(&[]);
        reporter.keyword_started("token");
        reporter.surface(
            "token",
            SurfaceKind::FileContent,
            &[record(SurfaceKind::FileContent, "token", vec![0..5]).with_path("a").with_line(1)],
        );
        reporter.nothing_found("token", SurfaceKind::CommitMessage);
        reporter.finished(&RunSummary::default());

        let output = plain(&String::from_utf8(reporter.into_inner()).unwrap());
        assert_eq!(
            output,
            "\nSearching for keyword: token\nFound in file contents:\na:1: token\n\
             Nothing found in commit messages\n"
        );
    }

    #[test]
    fn test_verbose_text_reporter_lists_walked_files_and_totals() {
        let mut reporter = TextReporter::new(Vec::new(), true);
        reporter.walked(Path::new("/tmp/dir/a.txt"));
        let mut tally = KeywordSummary::new("token");
        tally.record(SurfaceKind::FileContent, 3);
        reporter.finished(&RunSummary { important_files: vec![], keywords: vec![tally] });

        let output = plain(&String::from_utf8(reporter.into_inner()).unwrap());
        assert!(output.starts_with("/tmp/dir/a.txt\n"));
        assert!(output.contains("token (3 matches)"));
    }

    #[test]
    fn test_json_reporter_document() {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.keyword_started("token");
        reporter.surface(
            "token",
            SurfaceKind::CommitMessage,
            &[record(SurfaceKind::CommitMessage, "add token", vec![4..9]).with_commit("c1")],
        );
        reporter.keyword_started("secret");
        reporter.nothing_found("secret", SurfaceKind::FileContent);

        let mut tally = KeywordSummary::new("token");
        tally.record(SurfaceKind::CommitMessage, 1);
        reporter.finished(&RunSummary {
            important_files: vec![ImportantFile { path: PathBuf::from(".env"), commit: None }],
            keywords: vec![tally, KeywordSummary::new("secret")],
        });

        let value: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
        assert_eq!(value["statistics"]["total_matches"], 1);
        assert_eq!(value["important_files"][0]["path"], ".env");
        assert_eq!(value["keywords"][0]["keyword"], "token");
        assert_eq!(value["keywords"][0]["matches"][0]["surface"], "commit_message");
        assert_eq!(value["keywords"][0]["matches"][0]["spans"][0]["start"], 4);
        assert_eq!(value["keywords"][1]["nothing_found"][0], "file_content");
    }
}
