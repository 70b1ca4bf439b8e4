//! Search orchestration
//!
//! A [`Searcher`] drives every surface for every keyword in a fixed order and
//! streams results to a [`Reporter`]. Sources, history, commit diffs and
//! remote refs are loaded once per run; each keyword is searched to completion
//! before the next one starts. The commit diff dedup set spans the whole run.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::branches::search_branches;
use super::commits::{CommitDiff, DiffSearch, load_commit_diffs, search_messages};
use super::content::search_files;
use super::filenames::{check_filenames, check_filenames_in_history};
use super::filters::{ImportantNames, InclusionPolicy};
use super::sources::{CandidateSource, tracked_sources, walk_directory};
use super::types::{ImportantFile, KeywordSummary, MatchMode, MatchRecord, RunSummary, SurfaceKind};
use crate::config::PickaxeConfig;
use crate::git::{Commit, RemoteRef, VcsBackend};
use crate::parallel::ExecutionStrategy;

/// Options selecting what a run searches and how
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub mode: MatchMode,
    /// Ignore the excluded-extension list
    pub include_all: bool,
    /// Also search commit diffs and historical filenames
    pub deep: bool,
    /// Report surfaces with no matches
    pub long_format: bool,
    /// Walk a plain directory instead of a repository
    pub standalone: bool,
    /// Search only this keyword instead of the configured list
    pub single_keyword: Option<String>,
}

/// What a run searches
pub enum Target<'a> {
    /// A repository; `workspace_root` is set when it was cloned into a temporary directory
    Repository {
        backend: &'a dyn VcsBackend,
        workspace_root: Option<PathBuf>,
    },
    /// A plain directory tree with no version-control context
    Directory(&'a Path),
}

/// Receives run events in output order
pub trait Reporter {
    /// A file enumerated in standalone mode
    fn walked(&mut self, _path: &Path) {}

    /// Important files, reported once before any keyword
    fn important_files(&mut self, files: &[ImportantFile]);

    fn keyword_started(&mut self, keyword: &str);

    /// Non-empty results of one surface
    fn surface(&mut self, keyword: &str, surface: SurfaceKind, records: &[MatchRecord]);

    /// A searched surface with no results, only under long format
    fn nothing_found(&mut self, keyword: &str, surface: SurfaceKind);

    fn finished(&mut self, summary: &RunSummary);
}

/// Version-control state shared by all keywords of a run
struct History<'a> {
    backend: &'a dyn VcsBackend,
    commits: Vec<Commit>,
    /// Per-commit diffs, only materialised in deep mode
    diffs: Vec<CommitDiff>,
    head: Option<String>,
    remote_refs: Vec<RemoteRef>,
}

impl<'a> History<'a> {
    fn load(backend: &'a dyn VcsBackend, deep: bool) -> Result<Self> {
        let commits = backend.commits().context("Failed to read commit history")?;
        let head = backend.head_revision().context("Failed to resolve HEAD")?;
        let remote_refs = backend
            .remote_tracking_refs()
            .context("Failed to list remote-tracking branches")?;
        let diffs = if deep {
            load_commit_diffs(backend, &commits)
        } else {
            Vec::new()
        };

        tracing::debug!(
            "Loaded {} commits ({} diffs) and {} remote-tracking branches",
            commits.len(),
            diffs.len(),
            remote_refs.len()
        );

        Ok(Self {
            backend,
            commits,
            diffs,
            head,
            remote_refs,
        })
    }
}

pub struct Searcher {
    options: SearchOptions,
    keywords: Vec<String>,
    policy: InclusionPolicy,
    important: ImportantNames,
    min_files_for_parallel: usize,
    workers: usize,
    interrupted: Arc<AtomicBool>,
}

impl Searcher {
    pub fn new(config: &PickaxeConfig, options: SearchOptions) -> Self {
        let keywords = config.effective_keywords(options.single_keyword.as_deref());
        let policy =
            InclusionPolicy::new(config.search.excluded_extensions.clone(), options.include_all);
        let important = ImportantNames::new(config.search.important_files.iter().cloned());

        Self {
            options,
            keywords,
            policy,
            important,
            min_files_for_parallel: config.parallel.min_files_for_parallel,
            workers: config.parallel.workers(),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop the run at the next surface boundary once `flag` is set
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Keywords in the order they are searched
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Run every keyword against `target`
    ///
    /// Only setup failures (unreadable repository, missing directory) and an
    /// interrupt are returned as errors. Per-file, per-commit and per-branch
    /// problems are logged and skipped.
    pub fn run(&self, target: Target<'_>, reporter: &mut dyn Reporter) -> Result<RunSummary> {
        let (sources, history, workspace_root) = match target {
            Target::Repository {
                backend,
                workspace_root,
            } => {
                let sources = tracked_sources(backend)?;
                let history = History::load(backend, self.options.deep)?;
                (sources, Some(history), workspace_root)
            }
            Target::Directory(root) => {
                let sources = walk_directory(root)?;
                for source in &sources {
                    reporter.walked(source.display_path());
                }
                (sources, None, None)
            }
        };
        self.check_interrupt()?;

        let strategy =
            ExecutionStrategy::auto(sources.len(), self.min_files_for_parallel, self.workers);
        tracing::debug!("Searching {} files with {:?}", sources.len(), strategy);

        let mut summary = RunSummary {
            important_files: self.important_files(&sources, history.as_ref()),
            keywords: Vec::with_capacity(self.keywords.len()),
        };
        reporter.important_files(&summary.important_files);

        let mut diff_search = DiffSearch::new(workspace_root, self.policy.clone());
        for keyword in &self.keywords {
            self.check_interrupt()?;
            reporter.keyword_started(keyword);
            let tally = self.search_keyword(
                keyword,
                &sources,
                history.as_ref(),
                &mut diff_search,
                strategy,
                reporter,
            )?;
            summary.keywords.push(tally);
        }
        tracing::debug!("{} distinct commit diff lines reported", diff_search.reported());

        reporter.finished(&summary);
        Ok(summary)
    }

    fn check_interrupt(&self) -> Result<()> {
        if self.interrupted.load(Ordering::Relaxed) {
            bail!("Search interrupted");
        }
        Ok(())
    }

    fn important_files(
        &self,
        sources: &[CandidateSource],
        history: Option<&History<'_>>,
    ) -> Vec<ImportantFile> {
        let mut found = check_filenames(sources, &self.important);
        if let Some(history) = history.filter(|_| self.options.deep) {
            found.extend(check_filenames_in_history(&history.diffs, &self.important));
        }
        found
    }

    fn search_keyword(
        &self,
        keyword: &str,
        sources: &[CandidateSource],
        history: Option<&History<'_>>,
        diff_search: &mut DiffSearch,
        strategy: ExecutionStrategy,
        reporter: &mut dyn Reporter,
    ) -> Result<KeywordSummary> {
        let mode = self.options.mode;
        let mut tally = KeywordSummary::new(keyword);

        let records = search_files(sources, keyword, mode, &self.policy, strategy)?;
        self.emit(reporter, &mut tally, SurfaceKind::FileContent, records);

        let Some(history) = history else {
            return Ok(tally);
        };

        self.check_interrupt()?;
        let records = search_messages(&history.commits, keyword, mode);
        self.emit(reporter, &mut tally, SurfaceKind::CommitMessage, records);

        if self.options.deep {
            self.check_interrupt()?;
            let records = diff_search.search(&history.diffs, keyword, mode);
            self.emit(reporter, &mut tally, SurfaceKind::CommitDiff, records);
        }

        self.check_interrupt()?;
        match &history.head {
            Some(tip) => {
                let records = search_branches(
                    history.backend,
                    tip,
                    &history.remote_refs,
                    keyword,
                    mode,
                    &self.policy,
                );
                self.emit(reporter, &mut tally, SurfaceKind::BranchDiff, records);
            }
            None => tracing::debug!("No local tip, skipping branch diffs"),
        }

        Ok(tally)
    }

    fn emit(
        &self,
        reporter: &mut dyn Reporter,
        tally: &mut KeywordSummary,
        surface: SurfaceKind,
        records: Vec<MatchRecord>,
    ) {
        tally.record(surface, records.len());
        if !records.is_empty() {
            reporter.surface(&tally.keyword, surface, &records);
        } else if self.options.long_format {
            reporter.nothing_found(&tally.keyword, surface);
        }
    }
}
