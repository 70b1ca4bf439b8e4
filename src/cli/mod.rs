//! Command-line interface for pickaxe
//!
//! Parses arguments, loads configuration, and runs the search on a blocking
//! task so an interrupt can be observed while it runs. On interrupt the task
//! is told to stop and awaited, so nothing is still writing into the temporary
//! workspace of a remote target when that workspace is removed.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

pub mod output;

use crate::config::PickaxeConfig;
use crate::git::GitRepo;
use crate::git::remote::{Workspace, is_remote_url};
use crate::scanner::{MatchMode, Reporter, RunSummary, SearchOptions, Searcher, Target};
use output::{JsonReporter, OutputFormat, TextReporter};

/// Exit code reported when the run is interrupted
pub const EXIT_INTERRUPTED: i32 = 130;

const BANNER: &str = "\
⠀⠀⠀⠀⠀⠀⠀⠀⢀⣀⣀⣀⣀⣀⣀⡀⠀⠀⠀⠀⠀⠀⠀⠀
⠀⠀⠀⠀⠀⠀⢀⣀⡿⠿⠿⠿⠿⠿⠿⢿⣀⣀⣀⣀⣀⡀⠀⠀
⠀⠀⠀⠀⠀⠀⠸⠿⣇⣀⣀⣀⣀⣀⣀⣸⠿⢿⣿⣿⣿⡇⠀⠀
⠀⠀⠀⠀⠀⠀⠀⠀⠻⠿⠿⠿⠿⠿⣿⣿⣀⡸⠿⢿⣿⡇⠀⠀
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⣤⣤⣿⣿⣿⣧⣤⡼⠿⢧⣤⡀
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⣤⣤⣿⣿⣿⣿⠛⢻⣿⡇⠀⢸⣿⡇
⠀⠀⠀⠀⠀⠀⠀⠀⣤⣤⣿⣿⣿⣿⠛⠛⠀⢸⣿⡇⠀⢸⣿⡇
⠀⠀⠀⠀⠀⠀⢠⣤⣿⣿⣿⣿⠛⠛⠀⠀⠀⢸⣿⡇⠀⢸⣿⡇
⠀⠀⠀⠀⢰⣶⣾⣿⣿⣿⠛⠛⠀⠀⠀⠀⠀⠈⠛⢳⣶⡞⠛⠁
⠀⠀⢰⣶⣾⣿⣿⣿⡏⠉⠀⠀⠀⠀⠀⠀⠀⠀⠀⠈⠉⠁⠀⠀
⢰⣶⡎⠉⢹⣿⡏⠉⠁⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀
⢸⣿⣷⣶⡎⠉⠁⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀
⠀⠉⠉⠉⠁⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀";

#[derive(Parser, Debug)]
#[command(
    name = "pickaxe",
    version = env!("CARGO_PKG_VERSION"),
    about = "Search a git repository's files, history and branches for keywords",
    long_about = "Searches tracked files, commit messages, commit diffs and remote-tracking \
                  branch diffs for a list of keywords, and flags important files such as \
                  .env or private keys. Remote URLs are cloned into a temporary directory.",
    before_help = BANNER
)]
pub struct Cli {
    /// Repository path, remote URL, or a plain directory with --not-repo
    #[arg(value_name = "TARGET", required_unless_present = "list_keywords")]
    pub target: Option<String>,

    /// Match keywords anywhere in a line instead of as whole tokens
    #[arg(short, long)]
    pub substring: bool,

    /// Search files with excluded extensions too
    #[arg(short, long)]
    pub include_all: bool,

    /// Report surfaces where nothing was found
    #[arg(short, long)]
    pub long_format: bool,

    /// Search a directory that is not a git repository (files only)
    #[arg(short, long)]
    pub not_repo: bool,

    /// Also search every commit diff and historical filenames (slow)
    #[arg(short, long)]
    pub deep: bool,

    /// Search for this keyword only
    #[arg(short, long, value_name = "KEYWORD")]
    pub keyword: Option<String>,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the keywords that would be searched and exit
    #[arg(long)]
    pub list_keywords: bool,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Run the command and return the process exit code
    pub async fn run(self) -> Result<i32> {
        setup_logging(self.verbose, self.quiet);

        let config = PickaxeConfig::load_with_custom_config(self.config.as_deref())?;
        config.validate_keywords(self.keyword.as_deref())?;

        if self.list_keywords {
            for keyword in config.effective_keywords(self.keyword.as_deref()) {
                println!("{keyword}");
            }
            return Ok(0);
        }

        let target = self.target.clone().context("No target given")?;
        let interrupted = Arc::new(AtomicBool::new(false));
        let searcher = Searcher::new(&config, self.search_options())
            .with_interrupt(Arc::clone(&interrupted));
        let reporter = self.reporter();

        let workspace = if !self.not_repo && is_remote_url(&target) {
            Some(Workspace::acquire()?)
        } else {
            None
        };
        let workspace_root = workspace.as_ref().map(|w| w.path().to_path_buf());

        let flag = Arc::clone(&interrupted);
        let task = tokio::task::spawn_blocking(move || {
            let mut reporter = reporter;
            scan(&searcher, &target, workspace_root, &flag, reporter.as_mut())
        });

        let outcome = wait_for_scan(task, &interrupted).await;

        if let Some(Err(e)) = workspace.map(Workspace::close) {
            output::warning(&format!("{e:#}"));
        }
        outcome
    }

    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            mode: if self.substring {
                MatchMode::Substring
            } else {
                MatchMode::ExactToken
            },
            include_all: self.include_all,
            deep: self.deep,
            long_format: self.long_format,
            standalone: self.not_repo,
            single_keyword: self.keyword.clone(),
        }
    }

    fn reporter(&self) -> Box<dyn Reporter + Send> {
        match self.format {
            OutputFormat::Text => Box::new(TextReporter::stdout(self.verbose > 0 && !self.quiet)),
            OutputFormat::Json => Box::new(JsonReporter::stdout()),
        }
    }
}

/// Await the scan task, or stop it on Ctrl-C and wait for it to return
async fn wait_for_scan(
    mut task: JoinHandle<Result<RunSummary>>,
    interrupted: &AtomicBool,
) -> Result<i32> {
    tokio::select! {
        joined = &mut task => {
            let summary = joined.context("Search task failed")??;
            tracing::info!(
                "Searched {} keywords, {} matches",
                summary.keywords.len(),
                summary.total_matches()
            );
            Ok(0)
        }
        Ok(()) = tokio::signal::ctrl_c() => {
            output::warning("Interrupted, stopping search");
            interrupted.store(true, Ordering::Relaxed);
            if let Ok(Err(e)) = task.await {
                tracing::debug!("Search stopped: {:#}", e);
            }
            Ok(EXIT_INTERRUPTED)
        }
    }
}

/// Open or clone the target and search it
fn scan(
    searcher: &Searcher,
    target: &str,
    workspace_root: Option<PathBuf>,
    interrupted: &AtomicBool,
    reporter: &mut dyn Reporter,
) -> Result<RunSummary> {
    if searcher.options().standalone {
        return searcher.run(Target::Directory(Path::new(target)), reporter);
    }

    let repo = match &workspace_root {
        Some(dir) => GitRepo::clone_into(target, dir, interrupted)?,
        None => GitRepo::open(target)?,
    };
    searcher.run(
        Target::Repository {
            backend: &repo,
            workspace_root,
        },
        reporter,
    )
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info,ignore=warn"),
        2 => EnvFilter::new("debug,ignore=warn"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
