//! Configuration management for pickaxe
//!
//! Keywords, the excluded-extension denylist and the important-filename set
//! are loaded once at startup (see [`core`]) and never change during a run.

pub mod core;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PickaxeConfig {
    pub search: SearchConfig,
    pub parallel: ParallelConfig,
}

/// What to search for and where
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Keywords, searched in this order
    pub keywords: Vec<String>,

    /// Path suffixes skipped by content search unless `--include-all` is given
    pub excluded_extensions: Vec<String>,

    /// Base filenames reported wherever they appear
    pub important_files: Vec<String>,
}

/// Worker pool sizing for content search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Upper bound on worker threads, 0 for no limit
    pub max_threads: usize,

    /// Share of available CPUs to use (1-100)
    pub thread_percentage: u8,

    /// Below this many files content search stays sequential
    pub min_files_for_parallel: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: 75,
            min_files_for_parallel: 50,
        }
    }
}

impl ParallelConfig {
    pub fn workers(&self) -> usize {
        crate::parallel::ExecutionStrategy::calculate_optimal_workers(
            self.max_threads,
            self.thread_percentage,
        )
    }
}

impl PickaxeConfig {
    /// Keywords for a run: the override alone if given, else the configured list
    pub fn effective_keywords(&self, single_keyword: Option<&str>) -> Vec<String> {
        match single_keyword {
            Some(keyword) => vec![keyword.to_string()],
            None => self.search.keywords.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.keywords.iter().any(|k| k.is_empty()) {
            bail!("Keywords cannot be empty strings");
        }
        if self.search.excluded_extensions.iter().any(|e| e.is_empty()) {
            bail!("Excluded extensions cannot be empty strings");
        }
        if self.search.important_files.iter().any(|f| f.is_empty()) {
            bail!("Important file names cannot be empty strings");
        }
        if !(1..=100).contains(&self.parallel.thread_percentage) {
            bail!(
                "parallel.thread_percentage must be between 1 and 100, got {}",
                self.parallel.thread_percentage
            );
        }

        for keyword in &self.search.keywords {
            if keyword.chars().any(char::is_whitespace) {
                tracing::warn!(
                    "Keyword '{}' contains whitespace and can only match with --substring",
                    keyword
                );
            }
        }

        Ok(())
    }

    /// Validate the keyword set a run will actually use
    pub fn validate_keywords(&self, single_keyword: Option<&str>) -> Result<()> {
        match single_keyword {
            Some("") => bail!("Keyword cannot be empty"),
            Some(_) => Ok(()),
            None if self.search.keywords.is_empty() => {
                bail!("No keywords configured; set search.keywords or pass --keyword")
            }
            None => Ok(()),
        }
    }
}
