//! # pickaxe
//!
//! Keyword search across every text surface of a git repository: tracked
//! files, commit messages, commit diffs and the diffs against each
//! remote-tracking branch. Important files such as `.env` or private keys are
//! flagged wherever they appear. A standalone mode searches a plain directory.
//!
//! ## Quick Start
//!
//! ```bash
//! # Search the repository in the current directory with the default keywords
//! pickaxe .
//!
//! # Substring matching for one keyword across full history of a remote
//! pickaxe -s -d -k password https://github.com/user/repo.git
//!
//! # Any directory, no git required
//! pickaxe --not-repo ~/projects/legacy
//! ```

pub mod cli;
pub mod config;
pub mod git;
pub mod parallel;
pub mod scanner;
pub mod shared;

pub use cli::Cli;
pub use config::PickaxeConfig;

/// Result type alias for pickaxe operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
