//! Path filters applied before any content is read
//!
//! Both are pure: no I/O and no error conditions.

use std::collections::HashSet;
use std::path::Path;

/// Extension denylist deciding which files are eligible for content search
///
/// A path is eligible iff `include_all` is set or none of the excluded
/// suffixes matches the end of the path. Suffixes are compared literally, so
/// `.min.js` and `.lock` work as well as plain extensions.
#[derive(Debug, Clone, Default)]
pub struct InclusionPolicy {
    excluded_extensions: Vec<String>,
    include_all: bool,
}

impl InclusionPolicy {
    pub fn new(excluded_extensions: Vec<String>, include_all: bool) -> Self {
        Self {
            excluded_extensions,
            include_all,
        }
    }

    /// Whether the path may be searched for content
    pub fn eligible(&self, path: &Path) -> bool {
        if self.include_all {
            return true;
        }
        let path = path.to_string_lossy();
        !self
            .excluded_extensions
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }
}

/// Fixed set of base filenames worth flagging wherever they appear
#[derive(Debug, Clone, Default)]
pub struct ImportantNames {
    names: HashSet<String>,
}

impl ImportantNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-sensitive exact comparison of the final path component
    pub fn is_important(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.names.contains(name))
    }
}
