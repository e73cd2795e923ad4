//! Configuration snapshot uploaded with a run.

use std::path::{Path, PathBuf};

/// Files found in the configuration directory, relative to `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl ConfigSnapshot {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, mut files: Vec<PathBuf>) -> Self {
        files.sort();
        Self {
            dir: dir.into(),
            files,
        }
    }

    /// A snapshot with no files, used for destroy runs without configuration.
    #[must_use]
    pub fn empty(dir: &Path) -> Self {
        Self::new(dir, Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
