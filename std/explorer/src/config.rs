//! Startup configuration for the explorer server.

use std::path::PathBuf;

/// Directories the server is allowed to expose, as given at startup.
///
/// Paths are canonicalized later by [`crate::sandbox::PathSandbox::new`];
/// this type only records the caller's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    pub roots: Vec<PathBuf>,
}

impl ExplorerConfig {
    /// Use the given directories, falling back to [`Self::default_roots`]
    /// when the list is empty.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        if roots.is_empty() {
            Self::default()
        } else {
            Self { roots }
        }
    }

    /// The documents directory, the home directory and the current working
    /// directory, in that order. Entries the platform cannot provide are
    /// skipped.
    pub fn default_roots() -> Vec<PathBuf> {
        [
            dirs::document_dir(),
            dirs::home_dir(),
            std::env::current_dir().ok(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            roots: Self::default_roots(),
        }
    }
}
