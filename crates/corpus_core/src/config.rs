//! Project layout configuration.
//!
//! # Responsibility
//! - Resolve every on-disk location from a single project root.
//!
//! # Invariants
//! - All returned paths are absolute; the log directory in particular must
//!   satisfy `init_logging`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DB_RELATIVE_PATH: &str = "data/corpus/writing-corpus.db";
const RAW_ARTICLES_RELATIVE_DIR: &str = "data/raw/fc2_extracted";
const PROCESSED_RELATIVE_DIR: &str = "data/processed";
const DASHBOARD_RELATIVE_PATH: &str = "docs/dashboard.md";
const LOG_RELATIVE_DIR: &str = "logs";
const COMPARISONS_HOME_RELATIVE_PATH: &str = ".llms/article-comparisons.json";

/// Configuration error raised while resolving the project root.
#[derive(Debug)]
pub enum ConfigError {
    EmptyRoot,
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRoot => write!(f, "project root cannot be empty"),
            Self::CurrentDir(err) => write!(f, "failed to resolve working directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyRoot => None,
            Self::CurrentDir(err) => Some(err),
        }
    }
}

/// Resolved project layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    root: PathBuf,
    comparisons_path: PathBuf,
}

impl CorpusConfig {
    /// Builds a configuration rooted at `root`.
    ///
    /// Relative roots are resolved against the working directory. The
    /// comparisons file defaults to `~/.llms/article-comparisons.json`, or to
    /// the same relative path under the root when `HOME` is unset.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }

        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::CurrentDir)?
                .join(root)
        };

        let comparisons_path = std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| root.clone())
            .join(COMPARISONS_HOME_RELATIVE_PATH);

        Ok(Self {
            root,
            comparisons_path,
        })
    }

    /// Overrides the comparisons file location.
    pub fn with_comparisons_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.comparisons_path = if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        };
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(DB_RELATIVE_PATH)
    }

    /// Directory scanned by ingestion.
    pub fn raw_articles_dir(&self) -> PathBuf {
        self.root.join(RAW_ARTICLES_RELATIVE_DIR)
    }

    /// Directory receiving the bucket candidate lists.
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join(PROCESSED_RELATIVE_DIR)
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.root.join(DASHBOARD_RELATIVE_PATH)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_RELATIVE_DIR)
    }

    pub fn comparisons_path(&self) -> &Path {
        &self.comparisons_path
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CorpusConfig};
    use std::path::Path;

    #[test]
    fn derived_paths_live_under_root() {
        let config = CorpusConfig::new("/srv/corpus").unwrap();
        assert_eq!(
            config.db_path(),
            Path::new("/srv/corpus/data/corpus/writing-corpus.db")
        );
        assert_eq!(
            config.processed_dir(),
            Path::new("/srv/corpus/data/processed")
        );
        assert_eq!(
            config.dashboard_path(),
            Path::new("/srv/corpus/docs/dashboard.md")
        );
        assert_eq!(config.log_dir(), Path::new("/srv/corpus/logs"));
        assert!(config
            .comparisons_path()
            .ends_with(".llms/article-comparisons.json"));
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let config = CorpusConfig::new("corpus").unwrap();
        assert!(config.root().is_absolute());
        assert!(config.log_dir().is_absolute());
    }

    #[test]
    fn empty_root_is_rejected() {
        assert!(matches!(
            CorpusConfig::new(""),
            Err(ConfigError::EmptyRoot)
        ));
    }

    #[test]
    fn relative_comparisons_override_joins_root() {
        let config = CorpusConfig::new("/srv/corpus")
            .unwrap()
            .with_comparisons_path("fixtures/comparisons.json");
        assert_eq!(
            config.comparisons_path(),
            Path::new("/srv/corpus/fixtures/comparisons.json")
        );
    }
}
