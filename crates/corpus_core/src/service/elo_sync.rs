//! ELO rating import from the pairwise evaluation tool.
//!
//! # Responsibility
//! - Load the evaluation tool's comparisons file.
//! - Copy ratings onto corpus articles and record new comparisons.
//!
//! # Invariants
//! - Only ids starting with `ARTICLE_ID_PREFIX` are considered.
//! - A comparison pair already stored is never inserted again.
//! - A sync either commits completely or not at all; dry runs never write.

use crate::model::article::DEFAULT_ELO_RATING;
use crate::repo::article_repo::{ArticleRepository, RepoError, SqliteArticleRepository};
use crate::repo::comparison_repo::{
    ComparisonRepository, EloComparison, SqliteComparisonRepository,
};
use crate::service::ingest::ARTICLE_ID_PREFIX;
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIDENCE: &str = "medium";

/// ELO sync error.
#[derive(Debug)]
pub enum SyncError {
    /// The comparisons file does not exist yet.
    MissingFile(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Repo(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile(path) => {
                write!(f, "comparisons file not found: {}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse `{}`: {source}", path.display())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingFile(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Contents of the evaluation tool's comparisons file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComparisonsFile {
    #[serde(default)]
    pub ratings: BTreeMap<String, RatingEntry>,
    #[serde(default)]
    pub comparisons: Vec<ComparisonEntry>,
}

/// Current rating of one article.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    #[serde(default = "default_elo")]
    pub elo: f64,
    #[serde(default)]
    pub comparison_count: u32,
}

/// One recorded pairwise judgement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    #[serde(default)]
    pub article_a: String,
    #[serde(default)]
    pub article_b: String,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_confidence")]
    pub confidence: String,
}

fn default_elo() -> f64 {
    DEFAULT_ELO_RATING as f64
}

fn default_confidence() -> String {
    DEFAULT_CONFIDENCE.to_string()
}

/// One applied (or, in a dry run, planned) rating change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingChange {
    pub id: String,
    pub old_elo: i64,
    pub new_elo: i64,
    pub comparison_count: u32,
}

/// Tally of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub updated: Vec<RatingChange>,
    /// Rated ids with no matching article.
    pub missing: Vec<String>,
    /// Comparisons involving at least one corpus article.
    pub comparisons_considered: usize,
    pub comparisons_inserted: usize,
}

/// Reads and parses a comparisons file.
pub fn load_comparisons(path: &Path) -> Result<ComparisonsFile, SyncError> {
    if !path.exists() {
        return Err(SyncError::MissingFile(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SyncError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies ratings and comparisons to the store.
///
/// With `dry_run` the report lists what would change and nothing is written.
pub fn sync_elo(
    conn: &mut Connection,
    data: &ComparisonsFile,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    info!("event=elo_sync module=elo status=start dry_run={dry_run}");

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut report = SyncReport {
        dry_run,
        ..SyncReport::default()
    };

    {
        let articles = SqliteArticleRepository::try_new(&tx)?;
        for (id, rating) in &data.ratings {
            if !id.starts_with(ARTICLE_ID_PREFIX) {
                continue;
            }
            let Some(article) = articles.get_article(id)? else {
                warn!("event=elo_sync module=elo status=missing id={id}");
                report.missing.push(id.clone());
                continue;
            };

            let new_elo = rating.elo.round() as i64;
            if !dry_run {
                articles.set_elo_rating(id, new_elo)?;
            }
            report.updated.push(RatingChange {
                id: id.clone(),
                old_elo: article.elo_rating,
                new_elo,
                comparison_count: rating.comparison_count,
            });
        }

        let comparisons = SqliteComparisonRepository::try_new(&tx)?;
        let mut planned = HashSet::new();
        for entry in &data.comparisons {
            if !entry.article_a.starts_with(ARTICLE_ID_PREFIX)
                && !entry.article_b.starts_with(ARTICLE_ID_PREFIX)
            {
                continue;
            }
            report.comparisons_considered += 1;

            let pair = (entry.article_a.as_str(), entry.article_b.as_str());
            if planned.contains(&pair) || comparisons.comparison_exists(pair.0, pair.1)? {
                continue;
            }
            planned.insert(pair);

            if !dry_run {
                comparisons.insert_comparison(&EloComparison {
                    article_a: entry.article_a.clone(),
                    article_b: entry.article_b.clone(),
                    winner: entry.winner.clone(),
                    context: entry.context.clone(),
                    confidence: entry.confidence.clone(),
                })?;
            }
            report.comparisons_inserted += 1;
        }
    }

    if dry_run {
        tx.rollback()?;
    } else {
        tx.commit()?;
    }

    info!(
        "event=elo_sync module=elo status=ok dry_run={} updated={} missing={} comparisons_inserted={}",
        dry_run,
        report.updated.len(),
        report.missing.len(),
        report.comparisons_inserted
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::ComparisonsFile;

    #[test]
    fn comparisons_file_uses_camel_case_keys_and_defaults() {
        let data: ComparisonsFile = serde_json::from_str(
            r#"{
                "ratings": {
                    "fc2_2008-01-01_001": {"elo": 1532.6, "comparisonCount": 4},
                    "note_abc": {}
                },
                "comparisons": [
                    {"articleA": "fc2_2008-01-01_001", "articleB": "note_abc", "winner": "fc2_2008-01-01_001"}
                ]
            }"#,
        )
        .unwrap();

        let rating = &data.ratings["fc2_2008-01-01_001"];
        assert_eq!(rating.comparison_count, 4);
        assert!((rating.elo - 1532.6).abs() < f64::EPSILON);
        assert!((data.ratings["note_abc"].elo - 1500.0).abs() < f64::EPSILON);

        let comparison = &data.comparisons[0];
        assert_eq!(comparison.article_b, "note_abc");
        assert_eq!(comparison.context, "");
        assert_eq!(comparison.confidence, "medium");
    }

    #[test]
    fn empty_object_is_an_empty_file() {
        let data: ComparisonsFile = serde_json::from_str("{}").unwrap();
        assert!(data.ratings.is_empty());
        assert!(data.comparisons.is_empty());
    }
}
