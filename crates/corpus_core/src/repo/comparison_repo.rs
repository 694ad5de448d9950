//! ELO comparison history repository.
//!
//! # Responsibility
//! - Record pairwise comparisons imported from the evaluation tool.
//! - Summarize the ELO rating distribution of the corpus.
//!
//! # Invariants
//! - A `(article_a, article_b)` pair is recorded at most once by the sync
//!   path; callers check `comparison_exists` first.

use crate::repo::article_repo::{ensure_connection_ready, RepoResult};
use rusqlite::{params, Connection};
use serde::Serialize;

/// Ratings at or above this mark reference-article candidates.
pub const HIGH_ELO: i64 = 1550;
/// Ratings at or above this (and below `HIGH_ELO`) are worth reusing.
pub const MEDIUM_ELO: i64 = 1520;

/// One pairwise comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EloComparison {
    pub article_a: String,
    pub article_b: String,
    pub winner: Option<String>,
    pub context: String,
    pub confidence: String,
}

/// ELO distribution across all articles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EloDistribution {
    pub total: u64,
    pub avg_elo: Option<f64>,
    pub min_elo: Option<i64>,
    pub max_elo: Option<i64>,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Repository interface for comparison history.
pub trait ComparisonRepository {
    fn comparison_exists(&self, article_a: &str, article_b: &str) -> RepoResult<bool>;
    fn insert_comparison(&self, comparison: &EloComparison) -> RepoResult<()>;
    fn count_comparisons(&self) -> RepoResult<u64>;
    fn elo_distribution(&self) -> RepoResult<EloDistribution>;
}

/// SQLite-backed comparison repository.
pub struct SqliteComparisonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteComparisonRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ComparisonRepository for SqliteComparisonRepository<'_> {
    fn comparison_exists(&self, article_a: &str, article_b: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM elo_comparisons
                WHERE article_a = ?1 AND article_b = ?2
            );",
            params![article_a, article_b],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_comparison(&self, comparison: &EloComparison) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO elo_comparisons (article_a, article_b, winner, context, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                comparison.article_a.as_str(),
                comparison.article_b.as_str(),
                comparison.winner.as_deref(),
                comparison.context.as_str(),
                comparison.confidence.as_str(),
            ],
        )?;
        Ok(())
    }

    fn count_comparisons(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM elo_comparisons;", [], |row| row.get(0))?;
        Ok(count.max(0).unsigned_abs())
    }

    fn elo_distribution(&self) -> RepoResult<EloDistribution> {
        let distribution = self.conn.query_row(
            "SELECT
                COUNT(*) AS total,
                AVG(elo_rating) AS avg_elo,
                MIN(elo_rating) AS min_elo,
                MAX(elo_rating) AS max_elo,
                COUNT(CASE WHEN elo_rating >= ?1 THEN 1 END) AS high,
                COUNT(CASE WHEN elo_rating >= ?2 AND elo_rating < ?1 THEN 1 END) AS medium,
                COUNT(CASE WHEN elo_rating < ?2 THEN 1 END) AS low
             FROM articles;",
            params![HIGH_ELO, MEDIUM_ELO],
            |row| {
                Ok(EloDistribution {
                    total: row.get::<_, i64>("total")?.unsigned_abs(),
                    avg_elo: row.get("avg_elo")?,
                    min_elo: row.get("min_elo")?,
                    max_elo: row.get("max_elo")?,
                    high: row.get::<_, i64>("high")?.unsigned_abs(),
                    medium: row.get::<_, i64>("medium")?.unsigned_abs(),
                    low: row.get::<_, i64>("low")?.unsigned_abs(),
                })
            },
        )?;
        Ok(distribution)
    }
}
