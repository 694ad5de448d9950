//! Corpus statistics read from the statistics views.
//!
//! # Responsibility
//! - Aggregate status, bucket, year and category counts for reporting.
//!
//! # Invariants
//! - Bucket counts use the same 70/50/30 thresholds as the classifier.

use crate::model::article::RewriteStatus;
use crate::model::scores::{Bucket, RewriteType};
use crate::repo::article_repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::Connection;
use serde::Serialize;

/// Article count and average score for one publication year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStat {
    pub year: Option<i32>,
    pub count: u64,
    pub avg_rewrite_score: Option<f64>,
}

/// Article count and averages for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    /// `None` for uncategorized articles.
    pub category: Option<String>,
    pub count: u64,
    pub avg_rewrite_score: Option<f64>,
    pub avg_word_count: Option<f64>,
}

/// Whole-corpus snapshot used by the dashboard and the `stats` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStatistics {
    pub total: u64,
    /// Every status in canonical order, including zero counts.
    pub by_status: Vec<(RewriteStatus, u64)>,
    /// Every bucket in canonical order, including zero counts.
    pub by_bucket: Vec<(Bucket, u64)>,
    pub by_rewrite_type: Vec<(RewriteType, u64)>,
    pub unscored: u64,
    pub by_year: Vec<YearStat>,
    /// Sorted by count descending.
    pub by_category: Vec<CategoryStat>,
    pub avg_elo: Option<f64>,
    pub sampled: u64,
    pub reference: u64,
}

impl CorpusStatistics {
    pub fn status_count(&self, status: RewriteStatus) -> u64 {
        self.by_status
            .iter()
            .find(|(candidate, _)| *candidate == status)
            .map_or(0, |(_, count)| *count)
    }

    pub fn bucket_count(&self, bucket: Bucket) -> u64 {
        self.by_bucket
            .iter()
            .find(|(candidate, _)| *candidate == bucket)
            .map_or(0, |(_, count)| *count)
    }
}

/// Loads the corpus statistics snapshot.
pub fn load_statistics(conn: &Connection) -> RepoResult<CorpusStatistics> {
    ensure_connection_ready(conn)?;

    let mut stats = conn.query_row(
        "SELECT
            total,
            pending,
            in_progress,
            completed,
            deleted,
            archived,
            rewrite_candidates,
            review_candidates,
            archive_candidates,
            deletion_candidates,
            avg_elo,
            sampled_count,
            reference_count
         FROM v_statistics;",
        [],
        |row| {
            let count = |name: &str| row.get::<_, i64>(name).map(i64::unsigned_abs);
            Ok(CorpusStatistics {
                total: count("total")?,
                by_status: vec![
                    (RewriteStatus::Pending, count("pending")?),
                    (RewriteStatus::InProgress, count("in_progress")?),
                    (RewriteStatus::Completed, count("completed")?),
                    (RewriteStatus::Deleted, count("deleted")?),
                    (RewriteStatus::Archived, count("archived")?),
                ],
                by_bucket: vec![
                    (Bucket::Rewrite, count("rewrite_candidates")?),
                    (Bucket::Review, count("review_candidates")?),
                    (Bucket::Archive, count("archive_candidates")?),
                    (Bucket::Deletion, count("deletion_candidates")?),
                ],
                by_rewrite_type: Vec::new(),
                unscored: 0,
                by_year: Vec::new(),
                by_category: Vec::new(),
                avg_elo: row.get("avg_elo")?,
                sampled: count("sampled_count")?,
                reference: count("reference_count")?,
            })
        },
    )?;

    let scored: u64 = stats.by_bucket.iter().map(|(_, count)| count).sum();
    stats.unscored = stats.total.saturating_sub(scored);
    stats.by_rewrite_type = load_rewrite_type_counts(conn)?;
    stats.by_year = load_year_stats(conn)?;
    stats.by_category = load_category_stats(conn)?;

    Ok(stats)
}

fn load_rewrite_type_counts(conn: &Connection) -> RepoResult<Vec<(RewriteType, u64)>> {
    let mut stmt = conn.prepare(
        "SELECT rewrite_type, COUNT(*) AS count
         FROM articles
         WHERE rewrite_type IS NOT NULL
         GROUP BY rewrite_type
         ORDER BY count DESC, rewrite_type ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut counts = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get("rewrite_type")?;
        let rewrite_type = RewriteType::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid rewrite type `{value}` in articles.rewrite_type"
            ))
        })?;
        counts.push((rewrite_type, row.get::<_, i64>("count")?.unsigned_abs()));
    }
    Ok(counts)
}

fn load_year_stats(conn: &Connection) -> RepoResult<Vec<YearStat>> {
    let mut stmt = conn.prepare("SELECT year, count, avg_rewrite_score FROM v_year_stats;")?;
    let years = stmt
        .query_map([], |row| {
            Ok(YearStat {
                year: row.get("year")?,
                count: row.get::<_, i64>("count")?.unsigned_abs(),
                avg_rewrite_score: row.get("avg_rewrite_score")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(years)
}

fn load_category_stats(conn: &Connection) -> RepoResult<Vec<CategoryStat>> {
    let mut stmt = conn.prepare(
        "SELECT category, count, avg_rewrite_score, avg_word_count FROM v_category_stats;",
    )?;
    let categories = stmt
        .query_map([], |row| {
            Ok(CategoryStat {
                category: row.get("category")?,
                count: row.get::<_, i64>("count")?.unsigned_abs(),
                avg_rewrite_score: row.get("avg_rewrite_score")?,
                avg_word_count: row.get("avg_word_count")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}
