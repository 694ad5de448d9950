//! Writing-pattern repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read the article bodies used as pattern-analysis input.
//! - Replace the `writing_patterns` table contents atomically.
//!
//! # Invariants
//! - `replace_patterns` deletes and inserts in a single transaction.
//! - Stored examples are separated by `EXAMPLE_SEPARATOR`.

use crate::model::article::ArticleId;
use crate::model::pattern::{PatternType, WritingPattern};
use crate::repo::article_repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, TransactionBehavior};

/// Separator between stored example contexts.
pub const EXAMPLE_SEPARATOR: &str = "\n---\n";

/// One article body selected for pattern analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSource {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
}

/// Repository interface for writing-pattern storage.
pub trait PatternRepository {
    /// Lists non-empty article bodies with `elo_rating >= min_elo`, best
    /// rated first.
    fn list_sources(&self, min_elo: i64, limit: u32) -> RepoResult<Vec<PatternSource>>;
    /// Replaces every stored pattern with `patterns`.
    fn replace_patterns(&mut self, patterns: &[WritingPattern]) -> RepoResult<()>;
    fn list_patterns(&self) -> RepoResult<Vec<WritingPattern>>;
}

/// SQLite-backed writing-pattern repository.
pub struct SqlitePatternRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePatternRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PatternRepository for SqlitePatternRepository<'_> {
    fn list_sources(&self, min_elo: i64, limit: u32) -> RepoResult<Vec<PatternSource>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content
             FROM articles
             WHERE elo_rating >= ?1
               AND content IS NOT NULL
               AND content != ''
             ORDER BY elo_rating DESC, id ASC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![min_elo, i64::from(limit)])?;
        let mut sources = Vec::new();
        while let Some(row) = rows.next()? {
            sources.push(PatternSource {
                id: row.get("id")?,
                title: row.get("title")?,
                content: row.get("content")?,
            });
        }
        Ok(sources)
    }

    fn replace_patterns(&mut self, patterns: &[WritingPattern]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM writing_patterns;", [])?;
        for pattern in patterns {
            tx.execute(
                "INSERT INTO writing_patterns (
                    pattern_type,
                    pattern_name,
                    pattern,
                    examples,
                    occurrences
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    pattern.pattern_type.as_str(),
                    pattern.pattern_name.as_str(),
                    pattern.pattern.as_str(),
                    pattern.examples.join(EXAMPLE_SEPARATOR),
                    pattern.occurrences,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn list_patterns(&self) -> RepoResult<Vec<WritingPattern>> {
        let mut stmt = self.conn.prepare(
            "SELECT pattern_type, pattern_name, pattern, examples, occurrences
             FROM writing_patterns
             ORDER BY pattern_type ASC, occurrences DESC, pattern_name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut patterns = Vec::new();
        while let Some(row) = rows.next()? {
            let type_text: String = row.get("pattern_type")?;
            let pattern_type = PatternType::parse(&type_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid pattern type `{type_text}` in writing_patterns.pattern_type"
                ))
            })?;
            let examples_text: String = row.get("examples")?;
            let examples = if examples_text.is_empty() {
                Vec::new()
            } else {
                examples_text
                    .split(EXAMPLE_SEPARATOR)
                    .map(str::to_string)
                    .collect()
            };
            patterns.push(WritingPattern {
                pattern_type,
                pattern_name: row.get("pattern_name")?,
                pattern: row.get("pattern")?,
                examples,
                occurrences: row.get("occurrences")?,
            });
        }
        Ok(patterns)
    }
}
