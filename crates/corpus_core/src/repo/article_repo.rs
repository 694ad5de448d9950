//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the corpus store adapter used by scoring, ingestion and
//!   sampling.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Article::validate()` before SQL mutations.
//! - `persist_scores` overwrites every scoring column; nothing accumulates.
//! - `upsert_article` never touches scoring, ELO or workflow columns.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::article::{Article, ArticleId, ArticleValidationError, RewriteStatus};
use crate::model::scores::{Axis, AxisScores, Bucket, RewriteType};
use crate::scoring::pipeline::{ScoreCard, ScoringInput};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    title,
    date,
    year,
    category,
    word_count,
    file_path,
    content,
    quality_score,
    elo_rating,
    sampled,
    reference_article,
    rewrite_status,
    rewrite_score,
    rewrite_type,
    rewrite_bucket,
    score_timeliness,
    score_universality,
    score_entertainment,
    score_rewrite_effort,
    score_risk
FROM articles";

const SCORING_ROW_SELECT_SQL: &str = "SELECT
    id,
    title,
    category,
    year,
    word_count
FROM articles";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for corpus persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ArticleValidationError),
    Db(DbError),
    NotFound(ArticleId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "article not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted article data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ArticleValidationError> for RepoError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Category filter for list queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    Any,
    /// Only articles with no category.
    Uncategorized,
    /// Exact category match as stored.
    Named(String),
}

/// Sort key for list queries. Sorting is always descending with `id ASC`
/// as tie-breaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArticleOrder {
    #[default]
    RewriteScore,
    EloRating,
    WordCount,
    Date,
    Year,
}

impl ArticleOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "rewrite_score" => Some(Self::RewriteScore),
            "elo_rating" => Some(Self::EloRating),
            "word_count" => Some(Self::WordCount),
            "date" => Some(Self::Date),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::RewriteScore => "rewrite_score",
            Self::EloRating => "elo_rating",
            Self::WordCount => "word_count",
            Self::Date => "date",
            Self::Year => "year",
        }
    }
}

/// Query options for listing articles.
#[derive(Debug, Clone, Default)]
pub struct ArticleListQuery {
    pub category: CategoryFilter,
    pub min_rewrite_score: Option<u32>,
    pub min_quality_score: Option<f64>,
    pub min_elo: Option<i64>,
    pub rewrite_type: Option<RewriteType>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub order_by: ArticleOrder,
    pub limit: Option<u32>,
}

/// Input columns of one article, read without its stored scores.
///
/// Lets a full re-score overwrite rows whose score columns are damaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRow {
    pub id: ArticleId,
    pub title: String,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub word_count: Option<u32>,
}

impl<'a> From<&'a ScoringRow> for ScoringInput<'a> {
    fn from(row: &'a ScoringRow) -> Self {
        Self {
            title: row.title.as_str(),
            category: row.category.as_deref(),
            year: row.year,
            word_count: row.word_count,
        }
    }
}

/// Corpus store adapter.
pub trait ArticleRepository {
    /// Inserts a new article or refreshes its descriptive fields.
    fn upsert_article(&self, article: &Article) -> RepoResult<()>;
    fn get_article(&self, id: &str) -> RepoResult<Option<Article>>;
    /// Fetches the given articles in one query, ordered by id.
    ///
    /// Unknown ids are skipped.
    fn get_articles(&self, ids: &[ArticleId]) -> RepoResult<Vec<Article>>;
    /// Loads every article ordered by id.
    fn load_all(&self) -> RepoResult<Vec<Article>>;
    /// Loads the scoring inputs of every article ordered by id.
    fn load_scoring_rows(&self) -> RepoResult<Vec<ScoringRow>>;
    fn get_scoring_row(&self, id: &str) -> RepoResult<Option<ScoringRow>>;
    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>>;
    /// Lists every article id in ascending order.
    fn list_ids(&self) -> RepoResult<Vec<ArticleId>>;
    /// Lists distinct stored categories; `None` stands for uncategorized.
    fn list_categories(&self) -> RepoResult<Vec<Option<String>>>;
    /// Overwrites all scoring columns of one article.
    fn persist_scores(&self, id: &str, card: &ScoreCard) -> RepoResult<()>;
    fn set_elo_rating(&self, id: &str, rating: i64) -> RepoResult<()>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Rejects connections whose schema is not at the latest version.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn upsert_article(&self, article: &Article) -> RepoResult<()> {
        article.validate()?;

        self.conn.execute(
            "INSERT INTO articles (
                id,
                title,
                date,
                year,
                category,
                word_count,
                file_path,
                content,
                quality_score,
                elo_rating,
                sampled,
                reference_article,
                rewrite_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                date = excluded.date,
                year = excluded.year,
                category = excluded.category,
                word_count = excluded.word_count,
                file_path = excluded.file_path,
                content = excluded.content,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                article.id.as_str(),
                article.title.as_str(),
                article.date.as_str(),
                article.year,
                article.category.as_deref(),
                article.word_count,
                article.file_path.as_str(),
                article.content.as_deref(),
                article.quality_score,
                article.elo_rating,
                bool_to_int(article.sampled),
                bool_to_int(article.reference_article),
                article.rewrite_status.as_str(),
            ],
        )?;

        Ok(())
    }

    fn get_article(&self, id: &str) -> RepoResult<Option<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_row(row)?));
        }

        Ok(None)
    }

    fn get_articles(&self, ids: &[ArticleId]) -> RepoResult<Vec<Article>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "{ARTICLE_SELECT_SQL} WHERE id IN ({placeholders}) ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(ids.iter()))?;
        let mut articles = Vec::with_capacity(ids.len());

        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }

    fn load_all(&self) -> RepoResult<Vec<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTICLE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut articles = Vec::new();

        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }

    fn load_scoring_rows(&self) -> RepoResult<Vec<ScoringRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCORING_ROW_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut scoring_rows = Vec::new();

        while let Some(row) = rows.next()? {
            scoring_rows.push(parse_scoring_row(row)?);
        }

        Ok(scoring_rows)
    }

    fn get_scoring_row(&self, id: &str) -> RepoResult<Option<ScoringRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCORING_ROW_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_scoring_row(row)?));
        }

        Ok(None)
    }

    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>> {
        let mut sql = format!("{ARTICLE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match &query.category {
            CategoryFilter::Any => {}
            CategoryFilter::Uncategorized => sql.push_str(" AND category IS NULL"),
            CategoryFilter::Named(category) => {
                sql.push_str(" AND category = ?");
                bind_values.push(Value::Text(category.clone()));
            }
        }

        if let Some(min_score) = query.min_rewrite_score {
            sql.push_str(" AND rewrite_score >= ?");
            bind_values.push(Value::Integer(i64::from(min_score)));
        }

        if let Some(min_quality) = query.min_quality_score {
            sql.push_str(" AND quality_score >= ?");
            bind_values.push(Value::Real(min_quality));
        }

        if let Some(min_elo) = query.min_elo {
            sql.push_str(" AND elo_rating >= ?");
            bind_values.push(Value::Integer(min_elo));
        }

        if let Some(rewrite_type) = query.rewrite_type {
            sql.push_str(" AND rewrite_type = ?");
            bind_values.push(Value::Text(rewrite_type.as_str().to_string()));
        }

        if let Some(year_from) = query.year_from {
            sql.push_str(" AND year >= ?");
            bind_values.push(Value::Integer(i64::from(year_from)));
        }

        if let Some(year_to) = query.year_to {
            sql.push_str(" AND year <= ?");
            bind_values.push(Value::Integer(i64::from(year_to)));
        }

        sql.push_str(&format!(
            " ORDER BY {} DESC, id ASC",
            query.order_by.column()
        ));

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut articles = Vec::new();

        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }

    fn list_ids(&self) -> RepoResult<Vec<ArticleId>> {
        let mut stmt = self.conn.prepare("SELECT id FROM articles ORDER BY id ASC;")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn list_categories(&self) -> RepoResult<Vec<Option<String>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM articles ORDER BY category ASC;")?;
        let categories = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn persist_scores(&self, id: &str, card: &ScoreCard) -> RepoResult<()> {
        let axes = &card.axes;
        let changed = self.conn.execute(
            "UPDATE articles
             SET
                score_timeliness = ?1,
                score_universality = ?2,
                score_entertainment = ?3,
                score_rewrite_effort = ?4,
                score_risk = ?5,
                rewrite_score = ?6,
                rewrite_type = ?7,
                rewrite_bucket = ?8,
                scored_at = (strftime('%s', 'now') * 1000),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?9;",
            params![
                axes.get(Axis::Timeliness),
                axes.get(Axis::Universality),
                axes.get(Axis::Entertainment),
                axes.get(Axis::RewriteEffort),
                axes.get(Axis::Risk),
                card.composite,
                card.rewrite_type.map(RewriteType::as_str),
                card.bucket().as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn set_elo_rating(&self, id: &str, rating: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE articles
             SET
                elo_rating = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![rating, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

/// Rejects connections that did not go through `open_db*` bootstrap.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let version = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
        .map_err(RepoError::from)?;
    if version != latest_version() {
        return Err(RepoError::InvalidData(format!(
            "connection schema version {version} is not migrated to {}",
            latest_version()
        )));
    }
    Ok(())
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let id: String = row.get("id")?;

    let status_text: String = row.get("rewrite_status")?;
    let rewrite_status = RewriteStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid rewrite status `{status_text}` in articles.rewrite_status"
        ))
    })?;

    let rewrite_type = match row.get::<_, Option<String>>("rewrite_type")? {
        Some(value) => Some(RewriteType::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid rewrite type `{value}` in articles.rewrite_type"
            ))
        })?),
        None => None,
    };

    let rewrite_bucket = match row.get::<_, Option<String>>("rewrite_bucket")? {
        Some(value) => Some(Bucket::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid bucket `{value}` in articles.rewrite_bucket"
            ))
        })?),
        None => None,
    };

    let article = Article {
        title: row.get("title")?,
        date: row.get("date")?,
        year: row.get("year")?,
        category: row.get("category")?,
        word_count: optional_u32(row, "word_count")?,
        file_path: row.get("file_path")?,
        content: row.get("content")?,
        quality_score: row.get("quality_score")?,
        elo_rating: row.get("elo_rating")?,
        sampled: int_to_bool(row, "sampled")?,
        reference_article: int_to_bool(row, "reference_article")?,
        rewrite_status,
        rewrite_score: optional_u32(row, "rewrite_score")?,
        rewrite_type,
        axis_scores: parse_axis_scores(row, &id)?,
        rewrite_bucket,
        id,
    };
    article.validate()?;
    Ok(article)
}

fn parse_scoring_row(row: &Row<'_>) -> RepoResult<ScoringRow> {
    Ok(ScoringRow {
        id: row.get("id")?,
        title: row.get("title")?,
        category: row.get("category")?,
        year: row.get("year")?,
        word_count: optional_u32(row, "word_count")?,
    })
}

fn parse_axis_scores(row: &Row<'_>, id: &str) -> RepoResult<Option<AxisScores>> {
    let values = [
        optional_u32(row, "score_timeliness")?,
        optional_u32(row, "score_universality")?,
        optional_u32(row, "score_entertainment")?,
        optional_u32(row, "score_rewrite_effort")?,
        optional_u32(row, "score_risk")?,
    ];

    match values {
        [None, None, None, None, None] => Ok(None),
        [Some(t), Some(u), Some(e), Some(r), Some(risk)] => AxisScores::checked(t, u, e, r, risk)
            .map(Some)
            .ok_or_else(|| {
                RepoError::InvalidData(format!("axis score out of range for article `{id}`"))
            }),
        _ => Err(RepoError::InvalidData(format!(
            "partially persisted axis scores for article `{id}`"
        ))),
    }
}

fn optional_u32(row: &Row<'_>, column: &str) -> RepoResult<Option<u32>> {
    match row.get::<_, Option<i64>>(column)? {
        Some(value) => u32::try_from(value).map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid value `{value}` in articles.{column}"))
        }),
        None => Ok(None),
    }
}

fn int_to_bool(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in articles.{column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
