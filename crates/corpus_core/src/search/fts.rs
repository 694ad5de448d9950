//! SQLite FTS5-based article search.
//!
//! # Responsibility
//! - Provide keyword search over article title, category and body.
//! - Return typed hits with stable article IDs.
//!
//! # Invariants
//! - Result ordering is deterministic by rank and article id.
//! - Terms shorter than the trigram width are matched with `LIKE` instead of
//!   the FTS index, so two-character Japanese words still hit.

use crate::db::DbError;
use crate::model::article::ArticleId;
use crate::repo::article_repo::CategoryFilter;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Shortest term the trigram tokenizer can match.
const TRIGRAM_WIDTH: usize = 3;
/// Characters kept on each side of a `LIKE` match in snippets.
const LIKE_SNIPPET_RADIUS: usize = 20;

/// Search-layer error for query parsing, DB interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    /// User-provided query cannot be parsed by FTS5 syntax.
    InvalidQuery {
        query: String,
        message: String,
    },
    Db(DbError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery { .. } => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Search options for full-text query behavior.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// User query text. Whitespace-separated terms are AND-ed.
    pub text: String,
    pub category: CategoryFilter,
    /// Maximum number of hits to return.
    pub limit: u32,
    /// Whether to pass text directly as raw FTS5 expression.
    ///
    /// Default is `false` so stray quotes or operators never fail a search.
    pub raw_fts_syntax: bool,
}

impl SearchQuery {
    /// Creates a query with default pagination and no category filter.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: CategoryFilter::Any,
            limit: 20,
            raw_fts_syntax: false,
        }
    }
}

/// Single search hit returned by [`search_articles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub article_id: ArticleId,
    pub title: String,
    /// Matched context with hits wrapped in `[` and `]`.
    pub snippet: String,
}

/// Searches articles and returns ranked results.
///
/// Returns an empty list for blank queries or a zero limit.
pub fn search_articles(conn: &Connection, query: &SearchQuery) -> SearchResult<Vec<SearchHit>> {
    let text = query.text.trim();
    if text.is_empty() || query.limit == 0 {
        return Ok(Vec::new());
    }

    let terms = text.split_whitespace().collect::<Vec<_>>();
    let needs_like = !query.raw_fts_syntax
        && terms
            .iter()
            .any(|term| term.chars().count() < TRIGRAM_WIDTH);

    if needs_like {
        search_with_like(conn, query, &terms)
    } else {
        let match_expr = if query.raw_fts_syntax {
            text.to_string()
        } else {
            terms
                .iter()
                .map(|term| escape_fts_term(term))
                .collect::<Vec<_>>()
                .join(" AND ")
        };
        search_with_fts(conn, query, &match_expr)
    }
}

fn search_with_fts(
    conn: &Connection,
    query: &SearchQuery,
    match_expr: &str,
) -> SearchResult<Vec<SearchHit>> {
    let mut sql = String::from(
        "SELECT
            articles.id AS id,
            articles.title AS title,
            snippet(articles_fts, -1, '[', ']', ' ... ', 10) AS snippet
         FROM articles_fts
         JOIN articles ON articles.rowid = articles_fts.rowid
         WHERE articles_fts MATCH ?",
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(match_expr.to_string())];

    push_category_filter(&mut sql, &mut bind_values, &query.category);

    sql.push_str(" ORDER BY bm25(articles_fts), articles.id ASC LIMIT ?");
    bind_values.push(Value::Integer(i64::from(query.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query(params_from_iter(bind_values))
        .map_err(|err| map_query_error(err, match_expr))?;
    let mut hits = Vec::new();

    while let Some(row) = rows
        .next()
        .map_err(|err| map_query_error(err, match_expr))?
    {
        hits.push(parse_search_hit(row)?);
    }

    Ok(hits)
}

fn search_with_like(
    conn: &Connection,
    query: &SearchQuery,
    terms: &[&str],
) -> SearchResult<Vec<SearchHit>> {
    let mut sql = String::from(
        "SELECT
            articles.id AS id,
            articles.title AS title,
            COALESCE(articles.content, '') AS content
         FROM articles
         WHERE 1 = 1",
    );
    let mut bind_values: Vec<Value> = Vec::new();

    for term in terms {
        sql.push_str(
            " AND (articles.title LIKE ? ESCAPE '\\'
                OR articles.category LIKE ? ESCAPE '\\'
                OR articles.content LIKE ? ESCAPE '\\')",
        );
        let pattern = format!("%{}%", escape_like_term(term));
        for _ in 0..3 {
            bind_values.push(Value::Text(pattern.clone()));
        }
    }

    push_category_filter(&mut sql, &mut bind_values, &query.category);

    sql.push_str(" ORDER BY articles.rewrite_score DESC, articles.id ASC LIMIT ?");
    bind_values.push(Value::Integer(i64::from(query.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut hits = Vec::new();

    while let Some(row) = rows.next()? {
        let title: String = row.get("title")?;
        let content: String = row.get("content")?;
        let snippet = like_snippet(&content, terms)
            .or_else(|| like_snippet(&title, terms))
            .unwrap_or_else(|| title.clone());
        hits.push(SearchHit {
            article_id: row.get("id")?,
            title,
            snippet,
        });
    }

    Ok(hits)
}

fn push_category_filter(sql: &mut String, bind_values: &mut Vec<Value>, filter: &CategoryFilter) {
    match filter {
        CategoryFilter::Any => {}
        CategoryFilter::Uncategorized => sql.push_str(" AND articles.category IS NULL"),
        CategoryFilter::Named(category) => {
            sql.push_str(" AND articles.category = ?");
            bind_values.push(Value::Text(category.clone()));
        }
    }
}

fn parse_search_hit(row: &Row<'_>) -> SearchResult<SearchHit> {
    Ok(SearchHit {
        article_id: row.get("id")?,
        title: row.get("title")?,
        snippet: row.get("snippet")?,
    })
}

/// Builds a bracketed context around the first term found in `text`.
fn like_snippet(text: &str, terms: &[&str]) -> Option<String> {
    let haystack = text.to_ascii_lowercase();
    let (start, term_len) = terms.iter().find_map(|term| {
        haystack
            .find(&term.to_ascii_lowercase())
            .map(|start| (start, term.len()))
    })?;
    let end = start + term_len;

    let before = text[..start]
        .chars()
        .rev()
        .take(LIKE_SNIPPET_RADIUS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<String>();
    let after = text[end..]
        .chars()
        .take(LIKE_SNIPPET_RADIUS)
        .collect::<String>();

    Some(format!("{before}[{}]{after}", &text[start..end]))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

fn escape_like_term(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    if is_match_syntax_error(&err) {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    SearchError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}
