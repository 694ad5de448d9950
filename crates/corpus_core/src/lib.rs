//! Core domain logic for the writing corpus.
//! This crate is the single source of truth for scoring rules and store
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod search;
pub mod service;

pub use config::{ConfigError, CorpusConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::article::{Article, ArticleId, ArticleValidationError, RewriteStatus};
pub use model::scores::{Axis, AxisScores, Bucket, RewriteType};
pub use repo::article_repo::{
    ArticleListQuery, ArticleOrder, ArticleRepository, CategoryFilter, RepoError, RepoResult,
    ScoringRow, SqliteArticleRepository,
};
pub use scoring::classify::{classify, classify_articles, Classification};
pub use scoring::pipeline::{score_article, ScoreCard, ScoringInput};
pub use search::fts::{search_articles, SearchError, SearchHit, SearchQuery, SearchResult};
pub use service::scoring_service::{ScoringReport, ScoringService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
