//! Article domain model.
//!
//! # Responsibility
//! - Define the canonical corpus record read by scoring and sampling.
//! - Keep pipeline-owned fields (scores, labels) separate from ingested
//!   descriptive fields.
//!
//! # Invariants
//! - `id` is stable and never reused for another article.
//! - When both are set, `year` equals the year prefix of `date`.
//! - Scoring fields are either all absent or written together.

use crate::model::scores::{AxisScores, Bucket, RewriteType};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for one corpus article (`fc2_YYYY-MM-DD_NNN`).
pub type ArticleId = String;

/// ELO rating assigned to articles that have never been compared.
pub const DEFAULT_ELO_RATING: i64 = 1500;

/// Manual rewrite workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Deleted,
    Archived,
}

impl RewriteStatus {
    pub const ALL: [RewriteStatus; 5] = [
        RewriteStatus::Pending,
        RewriteStatus::InProgress,
        RewriteStatus::Completed,
        RewriteStatus::Deleted,
        RewriteStatus::Archived,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RewriteStatus::Pending => "pending",
            RewriteStatus::InProgress => "in_progress",
            RewriteStatus::Completed => "completed",
            RewriteStatus::Deleted => "deleted",
            RewriteStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RewriteStatus::Pending),
            "in_progress" => Some(RewriteStatus::InProgress),
            "completed" => Some(RewriteStatus::Completed),
            "deleted" => Some(RewriteStatus::Deleted),
            "archived" => Some(RewriteStatus::Archived),
            _ => None,
        }
    }
}

/// Validation failures for article records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    EmptyId,
    YearDateMismatch { date: String, year: i32 },
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "article id cannot be empty"),
            Self::YearDateMismatch { date, year } => {
                write!(f, "article year {year} does not match date `{date}`")
            }
        }
    }
}

impl Error for ArticleValidationError {}

/// Canonical corpus record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    /// `YYYY-MM-DD`, or empty when the source had no date.
    pub date: String,
    pub year: Option<i32>,
    /// `None` means uncategorized.
    pub category: Option<String>,
    pub word_count: Option<u32>,
    /// Path of the source file relative to the project root.
    pub file_path: String,
    /// Body text without frontmatter.
    pub content: Option<String>,

    pub quality_score: Option<f64>,
    pub elo_rating: i64,
    pub sampled: bool,
    pub reference_article: bool,

    pub rewrite_status: RewriteStatus,
    pub rewrite_score: Option<u32>,
    pub rewrite_type: Option<RewriteType>,
    pub axis_scores: Option<AxisScores>,
    pub rewrite_bucket: Option<Bucket>,
}

impl Article {
    /// Creates an unscored article with default corpus metadata.
    pub fn new(
        id: impl Into<ArticleId>,
        title: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        let date = date.into();
        let year = year_from_date(&date);
        Self {
            id: id.into(),
            title: title.into(),
            date,
            year,
            category: None,
            word_count: None,
            file_path: String::new(),
            content: None,
            quality_score: None,
            elo_rating: DEFAULT_ELO_RATING,
            sampled: false,
            reference_article: false,
            rewrite_status: RewriteStatus::Pending,
            rewrite_score: None,
            rewrite_type: None,
            axis_scores: None,
            rewrite_bucket: None,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ArticleValidationError> {
        if self.id.trim().is_empty() {
            return Err(ArticleValidationError::EmptyId);
        }

        if let (Some(year), Some(date_year)) = (self.year, year_from_date(&self.date)) {
            if year != date_year {
                return Err(ArticleValidationError::YearDateMismatch {
                    date: self.date.clone(),
                    year,
                });
            }
        }

        Ok(())
    }

    /// Returns whether the scoring pipeline has run for this article.
    pub fn is_scored(&self) -> bool {
        self.rewrite_score.is_some()
    }
}

/// Extracts the year from a `YYYY-...` date string.
pub fn year_from_date(date: &str) -> Option<i32> {
    let (year, _) = date.trim().split_once('-')?;
    if year.len() != 4 {
        return None;
    }
    year.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{year_from_date, Article, ArticleValidationError, RewriteStatus};

    #[test]
    fn new_article_derives_year_and_starts_unscored() {
        let article = Article::new("fc2_2008-05-01_001", "【徒然】daily notes", "2008-05-01");
        assert_eq!(article.year, Some(2008));
        assert_eq!(article.rewrite_status, RewriteStatus::Pending);
        assert!(!article.is_scored());
        assert_eq!(article.elo_rating, 1500);
    }

    #[test]
    fn year_from_date_rejects_malformed_input() {
        assert_eq!(year_from_date("2012-01-31"), Some(2012));
        assert_eq!(year_from_date(""), None);
        assert_eq!(year_from_date("12-01-31"), None);
        assert_eq!(year_from_date("20x2-01-31"), None);
    }

    #[test]
    fn validate_rejects_blank_id_and_year_mismatch() {
        let blank = Article::new("  ", "title", "2010-01-01");
        assert_eq!(blank.validate(), Err(ArticleValidationError::EmptyId));

        let mut mismatch = Article::new("fc2_2010-01-01_001", "title", "2010-01-01");
        mismatch.year = Some(2011);
        assert!(matches!(
            mismatch.validate(),
            Err(ArticleValidationError::YearDateMismatch { year: 2011, .. })
        ));
    }

    #[test]
    fn rewrite_status_round_trips_through_wire_names() {
        for status in RewriteStatus::ALL {
            assert_eq!(RewriteStatus::parse(status.as_str()), Some(status));
        }
    }
}
