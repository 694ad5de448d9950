//! Per-article scoring pipeline.
//!
//! # Responsibility
//! - Run rule lookup, length and recency adjustment, and risk detection in
//!   a fixed order.
//! - Aggregate axes into the composite score and pick the rewrite type.
//!
//! # Invariants
//! - `score_article` is pure: identical input yields identical output.
//! - Missing word count counts as 0; missing year counts as `DEFAULT_YEAR`.

use crate::model::article::Article;
use crate::model::scores::{Axis, AxisScores, Bucket, RewriteType, REWRITE_THRESHOLD};
use crate::scoring::adjust::{adjust_for_length, adjust_for_recency};
use crate::scoring::risk::risk_score;
use crate::scoring::rules::{base_scores, Category};
use serde::Serialize;

/// Year assumed for articles whose date could not be parsed.
pub const DEFAULT_YEAR: i32 = 2010;

/// Last year that routes uncategorized rewrites to the time-capsule type.
const CAPSULE_LAST_YEAR: i32 = 2010;

/// Fields the pipeline reads from an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringInput<'a> {
    pub title: &'a str,
    pub category: Option<&'a str>,
    pub year: Option<i32>,
    pub word_count: Option<u32>,
}

impl<'a> From<&'a Article> for ScoringInput<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            title: article.title.as_str(),
            category: article.category.as_deref(),
            year: article.year,
            word_count: article.word_count,
        }
    }
}

/// Scoring result for one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    pub composite: u32,
    pub axes: AxisScores,
    pub rewrite_type: Option<RewriteType>,
}

impl ScoreCard {
    pub fn bucket(&self) -> Bucket {
        Bucket::from_score(self.composite)
    }
}

/// Scores one article.
pub fn score_article(input: &ScoringInput<'_>) -> ScoreCard {
    let year = input.year.unwrap_or(DEFAULT_YEAR);

    let axes = base_scores(input.category);
    let axes = adjust_for_length(axes, input.word_count.unwrap_or(0));
    let axes = adjust_for_recency(axes, year);
    let axes = axes.with(Axis::Risk, risk_score(input.title, input.year));

    let composite = axes.total();
    ScoreCard {
        composite,
        axes,
        rewrite_type: classify_type(input.category, input.year, composite),
    }
}

/// Picks the rewrite treatment for a scored article.
///
/// Returns `None` below the rewrite threshold.
pub fn classify_type(
    category: Option<&str>,
    year: Option<i32>,
    composite: u32,
) -> Option<RewriteType> {
    if composite < REWRITE_THRESHOLD {
        return None;
    }

    let by_category = match category.and_then(Category::parse) {
        Some(Category::Analysis | Category::TabletopRpg) => {
            Some(RewriteType::PhilosophicalElevation)
        }
        Some(
            Category::SecondaryCreativeWork
            | Category::SecondaryCreativeWorkGameReview
            | Category::Review,
        ) => Some(RewriteType::CulturalExtraction),
        Some(Category::CasualEssay | Category::Report) => Some(RewriteType::TimelessnessCapsule),
        _ => None,
    };

    by_category.or_else(|| {
        if year.unwrap_or(DEFAULT_YEAR) <= CAPSULE_LAST_YEAR {
            Some(RewriteType::TimelessnessCapsule)
        } else {
            Some(RewriteType::CulturalExtraction)
        }
    })
}
