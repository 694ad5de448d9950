//! Corpus sampling use-case service.
//!
//! # Responsibility
//! - Select article subsets by criteria, at random, or per category.
//! - Render selections as JSON, one-line summaries, or a Markdown table.
//!
//! # Invariants
//! - A seeded random sample is reproducible for an unchanged corpus.
//! - Uncategorized articles are grouped under `UNCATEGORIZED_LABEL`.

use crate::model::article::{Article, ArticleId};
use crate::model::scores::RewriteType;
use crate::repo::article_repo::{
    ArticleListQuery, ArticleOrder, ArticleRepository, CategoryFilter, RepoResult,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

/// Default row cap for criteria sampling.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 50;
/// Group label for articles without a category.
pub const UNCATEGORIZED_LABEL: &str = "未分類";

/// Filters for [`Sampler::sample_by_criteria`].
#[derive(Debug, Clone)]
pub struct SampleCriteria {
    pub category: Option<String>,
    pub min_rewrite_score: Option<u32>,
    pub min_quality_score: Option<f64>,
    pub min_elo: Option<i64>,
    pub rewrite_type: Option<RewriteType>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub order_by: ArticleOrder,
    pub limit: u32,
}

impl Default for SampleCriteria {
    fn default() -> Self {
        Self {
            category: None,
            min_rewrite_score: None,
            min_quality_score: None,
            min_elo: None,
            rewrite_type: None,
            year_from: None,
            year_to: None,
            order_by: ArticleOrder::RewriteScore,
            limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl SampleCriteria {
    fn to_query(&self) -> ArticleListQuery {
        ArticleListQuery {
            category: self
                .category
                .clone()
                .map_or(CategoryFilter::Any, CategoryFilter::Named),
            min_rewrite_score: self.min_rewrite_score,
            min_quality_score: self.min_quality_score,
            min_elo: self.min_elo,
            rewrite_type: self.rewrite_type,
            year_from: self.year_from,
            year_to: self.year_to,
            order_by: self.order_by,
            limit: Some(self.limit),
        }
    }
}

/// Best-scored articles of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub label: String,
    pub articles: Vec<Article>,
}

/// Output format for [`format_articles`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SampleFormat {
    Json,
    #[default]
    Simple,
    Markdown,
}

impl SampleFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "json" => Some(Self::Json),
            "simple" => Some(Self::Simple),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Use-case service wrapper for sampling.
pub struct Sampler<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> Sampler<R> {
    /// Creates a sampler using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists articles matching every set filter, best first by `order_by`.
    pub fn sample_by_criteria(&self, criteria: &SampleCriteria) -> RepoResult<Vec<Article>> {
        self.repo.list_articles(&criteria.to_query())
    }

    /// Picks up to `limit` distinct articles at random.
    ///
    /// With a seed the same ids are chosen on every run; results are
    /// returned in id order.
    pub fn random_sample(&self, limit: u32, seed: Option<u64>) -> RepoResult<Vec<Article>> {
        let ids = self.repo.list_ids()?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let picked = ids
            .choose_multiple(&mut rng, take)
            .cloned()
            .collect::<Vec<ArticleId>>();

        self.repo.get_articles(&picked)
    }

    /// Returns the `limit_per_category` best rewrite scores of each
    /// category, in category order with uncategorized articles first.
    pub fn top_by_category(&self, limit_per_category: u32) -> RepoResult<Vec<CategoryGroup>> {
        let mut groups = Vec::new();
        for category in self.repo.list_categories()? {
            let (label, filter) = match category {
                Some(name) => (name.clone(), CategoryFilter::Named(name)),
                None => (
                    UNCATEGORIZED_LABEL.to_string(),
                    CategoryFilter::Uncategorized,
                ),
            };
            let articles = self.repo.list_articles(&ArticleListQuery {
                category: filter,
                order_by: ArticleOrder::RewriteScore,
                limit: Some(limit_per_category),
                ..ArticleListQuery::default()
            })?;
            groups.push(CategoryGroup { label, articles });
        }
        Ok(groups)
    }
}

/// Renders articles in the requested format.
pub fn format_articles(
    articles: &[Article],
    format: SampleFormat,
) -> Result<String, serde_json::Error> {
    match format {
        SampleFormat::Json => serde_json::to_string_pretty(articles),
        SampleFormat::Simple => Ok(articles
            .iter()
            .map(|article| {
                format!(
                    "{}: {} ({})",
                    article.id,
                    article.title,
                    score_label(article.rewrite_score)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        SampleFormat::Markdown => {
            let mut lines = vec![
                "| ID | Title | Category | Score | Type |".to_string(),
                "|---|---|---|---|---|".to_string(),
            ];
            lines.extend(articles.iter().map(|article| {
                format!(
                    "| {} | {} | {} | {} | {} |",
                    article.id,
                    article.title,
                    article.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL),
                    score_label(article.rewrite_score),
                    article.rewrite_type.map_or("N/A", RewriteType::as_str)
                )
            }));
            Ok(lines.join("\n"))
        }
    }
}

fn score_label(score: Option<u32>) -> String {
    score.map_or_else(|| "N/A".to_string(), |score| score.to_string())
}
