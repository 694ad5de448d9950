//! Batch classification into score buckets.
//!
//! # Invariants
//! - Every scored entry lands in exactly one bucket.
//! - Unscored entries are skipped, not reported as errors.
//! - Input order is preserved inside each bucket.

use crate::model::article::{Article, ArticleId};
use crate::model::scores::Bucket;
use serde::Serialize;

/// Article ids partitioned by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub rewrite: Vec<ArticleId>,
    pub review: Vec<ArticleId>,
    pub archive: Vec<ArticleId>,
    pub deletion: Vec<ArticleId>,
}

impl Classification {
    pub fn ids(&self, bucket: Bucket) -> &[ArticleId] {
        match bucket {
            Bucket::Rewrite => &self.rewrite,
            Bucket::Review => &self.review,
            Bucket::Archive => &self.archive,
            Bucket::Deletion => &self.deletion,
        }
    }

    fn ids_mut(&mut self, bucket: Bucket) -> &mut Vec<ArticleId> {
        match bucket {
            Bucket::Rewrite => &mut self.rewrite,
            Bucket::Review => &mut self.review,
            Bucket::Archive => &mut self.archive,
            Bucket::Deletion => &mut self.deletion,
        }
    }

    /// Total number of classified ids.
    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|bucket| self.ids(*bucket).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions `(id, composite)` pairs into buckets.
pub fn classify<I, S>(entries: I) -> Classification
where
    I: IntoIterator<Item = (S, Option<u32>)>,
    S: Into<ArticleId>,
{
    let mut classification = Classification::default();
    for (id, score) in entries {
        let Some(score) = score else {
            continue;
        };
        classification
            .ids_mut(Bucket::from_score(score))
            .push(id.into());
    }
    classification
}

/// Partitions articles by their stored composite score.
pub fn classify_articles(articles: &[Article]) -> Classification {
    classify(
        articles
            .iter()
            .map(|article| (article.id.as_str(), article.rewrite_score)),
    )
}
