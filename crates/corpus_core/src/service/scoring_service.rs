//! Batch scoring use-case service.
//!
//! # Responsibility
//! - Load the corpus, score every article, persist and classify the results.
//! - Export bucket candidate lists for downstream tooling.
//!
//! # Invariants
//! - Scoring runs in parallel; persistence runs sequentially on the caller's
//!   repository, so writes for one id are never concurrent.
//! - A failure to persist one article is recorded and the batch continues.
//! - A failure to load the corpus aborts before anything is scored.
//! - Only input columns are loaded, so damaged score columns get overwritten.

use crate::model::article::ArticleId;
use crate::model::scores::Bucket;
use crate::repo::article_repo::{ArticleRepository, RepoError, RepoResult, ScoringRow};
use crate::scoring::classify::{classify, Classification};
use crate::scoring::pipeline::{score_article, ScoreCard, ScoringInput};
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of a full re-scoring run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoringReport {
    /// Articles run through the pipeline.
    pub scored: usize,
    /// Articles whose scores were written back.
    pub persisted: usize,
    /// `(id, error message)` for each article that failed to persist.
    pub failed: Vec<(ArticleId, String)>,
    /// Buckets over every scored article, persisted or not.
    pub classification: Classification,
}

impl ScoringReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Use-case service wrapper for corpus scoring.
pub struct ScoringService<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> ScoringService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Re-scores the whole corpus, overwriting previous scores.
    ///
    /// # Errors
    /// - Returns an error only when the corpus cannot be loaded. Per-article
    ///   persistence errors are reported in [`ScoringReport::failed`].
    pub fn rescore_all(&self) -> RepoResult<ScoringReport> {
        let started_at = Instant::now();
        info!("event=score_batch module=scoring status=start");

        let rows = self.repo.load_scoring_rows().map_err(|err| {
            error!(
                "event=score_batch module=scoring status=error stage=load error={}",
                err
            );
            err
        })?;

        let cards = score_all(&rows);

        let mut report = ScoringReport {
            scored: cards.len(),
            ..ScoringReport::default()
        };
        for (id, card) in &cards {
            match self.repo.persist_scores(id, card) {
                Ok(()) => report.persisted += 1,
                Err(err) => {
                    error!(
                        "event=persist_scores module=scoring status=error id={} error={}",
                        id, err
                    );
                    report.failed.push((id.clone(), err.to_string()));
                }
            }
        }

        report.classification = classify(
            cards
                .iter()
                .map(|(id, card)| (id.as_str(), Some(card.composite))),
        );

        info!(
            "event=score_batch module=scoring status=ok scored={} persisted={} failed={} rewrite={} review={} archive={} deletion={} elapsed_ms={}",
            report.scored,
            report.persisted,
            report.failed.len(),
            report.classification.rewrite.len(),
            report.classification.review.len(),
            report.classification.archive.len(),
            report.classification.deletion.len(),
            started_at.elapsed().as_millis()
        );

        Ok(report)
    }

    /// Re-scores one article and persists the result.
    pub fn rescore_article(&self, id: &str) -> RepoResult<ScoreCard> {
        let row = self
            .repo
            .get_scoring_row(id)?
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
        let card = score_article(&ScoringInput::from(&row));
        self.repo.persist_scores(id, &card)?;
        Ok(card)
    }
}

/// Scores rows in parallel, keeping input order.
pub fn score_all(rows: &[ScoringRow]) -> Vec<(ArticleId, ScoreCard)> {
    rows.par_iter()
        .map(|row| (row.id.clone(), score_article(&ScoringInput::from(row))))
        .collect()
}

/// Writes one `<bucket>-candidates.json` id list per bucket into `dir`.
///
/// Returns the written paths in bucket order.
pub fn write_candidate_files(
    classification: &Classification,
    dir: &Path,
) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(Bucket::ALL.len());
    for bucket in Bucket::ALL {
        let path = dir.join(bucket.candidates_file_name());
        let json = serde_json::to_string_pretty(classification.ids(bucket))?;
        std::fs::write(&path, json)?;
        written.push(path);
    }

    info!(
        "event=write_candidates module=scoring status=ok dir={} files={}",
        dir.display(),
        written.len()
    );
    Ok(written)
}
