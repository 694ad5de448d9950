//! Corpus domain model.
//!
//! # Responsibility
//! - Define canonical article records shared by ingestion, scoring and
//!   sampling.
//! - Define the axis score set and the closed label sets persisted by the
//!   scoring pipeline.
//!
//! # Invariants
//! - Every article is identified by a stable string `ArticleId`.
//! - Axis values never leave their per-axis range.

pub mod article;
pub mod pattern;
pub mod scores;
