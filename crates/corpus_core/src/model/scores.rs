//! Axis score set and scoring labels.
//!
//! # Responsibility
//! - Define the five scoring axes and their ranges.
//! - Define rewrite type and bucket label sets with stable wire names.
//!
//! # Invariants
//! - `AxisScores` values are clamped on construction and on every update.
//! - Bucket thresholds (70/50/30) and wire names are a public contract.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Composite score at or above which an article is a rewrite candidate.
pub const REWRITE_THRESHOLD: u32 = 70;
/// Composite score at or above which an article is kept for review.
pub const REVIEW_THRESHOLD: u32 = 50;
/// Composite score at or above which an article is archived.
pub const ARCHIVE_THRESHOLD: u32 = 30;

/// One of the five scoring axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Timeliness,
    Universality,
    Entertainment,
    RewriteEffort,
    /// Higher is safer.
    Risk,
}

impl Axis {
    pub const ALL: [Axis; 5] = [
        Axis::Timeliness,
        Axis::Universality,
        Axis::Entertainment,
        Axis::RewriteEffort,
        Axis::Risk,
    ];

    /// Inclusive upper bound for this axis. The lower bound is always 0.
    pub const fn max(self) -> u32 {
        match self {
            Axis::Timeliness => 30,
            Axis::Universality | Axis::Entertainment | Axis::RewriteEffort => 20,
            Axis::Risk => 10,
        }
    }

    /// Wire name used in storage and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Axis::Timeliness => "timeliness",
            Axis::Universality => "universality",
            Axis::Entertainment => "entertainment",
            Axis::RewriteEffort => "rewrite_effort",
            Axis::Risk => "risk",
        }
    }

    const fn clamp(self, value: u32) -> u32 {
        if value > self.max() {
            self.max()
        } else {
            value
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete set of the five axis scores for one article.
///
/// This is a small `Copy` value: adjusters take one and return a new one,
/// so no state is shared between scoring calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AxisScores {
    timeliness: u32,
    universality: u32,
    entertainment: u32,
    rewrite_effort: u32,
    risk: u32,
}

impl AxisScores {
    /// Builds a score set, clamping each value into its axis range.
    pub const fn new(
        timeliness: u32,
        universality: u32,
        entertainment: u32,
        rewrite_effort: u32,
        risk: u32,
    ) -> Self {
        Self {
            timeliness: Axis::Timeliness.clamp(timeliness),
            universality: Axis::Universality.clamp(universality),
            entertainment: Axis::Entertainment.clamp(entertainment),
            rewrite_effort: Axis::RewriteEffort.clamp(rewrite_effort),
            risk: Axis::Risk.clamp(risk),
        }
    }

    /// Builds a score set only when every value is already in range.
    ///
    /// Used by read paths, which must reject invalid persisted state.
    pub fn checked(
        timeliness: u32,
        universality: u32,
        entertainment: u32,
        rewrite_effort: u32,
        risk: u32,
    ) -> Option<Self> {
        let scores = Self::new(
            timeliness,
            universality,
            entertainment,
            rewrite_effort,
            risk,
        );
        let unchanged = scores.timeliness == timeliness
            && scores.universality == universality
            && scores.entertainment == entertainment
            && scores.rewrite_effort == rewrite_effort
            && scores.risk == risk;
        unchanged.then_some(scores)
    }

    pub const fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Timeliness => self.timeliness,
            Axis::Universality => self.universality,
            Axis::Entertainment => self.entertainment,
            Axis::RewriteEffort => self.rewrite_effort,
            Axis::Risk => self.risk,
        }
    }

    /// Returns a copy with `axis` set to `value`, clamped to the axis range.
    #[must_use]
    pub const fn with(self, axis: Axis, value: u32) -> Self {
        let value = axis.clamp(value);
        let mut next = self;
        match axis {
            Axis::Timeliness => next.timeliness = value,
            Axis::Universality => next.universality = value,
            Axis::Entertainment => next.entertainment = value,
            Axis::RewriteEffort => next.rewrite_effort = value,
            Axis::Risk => next.risk = value,
        }
        next
    }

    /// Returns a copy with `delta` added to `axis`, saturating at both ends.
    #[must_use]
    pub const fn add(self, axis: Axis, delta: i32) -> Self {
        let current = self.get(axis);
        let value = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.with(axis, value)
    }

    /// Sum of all five axes. Not clamped.
    pub const fn total(&self) -> u32 {
        self.timeliness + self.universality + self.entertainment + self.rewrite_effort + self.risk
    }
}

/// Thematic treatment an article receives when selected for rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteType {
    /// Old everyday writing valued as a snapshot of its time.
    TimelessnessCapsule,
    /// Fan-culture material mined for cultural history.
    CulturalExtraction,
    /// Analytical writing lifted into a general argument.
    PhilosophicalElevation,
}

impl RewriteType {
    pub const fn as_str(self) -> &'static str {
        match self {
            RewriteType::TimelessnessCapsule => "timelessness_capsule",
            RewriteType::CulturalExtraction => "cultural_extraction",
            RewriteType::PhilosophicalElevation => "philosophical_elevation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "timelessness_capsule" => Some(RewriteType::TimelessnessCapsule),
            "cultural_extraction" => Some(RewriteType::CulturalExtraction),
            "philosophical_elevation" => Some(RewriteType::PhilosophicalElevation),
            _ => None,
        }
    }
}

impl Display for RewriteType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score-range classification of a scored article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Rewrite,
    Review,
    Archive,
    Deletion,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Rewrite,
        Bucket::Review,
        Bucket::Archive,
        Bucket::Deletion,
    ];

    /// Maps a composite score to exactly one bucket.
    pub const fn from_score(score: u32) -> Self {
        if score >= REWRITE_THRESHOLD {
            Bucket::Rewrite
        } else if score >= REVIEW_THRESHOLD {
            Bucket::Review
        } else if score >= ARCHIVE_THRESHOLD {
            Bucket::Archive
        } else {
            Bucket::Deletion
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Bucket::Rewrite => "rewrite",
            Bucket::Review => "review",
            Bucket::Archive => "archive",
            Bucket::Deletion => "deletion",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "rewrite" => Some(Bucket::Rewrite),
            "review" => Some(Bucket::Review),
            "archive" => Some(Bucket::Archive),
            "deletion" => Some(Bucket::Deletion),
            _ => None,
        }
    }

    /// File name used when exporting bucket membership lists.
    pub const fn candidates_file_name(self) -> &'static str {
        match self {
            Bucket::Rewrite => "rewrite-candidates.json",
            Bucket::Review => "review-candidates.json",
            Bucket::Archive => "archive-candidates.json",
            Bucket::Deletion => "deletion-candidates.json",
        }
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
