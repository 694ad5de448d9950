//! Score adjusters applied after the rule table lookup.
//!
//! Both adjusters are pure: they take a score set by value and return the
//! adjusted copy. Length runs before recency, so the 2023 override always
//! has the last word on the axes it zeroes.

use crate::model::scores::{Axis, AxisScores};

/// Articles shorter than this (in characters) are penalized.
pub const SHORT_ARTICLE_WORDS: u32 = 300;
/// Articles longer than this (in characters) get the long-form adjustment.
pub const LONG_ARTICLE_WORDS: u32 = 2000;
/// Year whose posts are placeholder content scheduled for deletion.
pub const PLACEHOLDER_YEAR: i32 = 2023;
/// Last year that earns the time-capsule timeliness bonus.
pub const TIME_CAPSULE_LAST_YEAR: i32 = 2009;

/// Adjusts entertainment and rewrite effort by article length.
///
/// Long articles lose rewrite-effort points: the axis is a cost proxy where
/// more work means a lower score.
#[must_use]
pub fn adjust_for_length(scores: AxisScores, word_count: u32) -> AxisScores {
    if word_count < SHORT_ARTICLE_WORDS {
        scores
            .add(Axis::Entertainment, -4)
            .add(Axis::RewriteEffort, -3)
    } else if word_count > LONG_ARTICLE_WORDS {
        scores
            .add(Axis::Entertainment, 2)
            .add(Axis::RewriteEffort, -2)
    } else {
        scores
    }
}

/// Adjusts timeliness-related axes by publication year.
#[must_use]
pub fn adjust_for_recency(scores: AxisScores, year: i32) -> AxisScores {
    if year == PLACEHOLDER_YEAR {
        scores
            .with(Axis::Timeliness, 0)
            .with(Axis::Universality, 0)
            .with(Axis::Entertainment, 0)
    } else if year <= TIME_CAPSULE_LAST_YEAR {
        scores.add(Axis::Timeliness, 3)
    } else {
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::{adjust_for_length, adjust_for_recency};
    use crate::model::scores::{Axis, AxisScores};

    const BASE: AxisScores = AxisScores::new(12, 8, 10, 10, 8);

    #[test]
    fn short_articles_lose_entertainment_and_effort() {
        let adjusted = adjust_for_length(BASE, 150);
        assert_eq!(adjusted, AxisScores::new(12, 8, 6, 7, 8));
    }

    #[test]
    fn short_article_penalty_floors_at_zero() {
        let adjusted = adjust_for_length(AxisScores::new(2, 3, 2, 1, 8), 0);
        assert_eq!(adjusted.get(Axis::Entertainment), 0);
        assert_eq!(adjusted.get(Axis::RewriteEffort), 0);
    }

    #[test]
    fn long_articles_gain_entertainment_up_to_cap() {
        let adjusted = adjust_for_length(AxisScores::new(22, 18, 19, 12, 9), 2500);
        assert_eq!(adjusted.get(Axis::Entertainment), 20);
        assert_eq!(adjusted.get(Axis::RewriteEffort), 10);
    }

    #[test]
    fn boundary_lengths_are_unchanged() {
        assert_eq!(adjust_for_length(BASE, 300), BASE);
        assert_eq!(adjust_for_length(BASE, 2000), BASE);
    }

    #[test]
    fn placeholder_year_zeroes_three_axes() {
        let adjusted = adjust_for_recency(BASE, 2023);
        assert_eq!(adjusted, AxisScores::new(0, 0, 0, 10, 8));
    }

    #[test]
    fn old_articles_get_timeliness_bonus_with_cap() {
        assert_eq!(adjust_for_recency(BASE, 2009).get(Axis::Timeliness), 15);
        assert_eq!(
            adjust_for_recency(AxisScores::new(29, 0, 0, 0, 0), 2001).get(Axis::Timeliness),
            30
        );
        assert_eq!(adjust_for_recency(BASE, 2010), BASE);
    }

    #[test]
    fn axes_stay_in_range_for_any_length_and_year() {
        for word_count in [0, 299, 300, 2000, 2001, 100_000] {
            for year in [1999, 2009, 2010, 2022, 2023, 2030] {
                let scores = adjust_for_recency(
                    adjust_for_length(AxisScores::new(30, 20, 20, 20, 10), word_count),
                    year,
                );
                for axis in Axis::ALL {
                    assert!(scores.get(axis) <= axis.max());
                }
            }
        }
    }
}
