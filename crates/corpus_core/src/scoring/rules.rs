//! Category rule table.
//!
//! # Responsibility
//! - Map blog categories to their seed axis scores.
//! - Resolve category strings (localized label or ASCII slug) to `Category`.
//!
//! # Invariants
//! - Lookup never fails: unknown or missing categories use `DEFAULT_SCORES`.

use crate::model::scores::AxisScores;

/// Seed scores for uncategorized articles and unknown categories.
pub const DEFAULT_SCORES: AxisScores = AxisScores::new(10, 8, 8, 8, 7);

/// Known blog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    CasualEssay,
    Review,
    Report,
    SecondaryCreativeWork,
    Analysis,
    Announcement,
    BreakingNews,
    StatusUpdate,
    /// Written as `TRPG` or full-width `ＴＲＰＧ` in titles.
    TabletopRpg,
    SecondaryCreativeWorkGameReview,
    Recruitment,
    Notice,
    Contact,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::CasualEssay,
        Category::Review,
        Category::Report,
        Category::SecondaryCreativeWork,
        Category::Analysis,
        Category::Announcement,
        Category::BreakingNews,
        Category::StatusUpdate,
        Category::TabletopRpg,
        Category::SecondaryCreativeWorkGameReview,
        Category::Recruitment,
        Category::Notice,
        Category::Contact,
    ];

    /// Resolves a category as written in titles, or by its slug.
    pub fn parse(value: &str) -> Option<Self> {
        let category = match value.trim() {
            "徒然" | "casual-essay" => Category::CasualEssay,
            "レビュー" | "review" => Category::Review,
            "報告" | "report" => Category::Report,
            "東方二次創作" | "secondary-creative-work" => Category::SecondaryCreativeWork,
            "考察" | "analysis" => Category::Analysis,
            "告知" | "announcement" => Category::Announcement,
            "速報" | "breaking-news" => Category::BreakingNews,
            "生存報告" | "status-update" => Category::StatusUpdate,
            "TRPG" | "ＴＲＰＧ" | "tabletop-rpg" => Category::TabletopRpg,
            "東方二次創作ゲームレビュー" | "secondary-creative-work-game-review" => {
                Category::SecondaryCreativeWorkGameReview
            }
            "募集" | "recruitment" => Category::Recruitment,
            "通知" | "notice" => Category::Notice,
            "連絡" | "contact" => Category::Contact,
            _ => return None,
        };
        Some(category)
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Category::CasualEssay => "casual-essay",
            Category::Review => "review",
            Category::Report => "report",
            Category::SecondaryCreativeWork => "secondary-creative-work",
            Category::Analysis => "analysis",
            Category::Announcement => "announcement",
            Category::BreakingNews => "breaking-news",
            Category::StatusUpdate => "status-update",
            Category::TabletopRpg => "tabletop-rpg",
            Category::SecondaryCreativeWorkGameReview => "secondary-creative-work-game-review",
            Category::Recruitment => "recruitment",
            Category::Notice => "notice",
            Category::Contact => "contact",
        }
    }

    /// Label as it appears between `【】` in article titles.
    pub const fn label(self) -> &'static str {
        match self {
            Category::CasualEssay => "徒然",
            Category::Review => "レビュー",
            Category::Report => "報告",
            Category::SecondaryCreativeWork => "東方二次創作",
            Category::Analysis => "考察",
            Category::Announcement => "告知",
            Category::BreakingNews => "速報",
            Category::StatusUpdate => "生存報告",
            Category::TabletopRpg => "TRPG",
            Category::SecondaryCreativeWorkGameReview => "東方二次創作ゲームレビュー",
            Category::Recruitment => "募集",
            Category::Notice => "通知",
            Category::Contact => "連絡",
        }
    }

    /// Seed axis scores for this category.
    pub const fn base_scores(self) -> AxisScores {
        match self {
            Category::CasualEssay => AxisScores::new(12, 8, 10, 10, 8),
            Category::Review => AxisScores::new(18, 12, 14, 8, 6),
            Category::Report => AxisScores::new(8, 6, 8, 12, 8),
            Category::SecondaryCreativeWork | Category::SecondaryCreativeWorkGameReview => {
                AxisScores::new(22, 18, 16, 12, 9)
            }
            Category::Analysis => AxisScores::new(20, 15, 12, 10, 9),
            Category::Announcement | Category::Notice | Category::Contact => {
                AxisScores::new(2, 3, 4, 6, 8)
            }
            Category::BreakingNews => AxisScores::new(4, 4, 6, 8, 7),
            Category::StatusUpdate => AxisScores::new(5, 4, 6, 10, 8),
            Category::TabletopRpg => AxisScores::new(18, 14, 12, 10, 9),
            Category::Recruitment => AxisScores::new(2, 3, 4, 5, 8),
        }
    }
}

/// Returns the seed scores for an optional category string.
pub fn base_scores(category: Option<&str>) -> AxisScores {
    category
        .and_then(Category::parse)
        .map_or(DEFAULT_SCORES, Category::base_scores)
}

#[cfg(test)]
mod tests {
    use super::{base_scores, Category, DEFAULT_SCORES};
    use crate::model::scores::{Axis, AxisScores};

    #[test]
    fn unknown_category_matches_uncategorized_baseline() {
        assert_eq!(base_scores(Some("未知のカテゴリ")), base_scores(None));
        assert_eq!(base_scores(Some("")), DEFAULT_SCORES);
    }

    #[test]
    fn label_and_slug_resolve_to_same_entry() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.label()), Some(category));
            assert_eq!(Category::parse(category.slug()), Some(category));
        }
        assert_eq!(Category::parse("ＴＲＰＧ"), Some(Category::TabletopRpg));
    }

    #[test]
    fn casual_essay_seed_scores() {
        assert_eq!(
            base_scores(Some("casual-essay")),
            AxisScores::new(12, 8, 10, 10, 8)
        );
        assert_eq!(base_scores(Some("徒然")), base_scores(Some("casual-essay")));
    }

    #[test]
    fn every_entry_is_within_axis_range() {
        for category in Category::ALL {
            let scores = category.base_scores();
            for axis in Axis::ALL {
                assert!(scores.get(axis) <= axis.max(), "{category:?} {axis}");
            }
        }
    }
}
