//! Markdown status dashboard.

use crate::model::article::RewriteStatus;
use crate::model::scores::{Bucket, ARCHIVE_THRESHOLD, REVIEW_THRESHOLD, REWRITE_THRESHOLD};
use crate::repo::stats_repo::CorpusStatistics;
use crate::service::sampler::UNCATEGORIZED_LABEL;
use chrono::{DateTime, Local};
use log::info;
use std::fmt::Write as _;
use std::path::Path;

const TOP_CATEGORIES: usize = 10;

/// Renders the dashboard Markdown for a statistics snapshot.
pub fn render_dashboard(stats: &CorpusStatistics, generated_at: &DateTime<Local>) -> String {
    let mut md = String::new();

    md.push_str("# Writing Corpus Dashboard\n\n");
    let _ = writeln!(
        md,
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    md.push_str("---\n\n");

    render_overview(&mut md, stats);
    render_corpus(&mut md, stats);
    render_progress(&mut md, stats);
    render_buckets(&mut md, stats);

    md
}

/// Writes the dashboard, creating the parent directory when needed.
pub fn write_dashboard(path: &Path, markdown: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, markdown)?;
    info!(
        "event=dashboard_write module=dashboard status=ok path={}",
        path.display()
    );
    Ok(())
}

fn render_overview(md: &mut String, stats: &CorpusStatistics) {
    md.push_str("## Overview\n\n");
    let _ = writeln!(md, "- **Articles**: {}", stats.total);
    let _ = writeln!(md, "- **Scored**: {}", stats.total - stats.unscored);
    let _ = writeln!(md, "- **Unscored**: {}\n", stats.unscored);

    md.push_str("### By Year\n\n");
    md.push_str("| Year | Articles | Avg score |\n");
    md.push_str("|---|---|---|\n");
    for year in &stats.by_year {
        let label = year
            .year
            .map_or_else(|| "unknown".to_string(), |year| year.to_string());
        let _ = writeln!(
            md,
            "| {} | {} | {} |",
            label,
            year.count,
            format_average(year.avg_rewrite_score)
        );
    }
    md.push('\n');

    let _ = writeln!(md, "### By Category (top {TOP_CATEGORIES})\n");
    md.push_str("| Category | Articles | Avg score | Avg length |\n");
    md.push_str("|---|---|---|---|\n");
    for category in stats.by_category.iter().take(TOP_CATEGORIES) {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            category.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL),
            category.count,
            format_average(category.avg_rewrite_score),
            format_average(category.avg_word_count)
        );
    }
    md.push('\n');

    md.push_str("### By Rewrite Status\n\n");
    md.push_str("| Status | Articles |\n");
    md.push_str("|---|---|\n");
    for (status, count) in &stats.by_status {
        let _ = writeln!(md, "| {} | {} |", status.as_str(), count);
    }
    md.push('\n');
}

fn render_corpus(md: &mut String, stats: &CorpusStatistics) {
    md.push_str("## Corpus\n\n");
    let _ = writeln!(md, "- **Sampled**: {}", stats.sampled);
    let _ = writeln!(md, "- **Reference articles**: {}", stats.reference);
    let _ = writeln!(md, "- **Average ELO**: {}\n", format_average(stats.avg_elo));
}

fn render_progress(md: &mut String, stats: &CorpusStatistics) {
    let completed = stats.status_count(RewriteStatus::Completed);
    let rate = if stats.total == 0 {
        0.0
    } else {
        completed as f64 / stats.total as f64 * 100.0
    };

    md.push_str("## Rewrite Progress\n\n");
    let _ = writeln!(
        md,
        "- **Progress**: {rate:.1}% ({completed}/{})",
        stats.total
    );
    let _ = writeln!(
        md,
        "- **Pending**: {}",
        stats.status_count(RewriteStatus::Pending)
    );
    let _ = writeln!(
        md,
        "- **In progress**: {}\n",
        stats.status_count(RewriteStatus::InProgress)
    );
}

fn render_buckets(md: &mut String, stats: &CorpusStatistics) {
    md.push_str("## Rewrite Buckets\n\n");
    md.push_str("| Bucket | Score | Articles |\n");
    md.push_str("|---|---|---|\n");
    for bucket in Bucket::ALL {
        let _ = writeln!(
            md,
            "| {} | {} | {} |",
            bucket.as_str(),
            bucket_range(bucket),
            stats.bucket_count(bucket)
        );
    }
    let _ = writeln!(md, "| unscored | - | {} |\n", stats.unscored);

    if !stats.by_rewrite_type.is_empty() {
        md.push_str("### Rewrite Types\n\n");
        md.push_str("| Type | Articles |\n");
        md.push_str("|---|---|\n");
        for (rewrite_type, count) in &stats.by_rewrite_type {
            let _ = writeln!(md, "| {} | {} |", rewrite_type.as_str(), count);
        }
        md.push('\n');
    }
}

fn bucket_range(bucket: Bucket) -> String {
    match bucket {
        Bucket::Rewrite => format!(">= {REWRITE_THRESHOLD}"),
        Bucket::Review => format!("{REVIEW_THRESHOLD}-{}", REWRITE_THRESHOLD - 1),
        Bucket::Archive => format!("{ARCHIVE_THRESHOLD}-{}", REVIEW_THRESHOLD - 1),
        Bucket::Deletion => format!("< {ARCHIVE_THRESHOLD}"),
    }
}

fn format_average(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |value| format!("{value:.1}"))
}

#[cfg(test)]
mod tests {
    use super::render_dashboard;
    use crate::model::article::RewriteStatus;
    use crate::model::scores::{Bucket, RewriteType};
    use crate::repo::stats_repo::{CategoryStat, CorpusStatistics, YearStat};
    use chrono::{Local, TimeZone};

    fn stats() -> CorpusStatistics {
        CorpusStatistics {
            total: 4,
            by_status: vec![
                (RewriteStatus::Pending, 2),
                (RewriteStatus::InProgress, 1),
                (RewriteStatus::Completed, 1),
                (RewriteStatus::Deleted, 0),
                (RewriteStatus::Archived, 0),
            ],
            by_bucket: vec![
                (Bucket::Rewrite, 1),
                (Bucket::Review, 0),
                (Bucket::Archive, 1),
                (Bucket::Deletion, 1),
            ],
            by_rewrite_type: vec![(RewriteType::CulturalExtraction, 1)],
            unscored: 1,
            by_year: vec![
                YearStat {
                    year: None,
                    count: 1,
                    avg_rewrite_score: None,
                },
                YearStat {
                    year: Some(2008),
                    count: 3,
                    avg_rewrite_score: Some(43.333),
                },
            ],
            by_category: vec![CategoryStat {
                category: None,
                count: 4,
                avg_rewrite_score: Some(40.0),
                avg_word_count: Some(812.5),
            }],
            avg_elo: Some(1512.4),
            sampled: 0,
            reference: 1,
        }
    }

    #[test]
    fn dashboard_has_every_section() {
        let generated_at = Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let md = render_dashboard(&stats(), &generated_at);

        assert!(md.starts_with("# Writing Corpus Dashboard\n\nGenerated: 2026-03-01 09:30:00\n"));
        for heading in [
            "## Overview",
            "### By Year",
            "### By Category (top 10)",
            "### By Rewrite Status",
            "## Corpus",
            "## Rewrite Progress",
            "## Rewrite Buckets",
            "### Rewrite Types",
        ] {
            assert!(md.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn dashboard_renders_counts_and_labels() {
        let generated_at = Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let md = render_dashboard(&stats(), &generated_at);

        assert!(md.contains("| unknown | 1 | n/a |"));
        assert!(md.contains("| 2008 | 3 | 43.3 |"));
        assert!(md.contains("| 未分類 | 4 | 40.0 | 812.5 |"));
        assert!(md.contains("- **Progress**: 25.0% (1/4)"));
        assert!(md.contains("- **Average ELO**: 1512.4"));
        assert!(md.contains("| rewrite | >= 70 | 1 |"));
        assert!(md.contains("| review | 50-69 | 0 |"));
        assert!(md.contains("| unscored | - | 1 |"));
        assert!(md.contains("| cultural_extraction | 1 |"));
    }

    #[test]
    fn empty_corpus_reports_zero_progress() {
        let empty = CorpusStatistics {
            total: 0,
            by_status: Vec::new(),
            by_bucket: Vec::new(),
            by_rewrite_type: Vec::new(),
            unscored: 0,
            by_year: Vec::new(),
            by_category: Vec::new(),
            avg_elo: None,
            sampled: 0,
            reference: 0,
        };
        let generated_at = Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let md = render_dashboard(&empty, &generated_at);

        assert!(md.contains("- **Progress**: 0.0% (0/0)"));
        assert!(md.contains("- **Average ELO**: n/a"));
        assert!(!md.contains("### Rewrite Types"));
    }
}
