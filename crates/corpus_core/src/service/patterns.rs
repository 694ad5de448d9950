//! Writing-style pattern extraction.
//!
//! # Responsibility
//! - Match a fixed phrase library against article bodies.
//! - Aggregate counts and example contexts and store them.
//!
//! # Invariants
//! - At most `MAX_EXAMPLES_PER_ARTICLE` contexts are taken per pattern per
//!   article, and occurrence counts follow that cap.
//! - Stored examples are unique, first-seen order, at most
//!   `MAX_STORED_EXAMPLES` per pattern.
//! - Patterns with no match are not stored.

use crate::model::pattern::{PatternType, WritingPattern};
use crate::repo::article_repo::RepoResult;
use crate::repo::pattern_repo::{PatternRepository, PatternSource};
use log::info;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_MIN_ELO: i64 = 1500;
pub const DEFAULT_ANALYSIS_LIMIT: u32 = 100;
pub const MAX_EXAMPLES_PER_ARTICLE: usize = 5;
pub const MAX_STORED_EXAMPLES: usize = 10;
/// Characters kept on each side of a match.
const CONTEXT_RADIUS: usize = 20;

type PatternTable = &'static [(&'static str, &'static [&'static str])];

const LOGICAL_PATTERNS: PatternTable = &[
    (
        "反語型",
        &[
            r"〜じゃないか[？?]",
            r"〜というのはおかしいんじゃないか[？?]",
            r"〜と思わないか[？?]",
            r"〜なんじゃないか[？?]",
            r"〜ではないだろうか[？?]",
        ],
    ),
    (
        "極論前置き型",
        &["はっきり言って", "正直な話", "端的に言えば", "要するに", "結論から言うと"],
    ),
    (
        "段階的展開",
        &[r"まず[、,]", r"次に[、,]", r"最後に[、,]", "第一に", "第二に", r"そして[、,]"],
    ),
    (
        "対比型",
        &[r"一方で[、,]", r"他方で[、,]", "それに対して", r"逆に[、,]", r"反対に[、,]"],
    ),
    (
        "前提提示型",
        &[r"前提として[、,]", r"そもそも[、,]", "まず前提として", "ここで重要なのは"],
    ),
];

const EMOTIONAL_PATTERNS: PatternTable = &[
    (
        "肯定表現",
        &[r"〜でいいじゃない[!！]", "素晴らしい", r"最高だ[!！]", r"これはいい[!！]", "良いもの", "気に入った"],
    ),
    (
        "否定表現",
        &["〜はクソ", "まぁ、〜だが", "残念ながら", "いまいち", "微妙", "ダメ"],
    ),
    (
        "驚き表現",
        &[r"マジか[!！]", "ちょ、", r"おいおい[、,]", "びっくり", "驚いた", "まさか"],
    ),
    (
        "共感要請",
        &[r"〜だよね[？?]", r"〜じゃん[!！]", r"〜でしょ[？?]", r"〜ですよね[？?]"],
    ),
    (
        "断定型",
        &[r"〜である[。.]", r"〜だ[。.]", "〜に違いない", "間違いなく", "確実に"],
    ),
];

const STRUCTURAL_PATTERNS: PatternTable = &[
    (
        "導入部",
        &[r"^です、おはこんにちばんわ[!！]", r"^さて[、,]", r"^というわけで[、,]", "^今回は", "^本日は"],
    ),
    (
        "結論部",
        &["まとめると", "結論としては", r"つまり[、,]", r"ということで[、,]", r"以上[、,]"],
    ),
    (
        "補足部",
        &[r"ちなみに[、,]", r"余談ですが[、,]", "蛇足ながら", "ついでに言うと", "補足すると"],
    ),
    (
        "引用・参照",
        &[r"〜によれば[、,]", "〜の言葉を借りれば", "参考：", "引用：", "出典："],
    ),
    (
        "列挙型",
        &["[①②③④⑤⑥⑦⑧⑨⑩]", r"[1-9]\.", "・", "- ", r"\* "],
    ),
];

struct CompiledPattern {
    pattern_type: PatternType,
    name: &'static str,
    sources: &'static [&'static str],
    regexes: Vec<Regex>,
}

static LIBRARY: Lazy<Vec<CompiledPattern>> = Lazy::new(|| {
    PatternType::ALL
        .iter()
        .flat_map(|pattern_type| {
            table_for(*pattern_type)
                .iter()
                .map(move |&(name, sources)| CompiledPattern {
                    pattern_type: *pattern_type,
                    name,
                    sources,
                    regexes: sources
                        .iter()
                        .map(|source| {
                            Regex::new(&format!("(?m){source}")).expect("valid pattern regex")
                        })
                        .collect(),
                })
        })
        .collect()
});

fn table_for(pattern_type: PatternType) -> PatternTable {
    match pattern_type {
        PatternType::Logical => LOGICAL_PATTERNS,
        PatternType::Emotional => EMOTIONAL_PATTERNS,
        PatternType::Structural => STRUCTURAL_PATTERNS,
    }
}

/// Contexts matched for one named pattern in one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub name: &'static str,
    pub examples: Vec<String>,
}

/// Result of a corpus analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternAnalysis {
    pub articles_analyzed: usize,
    /// Grouped by type, in library order within each type.
    pub patterns: Vec<WritingPattern>,
}

impl PatternAnalysis {
    pub fn of_type(&self, pattern_type: PatternType) -> impl Iterator<Item = &WritingPattern> {
        self.patterns
            .iter()
            .filter(move |pattern| pattern.pattern_type == pattern_type)
    }
}

/// Finds the `pattern_type` patterns present in `content`.
///
/// Each match yields the trimmed text from 20 characters before it to 20
/// characters after it; at most five per pattern are kept.
pub fn extract_patterns(content: &str, pattern_type: PatternType) -> Vec<PatternMatch> {
    LIBRARY
        .iter()
        .filter(|pattern| pattern.pattern_type == pattern_type)
        .filter_map(|pattern| {
            let examples = pattern
                .regexes
                .iter()
                .flat_map(|regex| regex.find_iter(content))
                .take(MAX_EXAMPLES_PER_ARTICLE)
                .map(|found| context_around(content, found.start(), found.end()))
                .collect::<Vec<_>>();
            (!examples.is_empty()).then_some(PatternMatch {
                name: pattern.name,
                examples,
            })
        })
        .collect()
}

/// Aggregates pattern matches across article bodies.
pub fn aggregate_patterns(sources: &[PatternSource]) -> Vec<WritingPattern> {
    let per_article = sources
        .par_iter()
        .map(|source| {
            PatternType::ALL
                .iter()
                .flat_map(|pattern_type| extract_patterns(&source.content, *pattern_type))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut patterns = Vec::new();
    for compiled in LIBRARY.iter() {
        let mut occurrences = 0u32;
        let mut seen = HashSet::new();
        let mut examples = Vec::new();

        for found in per_article
            .iter()
            .flatten()
            .filter(|found| found.name == compiled.name)
        {
            occurrences += found.examples.len() as u32;
            for example in &found.examples {
                if examples.len() < MAX_STORED_EXAMPLES && seen.insert(example.as_str()) {
                    examples.push(example.clone());
                }
            }
        }

        if occurrences > 0 {
            patterns.push(WritingPattern {
                pattern_type: compiled.pattern_type,
                pattern_name: compiled.name.to_string(),
                pattern: compiled.sources.join("|"),
                examples,
                occurrences,
            });
        }
    }
    patterns
}

/// Analyzes the best-rated articles of the store.
pub fn analyze_corpus<R: PatternRepository>(
    repo: &R,
    min_elo: i64,
    limit: u32,
) -> RepoResult<PatternAnalysis> {
    let sources = repo.list_sources(min_elo, limit)?;
    let patterns = aggregate_patterns(&sources);
    info!(
        "event=pattern_analysis module=patterns status=ok articles={} patterns={} min_elo={}",
        sources.len(),
        patterns.len(),
        min_elo
    );
    Ok(PatternAnalysis {
        articles_analyzed: sources.len(),
        patterns,
    })
}

/// Replaces the stored patterns with `analysis`.
pub fn save_patterns<R: PatternRepository>(
    repo: &mut R,
    analysis: &PatternAnalysis,
) -> RepoResult<()> {
    repo.replace_patterns(&analysis.patterns)?;
    info!(
        "event=pattern_save module=patterns status=ok patterns={}",
        analysis.patterns.len()
    );
    Ok(())
}

fn context_around(content: &str, start: usize, end: usize) -> String {
    let before_start = content[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_RADIUS - 1)
        .map_or(0, |(index, _)| index);
    let after_end = content[end..]
        .char_indices()
        .nth(CONTEXT_RADIUS)
        .map_or(content.len(), |(index, _)| end + index);
    content[before_start..after_end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{aggregate_patterns, context_around, extract_patterns, LIBRARY};
    use crate::model::pattern::PatternType;
    use crate::repo::pattern_repo::PatternSource;

    fn source(id: &str, content: &str) -> PatternSource {
        PatternSource {
            id: id.to_string(),
            title: id.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn library_covers_every_type() {
        for pattern_type in PatternType::ALL {
            assert_eq!(
                LIBRARY
                    .iter()
                    .filter(|pattern| pattern.pattern_type == pattern_type)
                    .count(),
                5
            );
        }
    }

    #[test]
    fn context_is_twenty_characters_each_side() {
        let content = format!("{}要するに{}", "あ".repeat(30), "い".repeat(30));
        let start = content.find("要するに").unwrap();
        let context = context_around(&content, start, start + "要するに".len());
        assert_eq!(
            context,
            format!("{}要するに{}", "あ".repeat(20), "い".repeat(20))
        );
    }

    #[test]
    fn context_is_clipped_at_text_edges() {
        let content = "要するにそういうこと";
        let context = context_around(content, 0, "要するに".len());
        assert_eq!(context, content);
    }

    #[test]
    fn extraction_caps_examples_per_article() {
        let content = "まず、".repeat(8);
        let found = extract_patterns(&content, PatternType::Logical);
        let staged = found
            .iter()
            .find(|found| found.name == "段階的展開")
            .unwrap();
        assert_eq!(staged.examples.len(), 5);
    }

    #[test]
    fn line_anchored_patterns_match_each_line() {
        let found = extract_patterns("前置き\nさて、本題です", PatternType::Structural);
        assert!(found.iter().any(|found| found.name == "導入部"));

        let found = extract_patterns("前置き、さて、本題です", PatternType::Structural);
        assert!(!found.iter().any(|found| found.name == "導入部"));
    }

    #[test]
    fn aggregation_counts_and_dedupes_examples() {
        let sources = [
            source("a", "正直な話、これは良いもの"),
            source("b", "正直な話、これは良いもの"),
            source("c", "特に何もない"),
        ];
        let patterns = aggregate_patterns(&sources);

        let blunt = patterns
            .iter()
            .find(|pattern| pattern.pattern_name == "極論前置き型")
            .unwrap();
        assert_eq!(blunt.pattern_type, PatternType::Logical);
        assert_eq!(blunt.occurrences, 2);
        assert_eq!(blunt.examples.len(), 1);
        assert!(blunt.pattern.contains("正直な話|端的に言えば"));

        assert!(patterns
            .iter()
            .all(|pattern| pattern.pattern_name != "驚き表現"));
    }
}
