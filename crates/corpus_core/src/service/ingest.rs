//! Markdown article ingestion.
//!
//! # Responsibility
//! - Parse exported blog posts (frontmatter + body) into article records.
//! - Upsert them into the corpus store without touching scores or ratings.
//!
//! # Invariants
//! - Article ids are `fc2_{date}_{original_id}` with the id zero-padded to
//!   three digits.
//! - Word count is the number of non-whitespace characters in the body.
//! - One unreadable or invalid file never aborts the run.

use crate::model::article::{Article, ArticleId};
use crate::repo::article_repo::ArticleRepository;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prefix shared by every article id produced by ingestion.
pub const ARTICLE_ID_PREFIX: &str = "fc2_";

static FRONTMATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\n(.*?)\n---\n").expect("valid frontmatter regex"));
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"【(.+?)】").expect("valid category regex"));

/// Ingestion failure that prevents the run from starting.
#[derive(Debug)]
pub enum IngestError {
    MissingDirectory(PathBuf),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDirectory(path) => {
                write!(f, "article directory not found: {}", path.display())
            }
        }
    }
}

impl Error for IngestError {}

/// Tally of one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Markdown files found under the directory.
    pub discovered: usize,
    /// Articles written to the store.
    pub upserted: usize,
    /// `(path, error message)` for each file that was skipped.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Parses the leading `---` block into `key -> value` pairs.
///
/// Values are trimmed and stripped of surrounding quotes. Returns an empty
/// map when the text has no frontmatter.
pub fn parse_frontmatter(text: &str) -> BTreeMap<String, String> {
    let Some(captures) = FRONTMATTER_RE.captures(text) else {
        return BTreeMap::new();
    };

    captures[1]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Returns the text after the frontmatter block.
pub fn strip_frontmatter(text: &str) -> &str {
    match FRONTMATTER_RE.find(text) {
        Some(found) => &text[found.end()..],
        None => text,
    }
}

/// Returns the first `【…】` group of a title.
pub fn extract_category(title: &str) -> Option<String> {
    CATEGORY_RE
        .captures(title)
        .map(|captures| captures[1].to_string())
}

/// Counts non-whitespace characters outside the frontmatter.
pub fn count_words(text: &str) -> u32 {
    let count = strip_frontmatter(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Builds the stable article id.
pub fn article_id(date: &str, original_id: &str) -> ArticleId {
    format!("{ARTICLE_ID_PREFIX}{date}_{original_id:0>3}")
}

/// Builds an article record from one markdown file's text.
///
/// `relative_path` is stored as the article's `file_path`; its stem is the
/// fallback title.
pub fn build_article(relative_path: &Path, text: &str) -> Article {
    let frontmatter = parse_frontmatter(text);

    let title = frontmatter.get("title").cloned().unwrap_or_else(|| {
        relative_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let date = frontmatter.get("date").cloned().unwrap_or_default();
    let original_id = frontmatter
        .get("original_id")
        .map(String::as_str)
        .unwrap_or("0");

    let mut article = Article::new(article_id(&date, original_id), title, date);
    article.category = extract_category(&article.title);
    article.word_count = Some(count_words(text));
    article.file_path = relative_path.to_string_lossy().into_owned();
    article.content = Some(strip_frontmatter(text).trim().to_string());
    article
}

/// Ingests every `*.md` file under `dir`, in path order.
///
/// # Errors
/// - Returns [`IngestError::MissingDirectory`] when `dir` is not a directory.
///   Per-file read and store failures are reported in
///   [`IngestReport::skipped`].
pub fn ingest_directory<R: ArticleRepository>(
    repo: &R,
    dir: &Path,
) -> Result<IngestReport, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory(dir.to_path_buf()));
    }

    info!(
        "event=ingest module=ingest status=start dir={}",
        dir.display()
    );

    let mut report = IngestReport::default();
    let walker = WalkDir::new(dir).sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                warn!(
                    "event=ingest_file module=ingest status=error path={} error={}",
                    path.display(),
                    err
                );
                report.skipped.push((path, err.to_string()));
                continue;
            }
        };

        let path = entry.path();
        let is_markdown = path.extension().and_then(|ext| ext.to_str()) == Some("md");
        if !entry.file_type().is_file() || !is_markdown {
            continue;
        }
        report.discovered += 1;

        match ingest_file(repo, dir, path) {
            Ok(()) => report.upserted += 1,
            Err(message) => {
                warn!(
                    "event=ingest_file module=ingest status=error path={} error={}",
                    path.display(),
                    message
                );
                report.skipped.push((path.to_path_buf(), message));
            }
        }
    }

    info!(
        "event=ingest module=ingest status=ok discovered={} upserted={} skipped={}",
        report.discovered,
        report.upserted,
        report.skipped.len()
    );
    Ok(report)
}

fn ingest_file<R: ArticleRepository>(repo: &R, base: &Path, path: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    let relative = path.strip_prefix(base).unwrap_or(path);
    let article = build_article(relative, &text);
    repo.upsert_article(&article).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{article_id, build_article, count_words, extract_category, parse_frontmatter};
    use std::path::Path;

    const POST: &str = "---\ntitle: \"【ゲーム】懐かしの名作\"\ndate: 2008-05-03\noriginal_id: 7\n---\n今日は 名作の話。\n\nおわり\n";

    #[test]
    fn frontmatter_values_are_unquoted() {
        let fields = parse_frontmatter(POST);
        assert_eq!(fields["title"], "【ゲーム】懐かしの名作");
        assert_eq!(fields["date"], "2008-05-03");
        assert_eq!(fields["original_id"], "7");
    }

    #[test]
    fn missing_frontmatter_yields_empty_map() {
        assert!(parse_frontmatter("no header here").is_empty());
    }

    #[test]
    fn category_is_first_lenticular_group() {
        assert_eq!(
            extract_category("【映画】【雑記】タイトル").as_deref(),
            Some("映画")
        );
        assert_eq!(extract_category("plain title"), None);
    }

    #[test]
    fn word_count_skips_frontmatter_and_whitespace() {
        assert_eq!(count_words(POST), "今日は名作の話。おわり".chars().count() as u32);
    }

    #[test]
    fn article_id_pads_original_id() {
        assert_eq!(article_id("2008-05-03", "7"), "fc2_2008-05-03_007");
        assert_eq!(article_id("2008-05-03", "1234"), "fc2_2008-05-03_1234");
    }

    #[test]
    fn build_article_fills_descriptive_fields() {
        let article = build_article(Path::new("2008/post.md"), POST);
        assert_eq!(article.id, "fc2_2008-05-03_007");
        assert_eq!(article.year, Some(2008));
        assert_eq!(article.category.as_deref(), Some("ゲーム"));
        assert_eq!(article.file_path, "2008/post.md");
        assert_eq!(article.content.as_deref(), Some("今日は 名作の話。\n\nおわり"));
        assert!(!article.is_scored());
    }

    #[test]
    fn build_article_falls_back_to_file_stem() {
        let article = build_article(Path::new("untitled.md"), "body only");
        assert_eq!(article.title, "untitled");
        assert_eq!(article.id, "fc2__000");
        assert_eq!(article.year, None);
    }
}
