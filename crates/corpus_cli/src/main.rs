//! `writing-corpus` command-line entry point.
//!
//! # Responsibility
//! - Resolve the project layout, start logging, open the store.
//! - Map each subcommand onto one core use case and print its report.

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use corpus_core::db::{open_db, open_existing_db};
use corpus_core::repo::comparison_repo::{
    ComparisonRepository, SqliteComparisonRepository, HIGH_ELO, MEDIUM_ELO,
};
use corpus_core::repo::pattern_repo::SqlitePatternRepository;
use corpus_core::repo::stats_repo::load_statistics;
use corpus_core::service::dashboard::{render_dashboard, write_dashboard};
use corpus_core::service::elo_sync::{load_comparisons, sync_elo};
use corpus_core::service::ingest::ingest_directory;
use corpus_core::service::patterns::{
    analyze_corpus, save_patterns, DEFAULT_ANALYSIS_LIMIT, DEFAULT_MIN_ELO,
};
use corpus_core::service::sampler::{
    format_articles, SampleCriteria, SampleFormat, Sampler, DEFAULT_SAMPLE_LIMIT,
};
use corpus_core::service::scoring_service::write_candidate_files;
use corpus_core::{
    default_log_level, init_logging, search_articles, ArticleOrder, CategoryFilter,
    CorpusConfig, RewriteType, ScoringService, SearchQuery, SqliteArticleRepository,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "writing-corpus",
    version,
    about = "Score, sample and report on the blog article corpus"
)]
struct Cli {
    /// Project root holding data/, docs/ and logs/
    #[arg(long, env = "WRITING_CORPUS_ROOT", default_value = ".", global = true)]
    root: PathBuf,
    /// trace|debug|info|warn|error (default: debug in debug builds, info otherwise)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import markdown posts into the store
    Ingest {
        /// Directory to scan (default: data/raw/fc2_extracted)
        dir: Option<PathBuf>,
    },
    /// Re-score every article and export bucket candidate lists
    Score {
        /// Skip writing the candidate JSON files
        #[arg(long)]
        no_export: bool,
        /// Candidate list directory (default: data/processed)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Select articles by criteria, at random, or per category
    Sample {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_score: Option<u32>,
        #[arg(long)]
        min_quality: Option<f64>,
        #[arg(long)]
        min_elo: Option<i64>,
        /// timelessness_capsule|cultural_extraction|philosophical_elevation
        #[arg(long = "type", value_parser = parse_rewrite_type)]
        rewrite_type: Option<RewriteType>,
        #[arg(long)]
        year_from: Option<i32>,
        #[arg(long)]
        year_to: Option<i32>,
        /// rewrite_score|elo_rating|word_count|date|year
        #[arg(long, default_value = "rewrite_score", value_parser = parse_order)]
        order_by: ArticleOrder,
        #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_LIMIT)]
        limit: u32,
        /// Random sample instead of criteria filtering
        #[arg(long, conflicts_with = "top_by_category")]
        random: bool,
        /// Seed for a reproducible random sample
        #[arg(long, requires = "random")]
        seed: Option<u64>,
        /// Best articles per category; `--limit` applies per category
        #[arg(long)]
        top_by_category: bool,
        /// json|simple|markdown
        #[arg(long, default_value = "simple", value_parser = parse_format)]
        format: SampleFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Full-text search over title, category and body
    Search {
        query: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: u32,
        /// Pass the query to FTS5 unescaped
        #[arg(long)]
        raw: bool,
    },
    /// Import ELO ratings and comparisons from the evaluation tool
    SyncElo {
        /// Report changes without writing
        #[arg(long)]
        dry_run: bool,
        /// Comparisons file (default: ~/.llms/article-comparisons.json)
        #[arg(long)]
        comparisons_file: Option<PathBuf>,
    },
    /// Extract writing-style patterns from the best-rated articles
    Patterns {
        #[arg(long, default_value_t = DEFAULT_MIN_ELO)]
        min_elo: i64,
        #[arg(short = 'n', long, default_value_t = DEFAULT_ANALYSIS_LIMIT)]
        limit: u32,
        /// Print the summary without replacing stored patterns
        #[arg(long)]
        summary_only: bool,
    },
    /// Regenerate the Markdown dashboard
    Dashboard {
        /// Output file (default: docs/dashboard.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print corpus statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CorpusConfig::new(&cli.root).context("invalid project root")?;
    let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
    init_logging(level, &config.log_dir()).context("failed to initialize logging")?;

    match cli.command {
        Commands::Ingest { dir } => run_ingest(&config, dir),
        Commands::Score {
            no_export,
            output_dir,
        } => run_score(&config, no_export, output_dir),
        Commands::Sample {
            category,
            min_score,
            min_quality,
            min_elo,
            rewrite_type,
            year_from,
            year_to,
            order_by,
            limit,
            random,
            seed,
            top_by_category,
            format,
            output,
        } => {
            let conn = open_existing_db(config.db_path())?;
            let sampler = Sampler::new(SqliteArticleRepository::try_new(&conn)?);

            let articles = if random {
                sampler.random_sample(limit, seed)?
            } else if top_by_category {
                sampler
                    .top_by_category(limit)?
                    .into_iter()
                    .flat_map(|group| group.articles)
                    .collect()
            } else {
                sampler.sample_by_criteria(&SampleCriteria {
                    category,
                    min_rewrite_score: min_score,
                    min_quality_score: min_quality,
                    min_elo,
                    rewrite_type,
                    year_from,
                    year_to,
                    order_by,
                    limit,
                })?
            };

            let text = format_articles(&articles, format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("{} articles written to {}", articles.len(), path.display());
                }
                None => println!("{text}"),
            }
            Ok(())
        }
        Commands::Search {
            query,
            category,
            limit,
            raw,
        } => {
            let conn = open_existing_db(config.db_path())?;
            let mut search = SearchQuery::new(query);
            search.category = category.map_or(CategoryFilter::Any, CategoryFilter::Named);
            search.limit = limit;
            search.raw_fts_syntax = raw;

            let hits = search_articles(&conn, &search)?;
            for hit in &hits {
                println!("{}  {}\n    {}", hit.article_id, hit.title, hit.snippet);
            }
            println!("{} hits", hits.len());
            Ok(())
        }
        Commands::SyncElo {
            dry_run,
            comparisons_file,
        } => {
            let config = match comparisons_file {
                Some(path) => config.with_comparisons_path(path),
                None => config,
            };
            let mut conn = open_existing_db(config.db_path())?;
            let data = load_comparisons(config.comparisons_path())?;
            let report = sync_elo(&mut conn, &data, dry_run)?;

            for change in &report.updated {
                println!(
                    "{}: ELO {} -> {} ({} comparisons)",
                    change.id, change.old_elo, change.new_elo, change.comparison_count
                );
            }
            for id in &report.missing {
                println!("article not found: {id}");
            }
            let verb = if dry_run { "would update" } else { "updated" };
            println!(
                "{verb} {} ratings, {} new comparisons of {} considered",
                report.updated.len(),
                report.comparisons_inserted,
                report.comparisons_considered
            );

            if !dry_run {
                let comparisons = SqliteComparisonRepository::try_new(&conn)?;
                let distribution = comparisons.elo_distribution()?;
                println!(
                    "ELO: avg {} min {} max {}",
                    distribution
                        .avg_elo
                        .map_or_else(|| "n/a".to_string(), |avg| format!("{avg:.1}")),
                    distribution
                        .min_elo
                        .map_or_else(|| "n/a".to_string(), |min| min.to_string()),
                    distribution
                        .max_elo
                        .map_or_else(|| "n/a".to_string(), |max| max.to_string())
                );
                println!(
                    "  high (>= {HIGH_ELO}): {}\n  medium ({MEDIUM_ELO}-{}): {}\n  low (< {MEDIUM_ELO}): {}",
                    distribution.high,
                    HIGH_ELO - 1,
                    distribution.medium,
                    distribution.low
                );
                println!("comparisons stored: {}", comparisons.count_comparisons()?);
            }
            Ok(())
        }
        Commands::Patterns {
            min_elo,
            limit,
            summary_only,
        } => {
            let mut conn = open_existing_db(config.db_path())?;
            let mut repo = SqlitePatternRepository::try_new(&mut conn)?;
            let analysis = analyze_corpus(&repo, min_elo, limit)?;

            println!(
                "analyzed {} articles (ELO >= {min_elo})",
                analysis.articles_analyzed
            );
            for pattern in &analysis.patterns {
                println!(
                    "  [{}] {}: {}",
                    pattern.pattern_type.as_str(),
                    pattern.pattern_name,
                    pattern.occurrences
                );
            }

            if summary_only {
                println!("summary only, stored patterns left unchanged");
            } else {
                save_patterns(&mut repo, &analysis)?;
                println!("stored {} patterns", analysis.patterns.len());
            }
            Ok(())
        }
        Commands::Dashboard { output } => {
            let conn = open_existing_db(config.db_path())?;
            let stats = load_statistics(&conn)?;
            let markdown = render_dashboard(&stats, &Local::now());
            let path = output.unwrap_or_else(|| config.dashboard_path());
            write_dashboard(&path, &markdown)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("dashboard written to {}", path.display());
            Ok(())
        }
        Commands::Stats { json } => {
            let conn = open_existing_db(config.db_path())?;
            let stats = load_statistics(&conn)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!("articles: {} ({} unscored)", stats.total, stats.unscored);
            for (bucket, count) in &stats.by_bucket {
                println!("  {bucket}: {count}");
            }
            for (status, count) in &stats.by_status {
                println!("  {}: {count}", status.as_str());
            }
            for year in &stats.by_year {
                let label = year
                    .year
                    .map_or_else(|| "unknown".to_string(), |year| year.to_string());
                println!("  {label}: {}", year.count);
            }
            Ok(())
        }
    }
}

fn run_ingest(config: &CorpusConfig, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let dir = dir.unwrap_or_else(|| config.raw_articles_dir());
    let conn = open_db(config.db_path())?;
    let repo = SqliteArticleRepository::try_new(&conn)?;
    let report = ingest_directory(&repo, &dir)?;

    for (path, message) in &report.skipped {
        println!("skipped {}: {message}", path.display());
    }
    println!(
        "ingested {} of {} markdown files",
        report.upserted, report.discovered
    );
    Ok(())
}

fn run_score(
    config: &CorpusConfig,
    no_export: bool,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let conn = open_existing_db(config.db_path())?;
    let service = ScoringService::new(SqliteArticleRepository::try_new(&conn)?);
    let report = service.rescore_all()?;

    let classification = &report.classification;
    println!(
        "scored {} articles, persisted {}",
        report.scored, report.persisted
    );
    println!(
        "  rewrite: {}\n  review: {}\n  archive: {}\n  deletion: {}",
        classification.rewrite.len(),
        classification.review.len(),
        classification.archive.len(),
        classification.deletion.len()
    );

    if !no_export {
        let dir = output_dir.unwrap_or_else(|| config.processed_dir());
        let written = write_candidate_files(classification, &dir)
            .with_context(|| format!("failed to write candidates to {}", dir.display()))?;
        info!(
            "event=score_export module=cli status=ok files={}",
            written.len()
        );
        println!("candidate lists written to {}", dir.display());
    }

    if report.has_failures() {
        for (id, message) in &report.failed {
            eprintln!("failed to persist {id}: {message}");
        }
        bail!("{} articles failed to persist", report.failed.len());
    }
    Ok(())
}

fn parse_rewrite_type(value: &str) -> Result<RewriteType, String> {
    RewriteType::parse(value).ok_or_else(|| format!("unknown rewrite type `{value}`"))
}

fn parse_order(value: &str) -> Result<ArticleOrder, String> {
    ArticleOrder::parse(value).ok_or_else(|| format!("unknown order `{value}`"))
}

fn parse_format(value: &str) -> Result<SampleFormat, String> {
    SampleFormat::parse(value).ok_or_else(|| format!("unknown format `{value}`"))
}
