use corpus_core::db::open_db_in_memory;
use corpus_core::model::pattern::PatternType;
use corpus_core::repo::pattern_repo::{PatternRepository, SqlitePatternRepository};
use corpus_core::service::patterns::{analyze_corpus, save_patterns};
use corpus_core::{Article, ArticleRepository, SqliteArticleRepository};
use rusqlite::Connection;

fn insert(conn: &Connection, id: &str, elo: i64, content: Option<&str>) {
    let repo = SqliteArticleRepository::try_new(conn).unwrap();
    let mut article = Article::new(id, id, "2010-01-01");
    article.content = content.map(str::to_string);
    repo.upsert_article(&article).unwrap();
    repo.set_elo_rating(id, elo).unwrap();
}

fn seeded() -> Connection {
    let conn = open_db_in_memory().unwrap();
    insert(
        &conn,
        "fc2_2010-01-01_001",
        1580,
        Some("正直な話、この作品は素晴らしい。\nさて、次の話題です。"),
    );
    insert(
        &conn,
        "fc2_2010-01-01_002",
        1530,
        Some("要するに、素晴らしいものは素晴らしい。"),
    );
    insert(&conn, "fc2_2010-01-01_003", 1400, Some("正直な話、低評価の記事。"));
    insert(&conn, "fc2_2010-01-01_004", 1600, None);
    conn
}

#[test]
fn analysis_only_reads_rated_articles_with_content() {
    let mut conn = seeded();
    let repo = SqlitePatternRepository::try_new(&mut conn).unwrap();

    let analysis = analyze_corpus(&repo, 1500, 100).unwrap();
    assert_eq!(analysis.articles_analyzed, 2);

    let blunt = analysis
        .of_type(PatternType::Logical)
        .find(|pattern| pattern.pattern_name == "極論前置き型")
        .unwrap();
    assert_eq!(blunt.occurrences, 2);

    let praise = analysis
        .of_type(PatternType::Emotional)
        .find(|pattern| pattern.pattern_name == "肯定表現")
        .unwrap();
    assert_eq!(praise.occurrences, 3);

    assert!(analysis
        .of_type(PatternType::Structural)
        .any(|pattern| pattern.pattern_name == "導入部"));
}

#[test]
fn analysis_limit_takes_best_rated_first() {
    let mut conn = seeded();
    let repo = SqlitePatternRepository::try_new(&mut conn).unwrap();

    let analysis = analyze_corpus(&repo, 1500, 1).unwrap();
    assert_eq!(analysis.articles_analyzed, 1);
    assert!(analysis
        .patterns
        .iter()
        .all(|pattern| !pattern.examples.iter().any(|example| example.contains("要するに"))));
}

#[test]
fn saved_patterns_round_trip_and_replace() {
    let mut conn = seeded();
    let mut repo = SqlitePatternRepository::try_new(&mut conn).unwrap();

    let analysis = analyze_corpus(&repo, 1500, 100).unwrap();
    save_patterns(&mut repo, &analysis).unwrap();

    let stored = repo.list_patterns().unwrap();
    assert_eq!(stored.len(), analysis.patterns.len());
    for pattern in &analysis.patterns {
        assert!(stored.contains(pattern), "missing {}", pattern.pattern_name);
    }

    let narrower = analyze_corpus(&repo, 1590, 100).unwrap();
    assert_eq!(narrower.articles_analyzed, 0);
    save_patterns(&mut repo, &narrower).unwrap();
    assert!(repo.list_patterns().unwrap().is_empty());
}
