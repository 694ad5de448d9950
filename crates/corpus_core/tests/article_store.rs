use corpus_core::db::open_db_in_memory;
use corpus_core::{
    score_article, Article, ArticleListQuery, ArticleOrder, ArticleRepository,
    ArticleValidationError, AxisScores, Bucket, CategoryFilter, RepoError, RewriteType,
    ScoringInput, SqliteArticleRepository,
};
use rusqlite::Connection;

fn article(id: &str, title: &str, date: &str, category: Option<&str>, words: u32) -> Article {
    let mut article = Article::new(id, title, date);
    article.category = category.map(str::to_string);
    article.word_count = Some(words);
    article.content = Some(format!("{title} body"));
    article
}

#[test]
fn upsert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let original = article(
        "fc2_2008-05-03_007",
        "【徒然】日記",
        "2008-05-03",
        Some("徒然"),
        150,
    );
    repo.upsert_article(&original).unwrap();

    let loaded = repo.get_article(&original.id).unwrap().unwrap();
    assert_eq!(loaded, original);
    assert!(!loaded.is_scored());
}

#[test]
fn get_missing_article_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();
    assert!(repo.get_article("fc2_missing").unwrap().is_none());
}

#[test]
fn upsert_rejects_invalid_articles() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let blank = Article::new("  ", "title", "2008-01-01");
    assert!(matches!(
        repo.upsert_article(&blank),
        Err(RepoError::Validation(ArticleValidationError::EmptyId))
    ));

    let mut mismatched = Article::new("fc2_2008-01-01_001", "title", "2008-01-01");
    mismatched.year = Some(2012);
    assert!(matches!(
        repo.upsert_article(&mismatched),
        Err(RepoError::Validation(ArticleValidationError::YearDateMismatch { .. }))
    ));
}

#[test]
fn persist_scores_writes_every_score_column() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let fan_work = article(
        "fc2_2012-04-01_100",
        "【東方二次創作】回顧録",
        "2012-04-01",
        Some("東方二次創作"),
        2500,
    );
    repo.upsert_article(&fan_work).unwrap();

    let card = score_article(&ScoringInput::from(&fan_work));
    repo.persist_scores(&fan_work.id, &card).unwrap();

    let loaded = repo.get_article(&fan_work.id).unwrap().unwrap();
    assert_eq!(loaded.rewrite_score, Some(76));
    assert_eq!(loaded.axis_scores, Some(AxisScores::new(22, 18, 18, 10, 8)));
    assert_eq!(loaded.rewrite_type, Some(RewriteType::CulturalExtraction));
    assert_eq!(loaded.rewrite_bucket, Some(Bucket::Rewrite));
}

#[test]
fn persist_scores_overwrites_previous_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let mut post = article(
        "fc2_2012-04-01_100",
        "【東方二次創作】回顧録",
        "2012-04-01",
        Some("東方二次創作"),
        2500,
    );
    repo.upsert_article(&post).unwrap();
    repo.persist_scores(&post.id, &score_article(&ScoringInput::from(&post)))
        .unwrap();

    post.category = None;
    post.word_count = Some(100);
    repo.upsert_article(&post).unwrap();
    repo.persist_scores(&post.id, &score_article(&ScoringInput::from(&post)))
        .unwrap();

    let loaded = repo.get_article(&post.id).unwrap().unwrap();
    assert_eq!(loaded.axis_scores, Some(AxisScores::new(10, 8, 4, 5, 8)));
    assert_eq!(loaded.rewrite_score, Some(35));
    assert_eq!(loaded.rewrite_type, None);
    assert_eq!(loaded.rewrite_bucket, Some(Bucket::Archive));
}

#[test]
fn persist_scores_for_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let ghost = article("fc2_ghost", "ghost", "2008-01-01", None, 10);
    let card = score_article(&ScoringInput::from(&ghost));
    let err = repo.persist_scores(&ghost.id, &card).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ref id) if id == "fc2_ghost"));
}

#[test]
fn upsert_keeps_scores_and_ratings() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let mut post = article("fc2_2009-01-01_001", "【考察】論", "2009-01-01", Some("考察"), 900);
    repo.upsert_article(&post).unwrap();
    let card = score_article(&ScoringInput::from(&post));
    repo.persist_scores(&post.id, &card).unwrap();
    repo.set_elo_rating(&post.id, 1560).unwrap();

    post.title = "【考察】論（改題）".to_string();
    post.elo_rating = 1500;
    repo.upsert_article(&post).unwrap();

    let loaded = repo.get_article(&post.id).unwrap().unwrap();
    assert_eq!(loaded.title, "【考察】論（改題）");
    assert_eq!(loaded.elo_rating, 1560);
    assert_eq!(loaded.rewrite_score, Some(card.composite));
    assert_eq!(loaded.axis_scores, Some(card.axes));
}

#[test]
fn list_articles_applies_filters_and_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let posts = [
        article("fc2_2008-01-01_001", "a", "2008-01-01", Some("徒然"), 100),
        article("fc2_2010-01-01_002", "b", "2010-01-01", Some("徒然"), 3000),
        article("fc2_2012-01-01_003", "c", "2012-01-01", Some("考察"), 1500),
        article("fc2_2014-01-01_004", "d", "2014-01-01", None, 800),
    ];
    for post in &posts {
        repo.upsert_article(post).unwrap();
        let card = score_article(&ScoringInput::from(post));
        repo.persist_scores(&post.id, &card).unwrap();
    }

    let essays = repo
        .list_articles(&ArticleListQuery {
            category: CategoryFilter::Named("徒然".to_string()),
            order_by: ArticleOrder::WordCount,
            ..ArticleListQuery::default()
        })
        .unwrap();
    let ids = essays.iter().map(|a| a.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["fc2_2010-01-01_002", "fc2_2008-01-01_001"]);

    let uncategorized = repo
        .list_articles(&ArticleListQuery {
            category: CategoryFilter::Uncategorized,
            ..ArticleListQuery::default()
        })
        .unwrap();
    assert_eq!(uncategorized.len(), 1);
    assert_eq!(uncategorized[0].id, "fc2_2014-01-01_004");

    let ranged = repo
        .list_articles(&ArticleListQuery {
            year_from: Some(2010),
            year_to: Some(2012),
            order_by: ArticleOrder::Year,
            limit: Some(1),
            ..ArticleListQuery::default()
        })
        .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].id, "fc2_2012-01-01_003");

    let by_score = repo.list_articles(&ArticleListQuery::default()).unwrap();
    let scores = by_score
        .iter()
        .map(|a| a.rewrite_score.unwrap())
        .collect::<Vec<_>>();
    let mut sorted = scores.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(scores, sorted);
}

#[test]
fn list_categories_includes_uncategorized_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    repo.upsert_article(&article("fc2_a", "a", "2008-01-01", Some("考察"), 1))
        .unwrap();
    repo.upsert_article(&article("fc2_b", "b", "2008-01-01", None, 1))
        .unwrap();
    repo.upsert_article(&article("fc2_c", "c", "2008-01-01", Some("考察"), 1))
        .unwrap();

    assert_eq!(
        repo.list_categories().unwrap(),
        vec![None, Some("考察".to_string())]
    );
}

#[test]
fn get_articles_fetches_requested_rows_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();
    for id in ["fc2_a", "fc2_b", "fc2_c"] {
        repo.upsert_article(&article(id, id, "2008-01-01", None, 10))
            .unwrap();
    }

    let requested = ["fc2_c", "fc2_missing", "fc2_a"].map(str::to_string);
    let fetched = repo.get_articles(&requested).unwrap();
    let ids = fetched.iter().map(|a| a.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["fc2_a", "fc2_c"]);
    assert_eq!(fetched[1].content.as_deref(), Some("fc2_c body"));

    assert!(repo.get_articles(&[]).unwrap().is_empty());
}

#[test]
fn scoring_rows_skip_damaged_score_columns() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let post = article("fc2_2008-01-01_001", "a", "2008-01-01", Some("考察"), 100);
    repo.upsert_article(&post).unwrap();
    conn.execute(
        "UPDATE articles SET score_risk = 99 WHERE id = ?1;",
        [post.id.as_str()],
    )
    .unwrap();

    let rows = repo.load_scoring_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, post.id);
    assert_eq!(rows[0].category.as_deref(), Some("考察"));
    assert_eq!(rows[0].word_count, Some(100));
    assert_eq!(
        repo.get_scoring_row(&post.id).unwrap().as_ref(),
        rows.first()
    );
    assert!(repo.get_scoring_row("fc2_missing").unwrap().is_none());
}

#[test]
fn partially_scored_row_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let post = article("fc2_2008-01-01_001", "a", "2008-01-01", None, 100);
    repo.upsert_article(&post).unwrap();
    repo.persist_scores(&post.id, &score_article(&ScoringInput::from(&post)))
        .unwrap();
    conn.execute(
        "UPDATE articles SET score_risk = NULL WHERE id = ?1;",
        [post.id.as_str()],
    )
    .unwrap();

    assert!(matches!(
        repo.get_article(&post.id),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteArticleRepository::try_new(&conn),
        Err(RepoError::InvalidData(_))
    ));
}
