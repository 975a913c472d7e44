//! Live integration tests for newspulse-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness; the server must have the PostGIS extension available.
//! The `migrations` path is relative to the crate root (`crates/newspulse-db/`),
//! so `"../../migrations"` resolves to the workspace migration directory.

use chrono::{Duration, Utc};
use newspulse_core::{EventKind, GeoPoint};
use newspulse_db::{
    count_articles, fetch_events_window, find_articles, get_articles_by_ids, insert_event,
    insert_events_batch, list_article_ids, ArticleFilter, DbError, NewEvent, Page, SpatialBound,
};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a minimal article row and return its generated `id`.
async fn insert_test_article(
    pool: &sqlx::PgPool,
    title: &str,
    source: &str,
    categories: &[&str],
    score: Option<f64>,
    location: Option<(f64, f64)>,
) -> Uuid {
    let categories: Vec<String> = categories.iter().map(ToString::to_string).collect();
    match location {
        Some((lat, lon)) => sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO articles \
             (title, description, source_name, categories, relevance_score, publication_date, location) \
             VALUES ($1, $2, $3, $4, $5, NOW(), \
                     ST_SetSRID(ST_MakePoint($6, $7), 4326)::geography) \
             RETURNING id",
        )
        .bind(title)
        .bind(format!("{title} description"))
        .bind(source)
        .bind(&categories)
        .bind(score)
        .bind(lon)
        .bind(lat)
        .fetch_one(pool)
        .await
        .expect("insert article"),
        None => sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO articles \
             (title, description, source_name, categories, relevance_score, publication_date) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING id",
        )
        .bind(title)
        .bind(format!("{title} description"))
        .bind(source)
        .bind(&categories)
        .bind(score)
        .fetch_one(pool)
        .await
        .expect("insert article"),
    }
}

// ---------------------------------------------------------------------------
// Article queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn empty_filter_returns_all_articles(pool: sqlx::PgPool) {
    insert_test_article(&pool, "First", "Reuters", &["World"], Some(0.5), None).await;
    insert_test_article(&pool, "Second", "BBC", &["Sports"], Some(0.9), None).await;

    let articles = find_articles(&pool, &ArticleFilter::default(), Page::default())
        .await
        .expect("find");
    assert_eq!(articles.len(), 2);

    let total = count_articles(&pool, &ArticleFilter::default())
        .await
        .expect("count");
    assert_eq!(total, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn category_filter_matches_array_membership(pool: sqlx::PgPool) {
    insert_test_article(&pool, "Tech story", "Wired", &["Technology", "AI"], None, None).await;
    insert_test_article(&pool, "Match recap", "ESPN", &["Sports"], None, None).await;

    let filter = ArticleFilter {
        category: Some("Technology".to_string()),
        ..ArticleFilter::default()
    };
    let articles = find_articles(&pool, &filter, Page::default())
        .await
        .expect("find");

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Tech story");
}

#[sqlx::test(migrations = "../../migrations")]
async fn source_filter_is_case_insensitive_substring(pool: sqlx::PgPool) {
    insert_test_article(&pool, "One", "Reuters World", &[], None, None).await;
    insert_test_article(&pool, "Two", "BBC", &[], None, None).await;

    let filter = ArticleFilter {
        source_name: Some("reuters".to_string()),
        ..ArticleFilter::default()
    };
    let articles = find_articles(&pool, &filter, Page::default())
        .await
        .expect("find");

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].source_name.as_deref(), Some("Reuters World"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn score_filter_is_inclusive_and_orders_descending(pool: sqlx::PgPool) {
    insert_test_article(&pool, "Low", "A", &[], Some(0.3), None).await;
    insert_test_article(&pool, "Edge", "B", &[], Some(0.7), None).await;
    insert_test_article(&pool, "High", "C", &[], Some(0.95), None).await;

    let filter = ArticleFilter {
        min_score: Some(0.7),
        ..ArticleFilter::default()
    };
    let articles = find_articles(&pool, &filter, Page::default())
        .await
        .expect("find");

    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["High", "Edge"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spatial_filter_returns_articles_within_radius_closest_first(pool: sqlx::PgPool) {
    // Ferry Building and Golden Gate Park are ~8 km apart; New York is not nearby.
    insert_test_article(&pool, "Ferry", "SF Chronicle", &[], None, Some((37.7955, -122.3937)))
        .await;
    insert_test_article(&pool, "Park", "SF Chronicle", &[], None, Some((37.7694, -122.4862)))
        .await;
    insert_test_article(&pool, "Faraway", "NY Post", &[], None, Some((40.7128, -74.0060))).await;

    let filter = ArticleFilter {
        lat: Some(37.7937),
        lon: Some(-122.3965),
        radius_km: Some(20.0),
        ..ArticleFilter::default()
    };
    let articles = find_articles(&pool, &filter, Page::default())
        .await
        .expect("find");

    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Ferry", "Park"]);
    assert!(articles[0].latitude.is_some());
    assert!(articles[0].longitude.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn full_text_search_matches_title_and_description(pool: sqlx::PgPool) {
    insert_test_article(&pool, "Fusion breakthrough announced", "Nature", &[], None, None).await;
    insert_test_article(&pool, "Quarterly earnings", "FT", &[], None, None).await;

    let filter = ArticleFilter {
        search_text: Some("fusion breakthrough".to_string()),
        ..ArticleFilter::default()
    };
    let articles = find_articles(&pool, &filter, Page::default())
        .await
        .expect("find");

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Fusion breakthrough announced");
}

#[sqlx::test(migrations = "../../migrations")]
async fn pagination_windows_do_not_overlap(pool: sqlx::PgPool) {
    for i in 0..5 {
        insert_test_article(&pool, &format!("Story {i}"), "Src", &[], None, None).await;
    }

    let first = find_articles(
        &pool,
        &ArticleFilter::default(),
        Page {
            limit: 2,
            offset: 0,
        },
    )
    .await
    .expect("find");
    let second = find_articles(
        &pool,
        &ArticleFilter::default(),
        Page {
            limit: 2,
            offset: 2,
        },
    )
    .await
    .expect("find");

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    let first_ids: Vec<Uuid> = first.iter().map(|a| a.id).collect();
    assert!(second.iter().all(|a| !first_ids.contains(&a.id)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn invalid_spatial_filter_fails_before_touching_the_store(pool: sqlx::PgPool) {
    let filter = ArticleFilter {
        lat: Some(37.0),
        ..ArticleFilter::default()
    };
    let err = find_articles(&pool, &filter, Page::default())
        .await
        .expect_err("should fail");
    assert!(matches!(err, DbError::InvalidFilter(_)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_articles_by_ids_skips_missing_rows(pool: sqlx::PgPool) {
    let id = insert_test_article(&pool, "Kept", "Src", &[], None, None).await;
    let missing = Uuid::new_v4();

    let articles = get_articles_by_ids(&pool, &[id, missing]).await.expect("get");
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].id, id);
}

// ---------------------------------------------------------------------------
// Engagement events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn inserted_events_come_back_from_a_window_scan(pool: sqlx::PgPool) {
    let article_id = insert_test_article(&pool, "Story", "Src", &[], None, None).await;
    let user_id = Uuid::new_v4();

    insert_event(
        &pool,
        user_id,
        article_id,
        EventKind::Click,
        Some(GeoPoint {
            lat: 37.7749,
            lon: -122.4194,
        }),
    )
    .await
    .expect("insert");

    let events = fetch_events_window(&pool, 48, None).await.expect("scan");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].article_id, article_id);
    assert_eq!(events[0].kind, EventKind::Click);
    let location = events[0].location.expect("location");
    assert!((location.lat - 37.7749).abs() < 1e-6);
    assert!((location.lon + 122.4194).abs() < 1e-6);
}

#[sqlx::test(migrations = "../../migrations")]
async fn window_scan_excludes_stale_events(pool: sqlx::PgPool) {
    let article_id = insert_test_article(&pool, "Story", "Src", &[], None, None).await;
    let user_id = Uuid::new_v4();

    let events = vec![
        NewEvent {
            user_id,
            article_id,
            kind: EventKind::View,
            occurred_at: Utc::now() - Duration::hours(1),
            location: None,
        },
        NewEvent {
            user_id,
            article_id,
            kind: EventKind::View,
            occurred_at: Utc::now() - Duration::hours(72),
            location: None,
        },
    ];
    insert_events_batch(&pool, &events).await.expect("batch");

    let in_window = fetch_events_window(&pool, 48, None).await.expect("scan");
    assert_eq!(in_window.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spatial_bound_excludes_events_outside_the_radius(pool: sqlx::PgPool) {
    let article_id = insert_test_article(&pool, "Story", "Src", &[], None, None).await;
    let user_id = Uuid::new_v4();

    let sf = GeoPoint {
        lat: 37.7749,
        lon: -122.4194,
    };
    let ny = GeoPoint {
        lat: 40.7128,
        lon: -74.0060,
    };
    let events = vec![
        NewEvent {
            user_id,
            article_id,
            kind: EventKind::Share,
            occurred_at: Utc::now(),
            location: Some(sf),
        },
        NewEvent {
            user_id,
            article_id,
            kind: EventKind::Share,
            occurred_at: Utc::now(),
            location: Some(ny),
        },
    ];
    insert_events_batch(&pool, &events).await.expect("batch");

    let bound = SpatialBound {
        center: sf,
        radius_km: 50.0,
    };
    let nearby = fetch_events_window(&pool, 48, Some(bound)).await.expect("scan");
    assert_eq!(nearby.len(), 1);
    let location = nearby[0].location.expect("location");
    assert!((location.lat - sf.lat).abs() < 1e-6);
}

#[sqlx::test(migrations = "../../migrations")]
async fn event_for_missing_article_maps_to_not_found(pool: sqlx::PgPool) {
    let err = insert_event(&pool, Uuid::new_v4(), Uuid::new_v4(), EventKind::View, None)
        .await
        .expect_err("should fail");
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Seeder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn seeder_is_a_noop_without_articles(pool: sqlx::PgPool) {
    let inserted = newspulse_db::generate_events(&pool, Uuid::new_v4(), 50)
        .await
        .expect("seed");
    assert_eq!(inserted, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn seeder_inserts_the_requested_number_of_events(pool: sqlx::PgPool) {
    insert_test_article(&pool, "Story", "Src", &[], None, None).await;

    let inserted = newspulse_db::generate_events(&pool, Uuid::new_v4(), 25)
        .await
        .expect("seed");
    assert_eq!(inserted, 25);

    let ids = list_article_ids(&pool, 100).await.expect("ids");
    assert_eq!(ids.len(), 1);

    let events = fetch_events_window(&pool, 48, None).await.expect("scan");
    assert_eq!(events.len(), 25);
}
