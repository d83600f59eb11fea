//! Database-backed tests. They need a disposable PostgreSQL instance:
//!
//! ```sh
//! TEST_DB_HOST=localhost TEST_DB_USER=postgres TEST_DB_PASSWORD=postgres \
//!     cargo test -p content-ops-api -- --ignored
//! ```

use std::env;

use chrono::{DateTime, Days, NaiveDate, Utc};
use content_ops_api::config::AppConfig;
use content_ops_api::gateway::GatewayError;
use content_ops_api::session::SessionGate;
use content_ops_core::catalog::{
    delete_statement, ProductCategory, ProductFilter, ProductFilterParams, ProductForm, ProductRow,
    ProductSource,
};
use content_ops_core::publishing::{
    AnalyticsRange, AnalyticsSummary, CalendarEntry, CalendarParams, CalendarWindow, DailyViews,
    Platform, PlatformEngagement, RecentPost, TopPost,
};
use content_ops_core::review::{ContentItem, ContentQuery, ContentRow, ContentStatusFilter, SortOrder};
use content_ops_core::stats::{BrandVoice, DatabaseStats, OverviewCounters, QuickStats};
use content_ops_core::Statement;
use sqlx::{Connection, PgConnection};

const USER: &str = "dashboard-test";
const PASSWORD: &str = "correct horse battery staple";

fn config() -> AppConfig {
    AppConfig::from_lookup(|key| {
        let var = match key {
            "DB_HOST" | "DB_PORT" | "DB_NAME" | "DB_USER" | "DB_PASSWORD" => format!("TEST_{key}"),
            "DB_SSL_MODE" => return Some(env::var("TEST_DB_SSL_MODE").unwrap_or_else(|_| "disable".into())),
            _ => return None,
        };
        env::var(var).ok()
    })
    .expect("TEST_DB_HOST and TEST_DB_USER must be set")
}

/// Apply the schema and make sure the test operator exists.
async fn prepare(config: &AppConfig) -> PgConnection {
    let mut conn = PgConnection::connect_with(&config.database.connect_options())
        .await
        .expect("test database reachable");
    sqlx::migrate!("../../migrations")
        .run(&mut conn)
        .await
        .expect("schema applied");
    sqlx::query(
        "INSERT INTO dashboard_users (username, password_hash) \
         VALUES ($1, crypt($2, gen_salt('bf'))) \
         ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash",
    )
    .bind(USER)
    .bind(PASSWORD)
    .execute(&mut conn)
    .await
    .expect("test user seeded");
    conn
}

async fn seed_products(conn: &mut PgConnection, prefix: &str, rows: &[(&str, &str)]) {
    sqlx::query("DELETE FROM products WHERE product_id LIKE $1")
        .bind(format!("{prefix}%"))
        .execute(&mut *conn)
        .await
        .unwrap();
    for (i, &(source, title)) in rows.iter().enumerate() {
        sqlx::query("INSERT INTO products (source, product_id, title, price) VALUES ($1, $2, $3, 10)")
            .bind(source)
            .bind(format!("{prefix}{i}"))
            .bind(title)
            .execute(&mut *conn)
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore = "needs TEST_DB_* PostgreSQL"]
async fn login_and_logout_track_connections() {
    let config = config();
    prepare(&config).await;
    let gate = SessionGate::new(config.database.clone());

    assert!(gate.login(USER, "wrong password").await.is_err());
    assert!(gate.login("nobody", PASSWORD).await.is_err());
    assert_eq!(gate.open_connections(), 0);
    assert_eq!(gate.active_sessions().await, 0);

    let grant = gate.login(USER, PASSWORD).await.unwrap();
    assert_eq!(grant.username, USER);
    assert_eq!(gate.open_connections(), 1);

    let second = gate.login(USER, PASSWORD).await.unwrap();
    assert_ne!(second.token, grant.token);
    assert_eq!(gate.open_connections(), 2);

    gate.logout(&grant.token).await;
    assert!(gate.session(&grant.token).await.is_none());
    assert_eq!(gate.open_connections(), 1);

    gate.close_all().await;
    assert_eq!(gate.open_connections(), 0);
    assert_eq!(gate.active_sessions().await, 0);
}

#[tokio::test]
#[ignore = "needs TEST_DB_* PostgreSQL"]
async fn failed_statement_does_not_poison_the_session() {
    let config = config();
    prepare(&config).await;
    let gate = SessionGate::new(config.database.clone());
    let grant = gate.login(USER, PASSWORD).await.unwrap();
    let handle = gate.session(&grant.token).await.unwrap();
    let mut session = handle.lock().await;

    let broken = Statement::new("SELECT * FROM table_that_does_not_exist");
    assert!(session.gateway.fetch_all::<(i64,)>(&broken).await.is_err());
    assert!(session
        .gateway
        .execute(&Statement::new("UPDATE table_that_does_not_exist SET x = 1"))
        .await
        .is_err());

    let (one,): (i64,) = session
        .gateway
        .fetch_optional(&Statement::new("SELECT 1::BIGINT"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(one, 1);
    assert_eq!(gate.open_connections(), 1);

    // Kill our own backend; the next call must reconnect.
    let _ = session
        .gateway
        .fetch_optional::<(bool,)>(&Statement::new("SELECT pg_terminate_backend(pg_backend_pid())"))
        .await;
    let mut recovered = false;
    for _ in 0..3 {
        if session
            .gateway
            .fetch_optional::<(i64,)>(&Statement::new("SELECT 1::BIGINT"))
            .await
            .is_ok()
        {
            recovered = true;
            break;
        }
    }
    assert!(recovered);
    assert_eq!(gate.open_connections(), 1);

    drop(session);
    gate.logout(&grant.token).await;
    assert_eq!(gate.open_connections(), 0);
}

#[tokio::test]
#[ignore = "needs TEST_DB_* PostgreSQL"]
async fn filtered_listing_matches_every_constraint() {
    let config = config();
    let mut conn = prepare(&config).await;
    seed_products(
        &mut conn,
        "FILTER-",
        &[
            ("manual", "Leather Wallet"),
            ("manual", "Travel wallet slim"),
            ("manual", "Desk Lamp"),
            ("shopify", "Card Wallet"),
            ("shopify", "Phone Case"),
            ("manual", "100%_wallet promo"),
        ],
    )
    .await;

    let gate = SessionGate::new(config.database.clone());
    let grant = gate.login(USER, PASSWORD).await.unwrap();
    let handle = gate.session(&grant.token).await.unwrap();
    let mut session = handle.lock().await;

    let filter = ProductFilter::try_from(ProductFilterParams {
        source: Some("manual".into()),
        status: Some("All".into()),
        search: Some("wallet".into()),
    })
    .unwrap();
    let rows: Vec<ProductRow> = session.gateway.fetch_all(&filter.to_statement()).await.unwrap();

    assert!(rows.len() <= 50);
    assert!(rows
        .iter()
        .all(|r| r.source == "manual" && r.title.to_lowercase().contains("wallet")));
    let ids: Vec<_> = rows.iter().map(|r| r.product_id.as_str()).collect();
    for expected in ["FILTER-0", "FILTER-1", "FILTER-5"] {
        assert!(ids.contains(&expected), "{expected} missing from {ids:?}");
    }
    assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    // Wildcards in the search term match literally.
    let literal = ProductFilter::try_from(ProductFilterParams {
        search: Some("100%_".into()),
        ..Default::default()
    })
    .unwrap();
    let rows: Vec<ProductRow> = session.gateway.fetch_all(&literal.to_statement()).await.unwrap();
    assert!(rows.iter().all(|r| r.title.contains("100%_")));

    drop(session);
    gate.logout(&grant.token).await;
}

#[tokio::test]
#[ignore = "needs TEST_DB_* PostgreSQL"]
async fn add_list_delete_round_trip() {
    let config = config();
    let mut conn = prepare(&config).await;
    seed_products(&mut conn, "E2E-", &[]).await;

    let gate = SessionGate::new(config.database.clone());
    let grant = gate.login(USER, PASSWORD).await.unwrap();
    let handle = gate.session(&grant.token).await.unwrap();
    let mut session = handle.lock().await;

    let product = ProductForm {
        title: Some("Premium Leather Wallet".into()),
        product_id: Some("E2E-PROD-1".into()),
        price: 49.99,
        category: ProductCategory::Accessories,
        description: None,
        source: ProductSource::Manual,
        images: vec!["https://cdn.example.com/wallet.png".into()],
    }
    .validate()
    .unwrap();
    assert_eq!(session.gateway.execute(&product.insert_statement()).await.unwrap(), 1);

    // product_id is unique across sources.
    let mut duplicate = product.clone();
    duplicate.source = ProductSource::Shopify;
    assert!(session.gateway.execute(&duplicate.insert_statement()).await.is_err());

    let filter = ProductFilter {
        search: Some("Premium Leather Wallet".into()),
        ..Default::default()
    };
    let rows: Vec<ProductRow> = session.gateway.fetch_all(&filter.to_statement()).await.unwrap();
    let row = rows
        .iter()
        .find(|r| r.product_id == "E2E-PROD-1")
        .expect("new product listed");
    assert_eq!(row.status, "pending_content_generation");
    assert_eq!(row.images, vec!["https://cdn.example.com/wallet.png".to_string()]);
    assert!((row.price - 49.99).abs() < 0.001);

    assert_eq!(session.gateway.execute(&delete_statement("E2E-PROD-1")).await.unwrap(), 1);
    assert_eq!(session.gateway.execute(&delete_statement("E2E-PROD-1")).await.unwrap(), 0);

    drop(session);
    gate.logout(&grant.token).await;
    assert_eq!(gate.open_connections(), 0);
}

#[tokio::test]
#[ignore = "needs TEST_DB_* PostgreSQL"]
async fn request_held_across_logout_cannot_reopen_a_connection() {
    let config = config();
    prepare(&config).await;
    let gate = SessionGate::new(config.database.clone());
    let grant = gate.login(USER, PASSWORD).await.unwrap();
    let handle = gate.session(&grant.token).await.unwrap();

    gate.logout(&grant.token).await;
    assert_eq!(gate.open_connections(), 0);

    let mut session = handle.lock().await;
    let err = session
        .gateway
        .fetch_optional::<(i64,)>(&Statement::new("SELECT 1::BIGINT"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Closed));
    assert_eq!(gate.open_connections(), 0);
}

async fn insert_returning_id(conn: &mut PgConnection, sql: &str, binds: &[&str]) -> String {
    let mut query = sqlx::query_scalar::<_, String>(sql);
    for value in binds {
        query = query.bind(*value);
    }
    query.fetch_one(&mut *conn).await.unwrap()
}

async fn seed_post(
    conn: &mut PgConnection,
    content_id: &str,
    platform: &str,
    published_at: DateTime<Utc>,
    metrics: Option<(i64, i64, i64, i64, f64)>,
) -> String {
    let post_id: String = sqlx::query_scalar(
        "INSERT INTO posts (content_id, platform, post_url, status, published_at) \
         VALUES ($1::uuid, $2, 'https://social.example.com/p', 'published', $3) RETURNING id::TEXT",
    )
    .bind(content_id)
    .bind(platform)
    .bind(published_at)
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    if let Some((views, likes, comments, shares, rate)) = metrics {
        sqlx::query(
            "INSERT INTO analytics (post_id, views, likes, comments, shares, engagement_rate) \
             VALUES ($1::uuid, $2, $3, $4, $5, $6)",
        )
        .bind(post_id.as_str())
        .bind(views)
        .bind(likes)
        .bind(comments)
        .bind(shares)
        .bind(rate)
        .execute(&mut *conn)
        .await
        .unwrap();
    }
    post_id
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    date.and_hms_opt(hour, minute, 0).unwrap().and_utc()
}

/// Seeds product -> content -> posts -> analytics and reads it back through
/// every screen's statement.
#[tokio::test]
#[ignore = "needs TEST_DB_* PostgreSQL"]
async fn screen_queries_decode_against_the_schema() {
    let config = config();
    let mut conn = prepare(&config).await;
    seed_products(&mut conn, "CHAIN-", &[("manual", "Chain Wallet")]).await;

    let product_id = insert_returning_id(
        &mut conn,
        "SELECT id::TEXT FROM products WHERE product_id = $1",
        &["CHAIN-0"],
    )
    .await;
    let long_caption = "x".repeat(250);
    let pending = insert_returning_id(
        &mut conn,
        "INSERT INTO content (product_id, caption, hashtags, video_gdrive_file_id, status) \
         VALUES ($1::uuid, $2, ARRAY['wallet', 'leather'], 'drive-1', 'pending_review') RETURNING id::TEXT",
        &[product_id.as_str(), long_caption.as_str()],
    )
    .await;
    let rejected = insert_returning_id(
        &mut conn,
        "INSERT INTO content (product_id, caption, status) VALUES ($1::uuid, 'meh', 'rejected') RETURNING id::TEXT",
        &[product_id.as_str()],
    )
    .await;
    sqlx::query(
        "INSERT INTO brand_voice (tone_description, emoji_usage, sample_captions) \
         VALUES ('warm', 'light', ARRAY['hello'])",
    )
    .execute(&mut conn)
    .await
    .unwrap();

    let now = Utc::now();
    let days_ago = |n: u64| now.checked_sub_days(Days::new(n)).unwrap();
    seed_post(&mut conn, &pending, "instagram", days_ago(1), Some((100, 10, 2, 1, 5.5))).await;
    seed_post(&mut conn, &pending, "instagram", days_ago(2), Some((300, 30, 3, 0, 7.25))).await;
    seed_post(&mut conn, &pending, "instagram", days_ago(60), Some((1000, 1, 1, 1, 1.0))).await;

    let first = NaiveDate::from_ymd_opt(2001, 3, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2001, 3, 10).unwrap();
    let last_day_post = seed_post(&mut conn, &pending, "facebook", at(last, 23, 30), None).await;
    let first_day_post =
        seed_post(&mut conn, &pending, "facebook", at(first, 0, 0), Some((7, 1, 0, 0, 2.0))).await;
    seed_post(&mut conn, &pending, "facebook", at(NaiveDate::from_ymd_opt(2001, 3, 11).unwrap(), 0, 0), None)
        .await;

    let gate = SessionGate::new(config.database.clone());
    let grant = gate.login(USER, PASSWORD).await.unwrap();
    let handle = gate.session(&grant.token).await.unwrap();
    let mut session = handle.lock().await;
    let gateway = &mut session.gateway;

    // Calendar: both ends of the window are inclusive days.
    let window = CalendarWindow::resolve(
        &CalendarParams { from: Some(first), to: Some(last) },
        Utc::now().date_naive(),
    )
    .unwrap();
    let entries: Vec<CalendarEntry> = gateway
        .fetch_all::<CalendarEntry>(&CalendarEntry::statement(&window))
        .await
        .unwrap()
        .into_iter()
        .map(CalendarEntry::abbreviated)
        .collect();
    let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec![last_day_post.as_str(), first_day_post.as_str()]);
    assert_eq!(entries[0].views, 0);
    assert_eq!(entries[1].views, 7);
    assert_eq!(entries[0].caption.chars().count(), 203);
    assert_eq!(entries[0].product_title, "Chain Wallet");

    // Content review: the status filter is honoured.
    let review = |status| ContentQuery { status, sort: SortOrder::NewestFirst }.to_statement();
    let pending_rows: Vec<ContentRow> =
        gateway.fetch_all(&review(ContentStatusFilter::PendingReview)).await.unwrap();
    assert!(pending_rows.iter().all(|r| r.status == "pending_review"));
    let item = pending_rows
        .into_iter()
        .find(|r| r.id == pending)
        .map(ContentItem::from)
        .expect("pending content listed");
    assert_eq!(item.hashtags, vec!["wallet".to_string(), "leather".to_string()]);
    assert_eq!(item.preview_url.as_deref(), Some("https://drive.google.com/file/d/drive-1/preview"));
    assert_eq!(item.product_price, Some(10.0));

    let rejected_rows: Vec<ContentRow> =
        gateway.fetch_all(&review(ContentStatusFilter::Rejected)).await.unwrap();
    assert!(rejected_rows.iter().any(|r| r.id == rejected));
    assert!(rejected_rows.iter().all(|r| r.id != pending));
    let all_rows: Vec<ContentRow> = gateway.fetch_all(&review(ContentStatusFilter::All)).await.unwrap();
    assert!(all_rows.iter().any(|r| r.id == pending) && all_rows.iter().any(|r| r.id == rejected));

    // Analytics over the last 30 days, Instagram only.
    let since = AnalyticsRange::Last30Days.since(Utc::now());
    let platforms = [Platform::Instagram];
    let summary: AnalyticsSummary = gateway
        .fetch_one_or_default(&AnalyticsSummary::statement(since, &platforms))
        .await
        .unwrap();
    assert_eq!(summary.total_views, 400);
    assert_eq!(summary.total_engagement, 46);
    assert_eq!(summary.total_posts, 2);
    assert!((summary.avg_engagement_rate - 6.375).abs() < 0.001);

    let daily: Vec<DailyViews> = gateway
        .fetch_all(&DailyViews::statement(since, &platforms))
        .await
        .unwrap();
    assert_eq!(daily.iter().map(|d| d.total_views).sum::<i64>(), 400);
    assert!(daily.windows(2).all(|w| w[0].date <= w[1].date));

    let engagement: Vec<PlatformEngagement> = gateway
        .fetch_all(&PlatformEngagement::statement(since, &platforms))
        .await
        .unwrap();
    assert_eq!(engagement.len(), 1);
    assert_eq!((engagement[0].likes, engagement[0].comments, engagement[0].shares), (40, 5, 1));

    let top: Vec<TopPost> = gateway
        .fetch_all(&TopPost::statement(since, &platforms))
        .await
        .unwrap();
    assert!(top.len() <= 5);
    assert_eq!(top.iter().map(|t| t.views).collect::<Vec<_>>(), vec![300, 100]);
    assert_eq!(top[0].title, "Chain Wallet");

    // Overview and settings counters.
    let recent: Vec<RecentPost> = gateway.fetch_all(&RecentPost::statement()).await.unwrap();
    assert!(!recent.is_empty() && recent.len() <= 5);
    let published: Vec<_> = recent.iter().filter_map(|p| p.published_at).collect();
    assert!(published.windows(2).all(|w| w[0] >= w[1]));

    let quick: QuickStats = gateway
        .fetch_one_or_default(&Statement::new(QuickStats::SQL))
        .await
        .unwrap();
    assert!(quick.total_products >= 1 && quick.pending_review >= 1 && quick.published_posts >= 6);
    let counters: OverviewCounters = gateway
        .fetch_one_or_default(&Statement::new(OverviewCounters::SQL))
        .await
        .unwrap();
    assert!(counters.total_views >= 1407);
    let stats: DatabaseStats = gateway
        .fetch_one_or_default(&Statement::new(DatabaseStats::SQL))
        .await
        .unwrap();
    assert!(stats.content >= 2 && stats.posts >= 6 && stats.analytics >= 4);
    let voice: Option<BrandVoice> = gateway
        .fetch_optional(&Statement::new(BrandVoice::SQL))
        .await
        .unwrap();
    assert!(voice.is_some());

    drop(session);
    gate.logout(&grant.token).await;
    seed_products(&mut conn, "CHAIN-", &[]).await;
}
