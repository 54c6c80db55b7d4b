//! Integration tests for the Apify-backed adapters and profile resolver.
//!
//! Uses `wiremock` to stand up a local Apify API for each test so no real
//! network traffic is made.

use std::sync::Arc;
use std::time::Duration;

use brandlens_core::{Platform, RateLimits, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brandlens_scraper::{
    apify_registry, run_with_retry, ApifyClient, ApifySearchResolver, InstagramAdapter,
    ProfileResolver, RateLimiter, ScraperError, SourceAdapter, TiktokAdapter, TokioSleeper,
    YoutubeAdapter,
};

const TOKEN: &str = "test-token";

fn test_client(server: &MockServer) -> Arc<ApifyClient> {
    Arc::new(
        ApifyClient::new(TOKEN, 5, 300, "brandlens-test/0.1")
            .expect("failed to build test ApifyClient")
            .with_base_url(server.uri()),
    )
}

fn actor_path(actor: &str) -> String {
    format!("/acts/{actor}/run-sync-get-dataset-items")
}

// ---------------------------------------------------------------------------
// Instagram
// ---------------------------------------------------------------------------

#[tokio::test]
async fn instagram_items_are_parsed_and_malformed_ones_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(actor_path("apify~instagram-scraper")))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("timeout", "300"))
        .and(body_partial_json(json!({
            "directUrls": ["https://www.instagram.com/acme"],
            "resultsType": "posts",
            "resultsLimit": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "id": "1",
                "url": "https://www.instagram.com/p/one/",
                "type": "Image",
                "likesCount": 10,
                "commentsCount": 2,
                "hashtags": ["acme"]
            },
            {"error": "restricted_page"},
            {
                "id": "2",
                "url": "https://www.instagram.com/p/two/",
                "type": "Video",
                "likesCount": 30,
                "videoViewCount": 900
            }
        ])))
        .mount(&server)
        .await;

    let adapter = InstagramAdapter::new(test_client(&server));
    let items = adapter
        .fetch_items("https://www.instagram.com/acme", 2)
        .await
        .expect("fetch should succeed");

    // Only the first two raw items are considered; the error item is dropped.
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "1");
    assert_eq!(items[0].hashtags, vec!["acme"]);
}

#[tokio::test]
async fn instagram_comments_use_comments_results_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(actor_path("apify~instagram-scraper")))
        .and(body_partial_json(json!({"resultsType": "comments"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"id": "c1", "text": "nice", "ownerUsername": "fan", "likesCount": 1},
            {"id": "c2", "text": "wow", "ownerUsername": "fan2"}
        ])))
        .mount(&server)
        .await;

    let adapter = InstagramAdapter::new(test_client(&server));
    let comments = adapter
        .fetch_comments("https://www.instagram.com/p/one/", 50)
        .await
        .expect("fetch should succeed");

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1].author, "fan2");
}

// ---------------------------------------------------------------------------
// TikTok / YouTube
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tiktok_items_request_profile_handle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(actor_path("clockworks~tiktok-scraper")))
        .and(body_partial_json(json!({"profiles": ["acme"], "resultsPerPage": 10})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "id": "73",
                "webVideoUrl": "https://www.tiktok.com/@acme/video/73",
                "text": "hello #world",
                "diggCount": 5,
                "playCount": 100
            }
        ])))
        .mount(&server)
        .await;

    let adapter = TiktokAdapter::new(test_client(&server));
    let items = adapter
        .fetch_items("https://www.tiktok.com/@acme/", 10)
        .await
        .expect("fetch should succeed");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].hashtags, vec!["world"]);
}

#[tokio::test]
async fn tiktok_comments_use_comments_actor() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(actor_path("clockworks~tiktok-comments-scraper")))
        .and(body_partial_json(json!({
            "postURLs": ["https://www.tiktok.com/@acme/video/73"],
            "maxRepliesPerComment": 0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"cid": "1", "text": "first", "uniqueId": "a"}
        ])))
        .mount(&server)
        .await;

    let adapter = TiktokAdapter::new(test_client(&server));
    let comments = adapter
        .fetch_comments("https://www.tiktok.com/@acme/video/73", 5)
        .await
        .expect("fetch should succeed");

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author, "a");
}

#[tokio::test]
async fn youtube_comments_are_limited_to_max() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(actor_path("streamers~youtube-comments-scraper")))
        .and(body_partial_json(json!({"commentsSortBy": "1", "maxComments": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"cid": "a", "comment": "one", "author": "x"},
            {"cid": "b", "comment": "two", "author": "y"},
            {"cid": "c", "comment": "three", "author": "z"}
        ])))
        .mount(&server)
        .await;

    let adapter = YoutubeAdapter::new(test_client(&server));
    let comments = adapter
        .fetch_comments("https://www.youtube.com/watch?v=abc", 2)
        .await
        .expect("fetch should succeed");

    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_status_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let adapter = YoutubeAdapter::new(test_client(&server));
    let result = adapter.fetch_items("https://www.youtube.com/@acme", 5).await;

    assert!(
        matches!(result, Err(ScraperError::Unauthorized { status: 401, .. })),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let adapter = TiktokAdapter::new(test_client(&server));
    let result = adapter.fetch_items("acme", 5).await;

    match result {
        Err(ScraperError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn sync_run_timeout_maps_to_run_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(408))
        .mount(&server)
        .await;

    let adapter = InstagramAdapter::new(test_client(&server));
    let result = adapter.fetch_items("https://www.instagram.com/acme", 5).await;

    assert!(matches!(result, Err(ScraperError::RunFailed(_))));
}

#[tokio::test]
async fn non_array_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let adapter = InstagramAdapter::new(test_client(&server));
    let result = adapter.fetch_items("https://www.instagram.com/acme", 5).await;

    assert!(matches!(result, Err(ScraperError::Parse { .. })));
}

// ---------------------------------------------------------------------------
// Retry over a real adapter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retry_recovers_from_transient_provider_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"id": "v", "url": "https://www.youtube.com/watch?v=v"}
        ])))
        .mount(&server)
        .await;

    let adapter = YoutubeAdapter::new(test_client(&server));
    let policy = RetryPolicy::new(3, Duration::ZERO, Duration::from_secs(5));
    let items = run_with_retry(
        || adapter.fetch_items("https://www.youtube.com/@acme", 5),
        &policy,
        "youtube items",
        &TokioSleeper,
    )
    .await
    .expect("second attempt should succeed");

    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn registry_holds_all_apify_adapters_in_order() {
    let server = MockServer::start().await;
    let registry = apify_registry(&test_client(&server));
    assert_eq!(
        registry.platforms(),
        vec![Platform::Instagram, Platform::Tiktok, Platform::Youtube]
    );
}

// ---------------------------------------------------------------------------
// Profile resolver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolver_treats_failed_platform_search_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(actor_path("apify~google-search-scraper")))
        .and(body_partial_json(json!({"queries": "site:instagram.com \"Acme\""})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"organicResults": [
                {"url": "https://www.instagram.com/acme/", "title": "Acme", "description": ""},
                {"url": "https://www.instagram.com/p/xyz/", "title": "post", "description": ""}
            ]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(actor_path("apify~google-search-scraper")))
        .and(body_partial_json(json!({"queries": "site:tiktok.com \"Acme\""})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let limiter = RateLimiter::new(RateLimits::none(), Arc::new(TokioSleeper));
    let resolver = ApifySearchResolver::new(test_client(&server), limiter);
    let resolved = resolver
        .resolve("Acme", &[Platform::Instagram, Platform::Tiktok])
        .await
        .expect("resolver never fails on per-platform errors");

    assert_eq!(
        resolved.get(&Platform::Instagram),
        Some(&vec!["https://www.instagram.com/acme".to_string()])
    );
    assert_eq!(resolved.get(&Platform::Tiktok), Some(&Vec::new()));
}
