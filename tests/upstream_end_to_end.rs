//! Router wired to the real Tumblr and oEmbed adapters, backed by mock servers.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use httpmock::MockServer;
use reqwest::Url;
use serde_json::{Value, json};
use tower::ServiceExt;
use tumbleproxy::application::feed::FeedService;
use tumbleproxy::cache::{CacheConfig, FeedCache, ManualClock};
use tumbleproxy::infra::{
    http::{HttpState, build_router},
    oembed::OEmbedClient,
    tumblr::TumblrClient,
    upstream::build_client,
};

fn router(tumblr: &MockServer, instagram: &MockServer) -> Router {
    let client = build_client().expect("http client");
    let posts = TumblrClient::new(
        client.clone(),
        Url::parse(&tumblr.base_url()).expect("tumblr url"),
        Some("consumer-key".to_string()),
    );
    let embeds = OEmbedClient::new(
        client,
        Url::parse(&instagram.url("/oembed")).expect("oembed url"),
    );
    let cache = FeedCache::new(
        CacheConfig::default(),
        Arc::new(ManualClock::new(1_700_000_000_000)),
    );
    let feed = FeedService::new(
        Arc::new(posts),
        Arc::new(embeds),
        Arc::new(cache),
        "dbow1234",
    );
    build_router(HttpState::new(Arc::new(feed)))
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    (status, body.to_vec())
}

#[tokio::test]
async fn posts_pass_through_upstream_shape() {
    let tumblr = MockServer::start();
    let instagram = MockServer::start();
    let listing = tumblr.mock(|when, then| {
        when.method("GET")
            .path("/v2/blog/dbow1234.tumblr.com/posts")
            .query_param("api_key", "consumer-key")
            .query_param("tag", "essay")
            .query_param("limit", "10")
            .query_param("filter", "html");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "meta": { "status": 200, "msg": "OK" },
                "response": {
                    "posts": [
                        { "id": 11, "type": "text", "body": "<p>first</p>", "note_count": 3 },
                        { "id": 12, "type": "text", "body": "<p>second</p>" }
                    ]
                }
            }));
    });
    let router = router(&tumblr, &instagram);

    let (status, body) = get(&router, "/posts").await;
    let (_, again) = get(&router, "/posts").await;

    assert_eq!(status, StatusCode::OK);
    let items: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(
        items,
        json!([
            { "id": 11, "type": "text", "body": "<p>first</p>", "note_count": 3 },
            { "id": 12, "type": "text", "body": "<p>second</p>" }
        ])
    );
    assert_eq!(body, again);
    listing.assert_calls(1);
}

#[tokio::test]
async fn poems_are_enriched_through_oembed() {
    let tumblr = MockServer::start();
    let instagram = MockServer::start();
    tumblr.mock(|when, then| {
        when.method("GET")
            .path("/v2/blog/dbow1234.tumblr.com/posts")
            .query_param("tag", "instapoem");
        then.status(200).json_body(json!({
            "meta": { "status": 200, "msg": "OK" },
            "response": {
                "posts": [
                    { "id": 1, "link_url": "https://instagram.com/p/one" },
                    { "id": 2, "permalink_url": "https://instagram.com/p/two" }
                ]
            }
        }));
    });
    for (url, html) in [
        ("https://instagram.com/p/one", "<blockquote>one</blockquote>"),
        ("https://instagram.com/p/two", "<blockquote>two</blockquote>"),
    ] {
        instagram.mock(|when, then| {
            when.method("GET")
                .path("/oembed")
                .query_param("url", url)
                .query_param("beta", "true")
                .query_param("omitscript", "true");
            then.status(200).json_body(json!({ "html": html }));
        });
    }
    let router = router(&tumblr, &instagram);

    let (status, body) = get(&router, "/poems").await;

    assert_eq!(status, StatusCode::OK);
    let items: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(
        items,
        json!([
            { "content": { "html": "<blockquote>one</blockquote>" }, "url": "https://instagram.com/p/one" },
            { "content": { "html": "<blockquote>two</blockquote>" }, "url": "https://instagram.com/p/two" }
        ])
    );
}

#[tokio::test]
async fn rejected_upstream_is_an_empty_500() {
    let tumblr = MockServer::start();
    let instagram = MockServer::start();
    tumblr.mock(|when, then| {
        when.method("GET").path("/v2/blog/dbow1234.tumblr.com/posts");
        then.status(401).json_body(json!({
            "meta": { "status": 401, "msg": "Unauthorized" },
            "response": []
        }));
    });
    let router = router(&tumblr, &instagram);

    let (status, body) = get(&router, "/posts").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn failing_embed_lookup_is_an_empty_500() {
    let tumblr = MockServer::start();
    let instagram = MockServer::start();
    tumblr.mock(|when, then| {
        when.method("GET").path("/v2/blog/dbow1234.tumblr.com/posts");
        then.status(200).json_body(json!({
            "meta": { "status": 200, "msg": "OK" },
            "response": { "posts": [ { "id": 1 } ] }
        }));
    });
    instagram.mock(|when, then| {
        when.method("GET").path("/oembed").query_param("url", "");
        then.status(404).body("No URL Match");
    });
    let router = router(&tumblr, &instagram);

    let (status, body) = get(&router, "/poems").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}
