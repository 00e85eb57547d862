//! HTTP routes exercised through the router without a socket

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{coffee_article, operations, FakeWordPress, ScriptedGenerator};
use scribe_core::api::{build_router, AppState};
use scribe_core::{PostStatus, TaxonomyKind};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn router(site: &Arc<FakeWordPress>, generator: Option<Arc<ScriptedGenerator>>) -> Router {
    let ops = Arc::new(operations(site.clone(), generator));
    build_router(AppState::new(ops, "https://blog.example.com/"))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let site = Arc::new(FakeWordPress::new());

    let (status, body) = send(router(&site, None), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "scribe");
    assert_eq!(body["ai_available"], false);
    assert_eq!(body["wordpress_url"], "https://blog.example.com/");

    let (status, body) = send(router(&site, None), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_generate_post_route() {
    let site = Arc::new(FakeWordPress::new());
    site.add_term(TaxonomyKind::Category, "Health");
    let generator = Arc::new(ScriptedGenerator::new().then(Ok(coffee_article())));

    let (status, body) = send(
        router(&site, Some(generator)),
        post_json(
            "/ai/generate-post",
            json!({"prompt": "coffee benefits", "tone": "educativo"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "draft");
    assert_eq!(body["ai_generated"], true);
    assert_eq!(body["ai_categories"], json!(["Health"]));
    assert_eq!(body["ai_tags"], json!(["coffee", "health"]));
    assert_eq!(body["tag_ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bad_credentials_are_401() {
    let site = Arc::new(FakeWordPress::with_bad_credentials());
    let generator = Arc::new(ScriptedGenerator::new().then(Ok(coffee_article())));

    let (status, body) = send(
        router(&site, Some(generator)),
        post_json("/ai/generate-post", json!({"prompt": "coffee"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "AuthenticationFailed");
    assert!(site.posts().is_empty());
}

#[tokio::test]
async fn test_ai_routes_without_generator_are_503() {
    let site = Arc::new(FakeWordPress::new());

    let (status, body) = send(
        router(&site, None),
        post_json("/ai/generate-content", json!({"prompt": "coffee"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "RemoteUnavailable");
}

#[tokio::test]
async fn test_invalid_body_is_400() {
    let site = Arc::new(FakeWordPress::new());

    let request = Request::builder()
        .method("POST")
        .uri("/posts/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(router(&site, None), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationFailed");

    let (status, _) = send(
        router(&site, None),
        post_json("/posts/create", json!({"title": "No body"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(site.mutations().is_empty());
}

#[tokio::test]
async fn test_create_and_list_posts() {
    let site = Arc::new(FakeWordPress::new());

    let (status, body) = send(
        router(&site, None),
        post_json(
            "/posts/create",
            json!({"title": "Manual", "content": "<p>x</p>", "status": "publish"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "publish");

    let (status, body) = send(router(&site, None), get("/posts?per_page=5&page=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["posts"][0]["title"], "Manual");

    let (status, body) = send(router(&site, None), get("/posts?per_page=500")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationFailed");
}

#[tokio::test]
async fn test_list_terms_routes() {
    let site = Arc::new(FakeWordPress::new());
    site.add_term(TaxonomyKind::Category, "News");
    site.add_term(TaxonomyKind::Tag, "rust");
    site.add_term(TaxonomyKind::Tag, "axum");

    let (_, body) = send(router(&site, None), get("/categories")).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["categories"][0]["name"], "News");

    let (_, body) = send(router(&site, None), get("/tags?per_page=1")).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_improve_post_route() {
    let site = Arc::new(FakeWordPress::new());
    let post_id = site.add_post("Old coffee post", PostStatus::Pending);
    let generator = Arc::new(ScriptedGenerator::new().then(Ok(coffee_article())));

    let (status, body) = send(
        router(&site, Some(generator.clone())),
        post_json("/ai/improve-post", json!({"post_id": post_id})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_improved"], true);
    assert_eq!(body["status"], "pending");
    assert_eq!(generator.improved(), vec![(post_id, String::new())]);

    let (status, body) = send(
        router(&site, Some(generator)),
        post_json("/ai/improve-post", json!({"post_id": 9999})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_mcp_over_http() {
    let site = Arc::new(FakeWordPress::new());

    let (status, body) = send(
        router(&site, None),
        post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "a");
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 14);
    assert!(!tools.iter().any(|t| t["name"] == "upload_media"));

    let (status, body) = send(
        router(&site, None),
        post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_mcp_over_http_cannot_read_server_files() {
    let site = Arc::new(FakeWordPress::new());
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"secret").unwrap();

    let (status, body) = send(
        router(&site, None),
        post_json(
            "/mcp",
            json!({
                "jsonrpc": "2.0",
                "id": 9,
                "method": "tools/call",
                "params": {
                    "name": "upload_media",
                    "arguments": {"file_path": file.path().to_str().unwrap()}
                }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32602);
    assert!(site.mutations().is_empty());
}

#[tokio::test]
async fn test_mcp_request_with_null_id_is_answered() {
    let site = Arc::new(FakeWordPress::new());

    let (status, body) = send(
        router(&site, None),
        post_json("/mcp", json!({"jsonrpc": "2.0", "id": null, "method": "ping"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({}));
    assert_eq!(body["id"], Value::Null);
}
