use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::fs;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use vsearch_core::EngineConfig;
use vsearch_server::{build_app, ServerConfig};

fn build_tiny_corpus() -> TempDir {
    let dir = tempdir().unwrap();
    let lines = [
        r#"{"id": 0, "title": "Doc 0", "body": "Rust is great. rust systems programming with rust."}"#,
        r#"{"id": 1, "title": "Doc 1", "body": "Learning rust basics with friendly compiler errors and helpful books.", "url": "https://example.com/1"}"#,
        r#"{"id": 2, "title": "Doc 2", "body": "Gardening tips for spring tomatoes."}"#,
    ];
    fs::write(dir.path().join("docs.jsonl"), lines.join("\n")).unwrap();
    dir
}

fn app(dir: &TempDir, champions: usize) -> Router {
    build_app(ServerConfig {
        corpus: dir.path().to_path_buf(),
        engine: EngineConfig::default().with_champion_capacity(champions),
        stop_frequent: 0,
    })
    .unwrap()
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = build_tiny_corpus();
    let (status, body) = call(app(&dir, 0), "/search?q=rust&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 0);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 1);
    assert_eq!(json["mode"], "cosine");
    assert!(arr[0]["snippet"].as_str().unwrap().contains("<em>Rust</em>"));
}

#[tokio::test]
async fn jaccard_mode_and_unknown_mode() {
    let dir = build_tiny_corpus();
    let (status, body) = call(app(&dir, 0), "/search?q=rust&mode=jaccard").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["mode"], "jaccard");
    assert_eq!(json["total_hits"], 2);

    let (status, _) = call(app(&dir, 0), "/search?q=rust&mode=bm25").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn champion_flag_is_reported() {
    let dir = build_tiny_corpus();
    let (_, body) = call(app(&dir, 1), "/search?q=rust&k=1&champions=true").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["champions_used"], true);
    assert_eq!(json["results"][0]["doc_id"], 0);

    let (_, body) = call(app(&dir, 1), "/search?q=rust&k=2&champions=true").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["champions_used"], false);
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn doc_term_and_stats_endpoints() {
    let dir = build_tiny_corpus();
    let (status, body) = call(app(&dir, 2), "/doc/1").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["url"], "https://example.com/1");

    let (status, _) = call(app(&dir, 2), "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(app(&dir, 2), "/term/rust").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["document_frequency"], 2);
    assert_eq!(json["postings"]["0"]["frequency"], 3);

    let (_, body) = call(app(&dir, 2), "/stats").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["num_docs"], 3);
    assert_eq!(json["champion_capacity"], 2);
}
