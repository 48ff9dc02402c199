use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vsearch_core::corpus::{into_documents, load_records};
use vsearch_core::{DocId, EngineConfig, SearchEngine, Similarity, StandardTokenizer, TermEntry};

type ApiError = (StatusCode, String);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Corpus file or directory loaded at startup.
    pub corpus: PathBuf,
    pub engine: EngineConfig,
    /// Number of most frequent corpus terms to treat as stop words.
    pub stop_frequent: usize,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub champions: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: Similarity,
    pub took_s: f64,
    pub total_hits: usize,
    pub champions_used: bool,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_docs: usize,
    pub num_terms: usize,
    pub champion_capacity: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub config: Arc<EngineConfig>,
}

/// Load the corpus and build the engine before any route exists, so every
/// request sees a finalized index.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let records = load_records(&config.corpus)?;
    let mut tokenizer = StandardTokenizer::new();
    if config.stop_frequent > 0 {
        tokenizer = tokenizer.with_frequent_terms(records.iter().map(|r| r.body.as_str()), config.stop_frequent);
    }
    let documents = into_documents(records, &tokenizer);
    let engine = SearchEngine::with_config(documents, &config.engine, tokenizer)?;
    tracing::info!(num_docs = engine.num_docs(), num_terms = engine.num_terms(), "engine ready");
    Ok(AppState { engine: Arc::new(engine), config: Arc::new(config.engine.clone()) })
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let state = build_state(&config)?;

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/term/:term", get(term_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let mode = match params.mode.as_deref() {
        Some(m) => m.parse::<Similarity>().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        None => Similarity::default(),
    };
    let k = state.config.clamp_k(params.k);
    let outcome = state.engine.search_scored(&params.q, k, mode, params.champions);

    // Raw query words for highlighting; stems would not match the original text
    let raw_terms: Vec<String> = params.q.split_whitespace().map(|s| s.to_string()).collect();
    let results = outcome
        .hits
        .iter()
        .filter_map(|hit| {
            let doc = state.engine.document(hit.doc_id)?;
            Some(SearchResult {
                doc_id: hit.doc_id,
                score: hit.score,
                title: doc.title.clone(),
                url: doc.url.clone(),
                snippet: snippet(&doc.original_content, &raw_terms),
            })
        })
        .collect();

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        mode,
        took_s: elapsed.as_secs_f64(),
        total_hits: outcome.total_hits,
        champions_used: outcome.champions_used,
        results,
    }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = state.engine.document(doc_id).ok_or((StatusCode::NOT_FOUND, format!("document {doc_id} not found")))?;
    Ok(Json(serde_json::json!({
        "doc_id": doc.id,
        "title": doc.title,
        "url": doc.url,
        "text": doc.original_content,
        "length": state.engine.document_length(doc_id),
    })))
}

pub async fn term_handler(State(state): State<AppState>, Path(term): Path<String>) -> Result<Json<TermEntry>, ApiError> {
    state
        .engine
        .term(&term)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("term {term:?} not indexed")))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        num_docs: state.engine.num_docs(),
        num_terms: state.engine.num_terms(),
        champion_capacity: state.engine.champion_capacity(),
    })
}

fn snippet(text: &str, raw_terms: &[String]) -> Option<String> {
    if text.is_empty() { return None; }
    // find first match (case-insensitive) of any raw term
    let first_idx = raw_terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .find_map(|t| term_regex(t).and_then(|re| re.find(text)).map(|m| m.start()));
    let snippet = match first_idx {
        Some(idx) => {
            let start = floor_boundary(text, idx.saturating_sub(100));
            let end = floor_boundary(text, (idx + 200).min(text.len()));
            text[start..end].to_string()
        }
        None => text.chars().take(200).collect(),
    };
    Some(highlight_terms(&snippet, raw_terms))
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) { idx -= 1; }
    idx
}

fn term_regex(term: &str) -> Option<regex::Regex> {
    regex::RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build().ok()
}

fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let mut s = snippet.to_string();
    for t in terms {
        if t.trim().is_empty() { continue; }
        let Some(pat) = term_regex(t) else { continue };
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}
