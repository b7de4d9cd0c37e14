use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use docsim_core::persist::{load_snapshot, IndexPaths};
use docsim_core::{DocumentView, Error, PriorityHit, QueryContext, SecondaryHit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct DocSearchParams {
    pub doc_id: String,
    /// Topic candidate pool; the snapshot's configured size when absent.
    pub n: Option<usize>,
}

#[derive(Serialize)]
pub struct DocSearchResponse {
    pub query: String,
    pub took_s: f64,
    pub priority: Vec<PriorityHit>,
    pub secondary: Vec<SecondaryHit>,
}

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<QueryContext>,
}

/// Query failures mapped onto HTTP statuses.
pub enum ApiError {
    Query(Error),
    Task(tokio::task::JoinError),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Query(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Query(e @ Error::DocumentNotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Query(e @ Error::MalformedDocId(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Query(e) => {
                tracing::error!(error = %e, "query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Task(e) => {
                tracing::error!(error = %e, "ranking task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "ranking task failed".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn build_app(index_dir: String) -> Result<Router> {
    // Load the snapshot once; every request shares it read-only
    let (ctx, meta) = load_snapshot(&IndexPaths::new(&index_dir))?;
    tracing::info!(num_docs = meta.num_docs, reduced_vocab = meta.reduced_vocab, "snapshot ready");
    Ok(app_with_context(Arc::new(ctx)))
}

pub fn app_with_context(ctx: Arc<QueryContext>) -> Router {
    let app_state = AppState { ctx };

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

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/doc_search", get(doc_search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/doc_ids", get(doc_ids_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn doc_search_handler(
    State(state): State<AppState>,
    Query(params): Query<DocSearchParams>,
) -> Result<Json<DocSearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let ctx = state.ctx.clone();
    let query = params.doc_id.clone();
    // Fine reranking is CPU-bound; keep it off the async workers
    let ranking = tokio::task::spawn_blocking(move || match params.n {
        Some(n) => ctx.closest_docs_with(&params.doc_id, n),
        None => ctx.closest_docs(&params.doc_id),
    })
    .await
    .map_err(ApiError::Task)??;

    let elapsed = start.elapsed();
    tracing::debug!(%query, priority = ranking.priority.len(), secondary = ranking.secondary.len(), "doc search");
    Ok(Json(DocSearchResponse {
        query,
        took_s: elapsed.as_secs_f64(),
        priority: ranking.priority,
        secondary: ranking.secondary,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<DocumentView>, ApiError> {
    Ok(Json(state.ctx.document_view(&doc_id)?))
}

pub async fn doc_ids_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.ctx.corpus.ids().map(str::to_string).collect())
}
