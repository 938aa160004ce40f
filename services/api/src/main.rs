//! API Service - Public API for the viticulture statistics
//!
//! Endpoints:
//! - GET / - Index of endpoints
//! - GET /health - Health check
//! - GET /api/v1/{dataset} - Records with filters and pagination
//! - GET /api/v1/{dataset}/anos - Distinct years
//! - GET /api/v1/{dataset}/{produtos|cultivares|paises} - Distinct labels

mod pagination;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use vitibrasil_collector::{CacheStore, Config, DataService, HttpFetcher};
use vitibrasil_parser::{Dataset, LabelKind};

use pagination::{paginate, ListQuery, PageLimits};

// ============================================================================
// State
// ============================================================================

struct AppState {
    service: DataService,
    limits: PageLimits,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
struct YearsResponse {
    anos: Vec<i32>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn not_found(message: String) -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message })).into_response()
}

/// Path segment listing the distinct labels of a label kind.
fn listing_segment(kind: LabelKind) -> &'static str {
    match kind {
        LabelKind::Produto => "produtos",
        LabelKind::Cultivar => "cultivares",
        LabelKind::Pais => "paises",
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn index_handler() -> Json<serde_json::Value> {
    let endpoints: serde_json::Map<String, serde_json::Value> = Dataset::ALL
        .iter()
        .map(|d| (d.key().to_string(), format!("/api/v1/{}", d.key()).into()))
        .collect();

    Json(serde_json::json!({
        "message": "API Vitivinicultura Embrapa",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(params): Query<ListQuery>,
) -> Response {
    let dataset: Dataset = match key.parse() {
        Ok(d) => d,
        Err(e) => {
            warn!(key = %key, "request for unknown dataset");
            return not_found(format!("{}", e));
        }
    };

    let (page, per_page) = params.page_params(&state.limits);
    let records: Vec<_> = state
        .service
        .get_data(dataset)
        .await
        .into_iter()
        .filter(|r| params.matches(r))
        .collect();
    debug!(%dataset, page, per_page, matched = records.len(), "listing records");

    Json(paginate(records, page, per_page)).into_response()
}

async fn listing_handler(
    State(state): State<Arc<AppState>>,
    Path((key, listing)): Path<(String, String)>,
) -> Response {
    let dataset: Dataset = match key.parse() {
        Ok(d) => d,
        Err(e) => {
            warn!(key = %key, %listing, "request for unknown dataset");
            return not_found(format!("{}", e));
        }
    };

    if listing == "anos" {
        let anos: BTreeSet<i32> = state
            .service
            .get_data(dataset)
            .await
            .iter()
            .map(|r| r.ano)
            .collect();
        return Json(YearsResponse {
            anos: anos.into_iter().collect(),
        })
        .into_response();
    }

    let segment = listing_segment(dataset.semantics().label_kind);
    if listing != segment {
        warn!(%dataset, %listing, "request for unknown listing");
        return not_found(format!("no listing '{}' for {}", listing, dataset));
    }

    let labels: BTreeSet<String> = state
        .service
        .get_data(dataset)
        .await
        .into_iter()
        .map(|r| r.label.as_str().to_string())
        .collect();

    let mut body = serde_json::Map::new();
    body.insert(
        segment.to_string(),
        labels.into_iter().collect::<Vec<_>>().into(),
    );
    Json(serde_json::Value::Object(body)).into_response()
}

fn router(state: Arc<AppState>) -> Router {
    // CORS for web frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/:dataset", get(list_handler))
        .route("/api/v1/:dataset/:listing", get(listing_handler))
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let bind = std::env::var("API_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    println!("=== Vitibrasil API ===");
    println!("Source: {}", config.base_url);

    let cache = CacheStore::init(&config.cache_dir)
        .await
        .context("Failed to initialize cache directory")?;
    let fetcher = HttpFetcher::from_config(&config).context("Failed to build HTTP client")?;

    let state = Arc::new(AppState {
        service: DataService::new(Arc::new(fetcher), cache),
        limits: PageLimits::from_env(),
    });

    let app = router(state);

    println!("API listening on http://{}", bind);
    println!("\nEndpoints:");
    println!("  GET /health");
    for dataset in Dataset::ALL {
        println!("  GET /api/v1/{}?page=&per_page=&ano=", dataset.key());
        println!("  GET /api/v1/{}/anos", dataset.key());
        println!(
            "  GET /api/v1/{}/{}",
            dataset.key(),
            listing_segment(dataset.semantics().label_kind)
        );
    }

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(%bind, "api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
