use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::catalog::{AffinityGrades, SkillCatalog};
use crate::config::Config;
use crate::history::{PlanRecord, PlanStore};
use crate::planner::{self, extract::extract_candidates, PlanResult, ScoringMode};
use crate::rows::{parse_rows, serialize_rows, RawRow};

#[derive(Clone)]
struct ApiState {
    config: Config,
    catalog: Arc<SkillCatalog>,
    db_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct OptimizeRequest {
    /// Build rows in the compact text format, one per line.
    rows: String,
    budget: Option<u32>,
    mode: Option<String>,
    fast_learner: Option<bool>,
    #[serde(default)]
    affinity: Option<AffinityGrades>,
    #[serde(default = "default_true")]
    persist_history: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ParseRowsRequest {
    rows: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct HistoryRequest {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    source: String,
    raw_hash: String,
    entries: usize,
}

#[derive(Debug, Serialize)]
struct ParseRowsResponse {
    rows: Vec<RawRow>,
    canonical: String,
}

#[derive(Debug, Serialize)]
struct OptimizeResponse {
    mode: ScoringMode,
    plan: PlanResult,
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    captured_at: String,
    mode: ScoringMode,
    catalog_hash: String,
    plan: PlanResult,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    records: Vec<HistoryEntry>,
}

pub async fn run_server(config: Config, catalog: SkillCatalog, bind: SocketAddr) -> Result<()> {
    let state = ApiState {
        db_path: config.resolved_db_path(),
        config,
        catalog: Arc::new(catalog),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/catalog", get(catalog_info))
        .route("/v1/rows/parse", post(rows_parse))
        .route("/v1/optimize", post(optimize))
        .route("/v1/history", post(history))
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn catalog_info(State(state): State<ApiState>) -> Json<ApiResponse<CatalogResponse>> {
    ok(CatalogResponse {
        source: state.catalog.source.clone(),
        raw_hash: state.catalog.raw_hash.clone(),
        entries: state.catalog.len(),
    })
}

async fn rows_parse(Json(request): Json<ParseRowsRequest>) -> ApiResult<ParseRowsResponse> {
    let rows = parse_rows(&request.rows).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let canonical = serialize_rows(&rows);
    Ok(ok(ParseRowsResponse { rows, canonical }))
}

async fn optimize(
    State(state): State<ApiState>,
    Json(request): Json<OptimizeRequest>,
) -> ApiResult<OptimizeResponse> {
    let rows = parse_rows(&request.rows).map_err(|e| ApiError::bad_request(e.to_string()))?;
    if rows.is_empty() {
        return Err(ApiError::bad_request("no build rows provided"));
    }

    let budget = request.budget.unwrap_or(state.config.planner.budget);
    let mode = match request.mode.as_deref() {
        Some(raw) => {
            ScoringMode::from_str(raw).map_err(|e| ApiError::bad_request(e.to_string()))?
        }
        None => state.config.planner.mode,
    };
    let fast_learner = request
        .fast_learner
        .unwrap_or(state.config.planner.fast_learner);
    let grades = request
        .affinity
        .unwrap_or_else(|| state.config.affinity.clone());

    let candidates = extract_candidates(&rows, &state.catalog, &grades, fast_learner);
    let plan = planner::optimize(&candidates, budget, mode);

    if request.persist_history {
        let store = open_store(&state)?;
        let record = PlanRecord::new(
            state.catalog.raw_hash.clone(),
            mode,
            serialize_rows(&rows),
            plan.clone(),
        );
        store.insert_plan(&record).map_err(ApiError::internal)?;
    }

    Ok(ok(OptimizeResponse { mode, plan }))
}

async fn history(
    State(state): State<ApiState>,
    Json(request): Json<HistoryRequest>,
) -> ApiResult<HistoryResponse> {
    let limit = request.limit.unwrap_or(20).clamp(1, 500);
    let store = open_store(&state)?;
    let records = store
        .load_recent(limit)
        .map_err(ApiError::internal)?
        .into_iter()
        .map(|record| HistoryEntry {
            captured_at: record.captured_at.to_rfc3339(),
            mode: record.mode,
            catalog_hash: record.catalog_hash,
            plan: record.plan,
        })
        .collect();
    Ok(ok(HistoryResponse { records }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn default_true() -> bool {
    true
}

fn open_store(state: &ApiState) -> std::result::Result<PlanStore, ApiError> {
    PlanStore::open(&state.db_path).map_err(ApiError::internal)
}
