//! HTTP routes and handlers

use std::{sync::Arc, time::Instant};

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use coolplan_common::{
    ConfigurationError, CoolplanError, OptimizationRequest, OptimizationResult, RankedAlternative,
    RankingRequest, ValidatedRequest,
};
use coolplan_optimizer::{Deadline, InterventionOptimizer};
use serde::Serialize;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{config::RequestLimits, metrics::GatewayMetrics};

/// Budget applied by the recommendation route when the caller sends no constraints
pub const DEFAULT_RECOMMENDATION_BUDGET: f64 = 1_000_000.0;

// ============ STATE ============

#[derive(Clone)]
pub struct AppState {
    optimizer: Arc<InterventionOptimizer>,
    limits: Arc<RequestLimits>,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    pub fn new(
        optimizer: InterventionOptimizer,
        limits: RequestLimits,
        metrics: GatewayMetrics,
    ) -> Self {
        Self {
            optimizer: Arc::new(optimizer),
            limits: Arc::new(limits),
            metrics: Arc::new(metrics),
        }
    }
}

// ============ ERRORS ============

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] CoolplanError),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Metrics unavailable: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(CoolplanError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Engine(CoolplanError::Configuration(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => e.code(),
            ApiError::Worker(_) | ApiError::Metrics(_) => "internal_error",
        }
    }
}

impl From<ConfigurationError> for ApiError {
    fn from(e: ConfigurationError) -> Self {
        ApiError::Engine(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Request failed");
        }
        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

// ============ RESPONSES ============

/// Bookkeeping for one optimization run
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResponse {
    #[serde(flatten)]
    pub result: OptimizationResult,
    pub run: RunInfo,
}

// ============ HANDLERS ============

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": coolplan_common::VERSION,
        "services": {
            "optimizer": true,
            "mcda": true
        }
    }))
}

async fn render_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let text = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response())
}

async fn optimize_interventions(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<OptimizationResponse>, ApiError> {
    let outcome = run_optimization(&state, body).await;
    record_run(&state, outcome)
}

/// Same search as the heat-analysis route, with a default budget
///
/// Extra fields such as `city` are accepted and ignored.
async fn recommend_custom(
    State(state): State<AppState>,
    Json(mut body): Json<serde_json::Value>,
) -> Result<Json<OptimizationResponse>, ApiError> {
    if let Some(fields) = body.as_object_mut() {
        fields
            .entry("constraints")
            .or_insert_with(|| serde_json::json!({ "max_budget": DEFAULT_RECOMMENDATION_BUDGET }));
    }
    let outcome = run_optimization(&state, body).await;
    record_run(&state, outcome)
}

fn record_run(
    state: &AppState,
    outcome: Result<OptimizationResponse, ApiError>,
) -> Result<Json<OptimizationResponse>, ApiError> {
    let label = match &outcome {
        Ok(_) => "ok",
        Err(e) => e.code(),
    };
    state
        .metrics
        .optimization_runs
        .with_label_values(&[label])
        .inc();
    outcome.map(Json)
}

async fn run_optimization(
    state: &AppState,
    body: serde_json::Value,
) -> Result<OptimizationResponse, ApiError> {
    let validated = OptimizationRequest::from_value(body)?.validate()?;
    check_limits(&validated, &state.limits)?;

    let optimizer = Arc::clone(&state.optimizer);
    let deadline = Deadline::after(state.limits.timeout());
    let started = Instant::now();
    let computed_at = Utc::now();

    let result = tokio::task::spawn_blocking(move || {
        optimizer.optimize_validated(&validated, &deadline)
    })
    .await
    .map_err(|e| ApiError::Worker(e.to_string()))??;

    let elapsed = started.elapsed();
    state
        .metrics
        .optimization_duration_seconds
        .observe(elapsed.as_secs_f64());

    let run = RunInfo {
        run_id: Uuid::now_v7(),
        computed_at,
        execution_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    };
    info!(
        run_id = %run.run_id,
        selected = result.selected_count(),
        iterations = result.optimization_summary.optimization_iterations,
        converged = result.optimization_summary.convergence_achieved,
        execution_time_ms = run.execution_time_ms,
        "Optimization run complete"
    );

    Ok(OptimizationResponse { result, run })
}

fn check_limits(validated: &ValidatedRequest, limits: &RequestLimits) -> Result<(), ConfigurationError> {
    let checks = [
        ("interventions", validated.candidates.len(), limits.max_candidates),
        ("population_size", validated.params.population_size, limits.max_population_size),
        ("generations", validated.params.generations, limits.max_generations),
    ];
    for (what, actual, limit) in checks {
        if actual > limit {
            return Err(ConfigurationError::RequestLimit { what, actual, limit });
        }
    }
    Ok(())
}

async fn rank_alternatives(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Vec<RankedAlternative>>, ApiError> {
    let outcome = RankingRequest::from_value(body)
        .and_then(|request| coolplan_mcda::rank_request(&request))
        .map_err(ApiError::from);
    let label = match &outcome {
        Ok(_) => "ok",
        Err(e) => e.code(),
    };
    state.metrics.ranking_requests.with_label_values(&[label]).inc();
    outcome.map(Json)
}

// ============ ROUTER ============

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        // Health & Metrics
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        // Heat analysis
        .route(
            "/api/heat-analysis/heat-intervention-optimization",
            post(optimize_interventions),
        )
        // Recommendations
        .route("/api/recommendations/mcda-ranking", post(rank_alternatives))
        .route("/api/recommendations/custom", post(recommend_custom))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
