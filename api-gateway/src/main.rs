//! Coolplan API Gateway
//!
//! Thin REST boundary over the engine crates:
//! - Heat analysis: intervention portfolio optimization
//! - Recommendations: TOPSIS ranking of alternatives

mod config;
mod metrics;
mod routes;

use anyhow::Result;
use coolplan_optimizer::InterventionOptimizer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::GatewayConfig, metrics::GatewayMetrics, routes::AppState};

// ============ MAIN ============

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::load()?;
    init_tracing(config.json_logs);

    info!("Starting Coolplan gateway v{}", coolplan_common::VERSION);
    info!(
        max_candidates = config.limits.max_candidates,
        max_generations = config.limits.max_generations,
        timeout_ms = config.limits.timeout_ms,
        "Loaded configuration"
    );

    let optimizer = InterventionOptimizer::new(config.optimizer.clone())?;
    let state = AppState::new(optimizer, config.limits.clone(), GatewayMetrics::new()?);
    let app = routes::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Coolplan gateway listening on {}", addr);
    info!("Endpoints: /health, /metrics, /api/heat-analysis/heat-intervention-optimization, /api/recommendations/mcda-ranking, /api/recommendations/custom");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coolplan_gateway=info,coolplan_optimizer=info,tower_http=info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
