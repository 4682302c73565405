//! Prometheus metrics for the gateway

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Gateway metrics, registered on a per-instance registry
pub struct GatewayMetrics {
    registry: Registry,
    /// Optimization requests by outcome (`ok`, `validation_error`, ...)
    pub optimization_runs: IntCounterVec,
    /// Wall-clock time spent in the optimizer
    pub optimization_duration_seconds: Histogram,
    /// Ranking requests by outcome
    pub ranking_requests: IntCounterVec,
}

impl GatewayMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let metrics = Self {
            registry: Registry::new(),
            optimization_runs: IntCounterVec::new(
                Opts::new(
                    "coolplan_optimization_runs_total",
                    "Optimization requests processed",
                ),
                &["outcome"],
            )?,
            optimization_duration_seconds: Histogram::with_opts(
                HistogramOpts::new(
                    "coolplan_optimization_duration_seconds",
                    "Optimizer wall-clock duration",
                )
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            )?,
            ranking_requests: IntCounterVec::new(
                Opts::new("coolplan_ranking_requests_total", "MCDA ranking requests processed"),
                &["outcome"],
            )?,
        };

        metrics
            .registry
            .register(Box::new(metrics.optimization_runs.clone()))?;
        metrics
            .registry
            .register(Box::new(metrics.optimization_duration_seconds.clone()))?;
        metrics
            .registry
            .register(Box::new(metrics.ranking_requests.clone()))?;
        Ok(metrics)
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
