//! Gateway configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. optional `coolplan.toml` in the working directory
//! 3. `COOLPLAN__*` environment variables (`COOLPLAN__PORT`, `COOLPLAN__LIMITS__TIMEOUT_MS`, ...)
//! 4. `PORT`, for platforms that inject it

use std::time::Duration;

use anyhow::Result;
use coolplan_optimizer::OptimizerConfig;
use serde::{Deserialize, Serialize};

/// Gateway service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
    /// Engine configuration shared by every request
    pub optimizer: OptimizerConfig,
    /// Per-request guards
    pub limits: RequestLimits,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            json_logs: false,
            optimizer: OptimizerConfig::default(),
            limits: RequestLimits::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from `.env`, the optional config file and the environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg: Self = config::Config::builder()
            .add_source(config::File::with_name("coolplan").required(false))
            .add_source(
                config::Environment::with_prefix("COOLPLAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        cfg.optimizer.validate()?;
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upper bounds applied to each optimization request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLimits {
    pub max_candidates: usize,
    pub max_population_size: usize,
    pub max_generations: usize,
    /// Wall-clock budget for one search; the best-so-far is returned when it runs out
    pub timeout_ms: u64,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_candidates: 500,
            max_population_size: 500,
            max_generations: 1_000,
            timeout_ms: 30_000,
        }
    }
}

impl RequestLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
