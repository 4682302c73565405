//! # Coolplan Optimizer
//!
//! Intervention portfolio optimization engine.
//!
//! ## Fitness Formula
//!
//! ```text
//! f(a) = 0.40·Σ aᵢ·coolingᵢ + 0.20·Σ aᵢ·feasibilityᵢ + 0.15·Σ aᵢ·communityᵢ
//!      + 0.25·(budget − cost)/budget          if cost = Σ aᵢ·costᵢ ≤ budget
//! f(a) = -1000                                otherwise
//! ```
//!
//! Where `a ∈ [0, 1]^n` is the fractional allocation over the candidates.
//!
//! ## Pipeline
//!
//! ```text
//! OptimizationRequest ──validate──▶ candidates + constraints
//!        │
//!        ▼
//! DifferentialEvolution (seeded) ──▶ best allocation
//!        │
//!        ▼
//! ResultAssembler (allocation > 10%) ──▶ OptimizationResult
//! ```

pub mod assembly;
pub mod evolution;
pub mod fitness;

use coolplan_common::{
    ConfigurationError, Constraints, InterventionCandidate, OptimizationParams,
    OptimizationRequest, OptimizationResult, Result, ValidatedRequest, INCLUSION_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use assembly::{InclusionPolicy, ResultAssembler};
pub use evolution::{
    optimize, Deadline, DifferentialEvolution, EvolutionConfig, NeverStop, SearchOutcome,
    StopSignal,
};
pub use fitness::{evaluate, FitnessEvaluator, FitnessWeights};

/// Engine-level optimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Differential evolution tuning
    pub evolution: EvolutionConfig,
    /// Fitness term weights
    pub weights: FitnessWeights,
    /// Allocations at or below this fraction are not reported
    pub inclusion_threshold: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionConfig::default(),
            weights: FitnessWeights::default(),
            inclusion_threshold: INCLUSION_THRESHOLD,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        self.evolution.validate()?;
        if !(0.0..1.0).contains(&self.inclusion_threshold) {
            return Err(ConfigurationError::OutOfRange {
                name: "inclusion_threshold",
                value: self.inclusion_threshold,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Optimizes intervention portfolios end to end
#[derive(Debug, Clone)]
pub struct InterventionOptimizer {
    config: OptimizerConfig,
    search: DifferentialEvolution,
    assembler: ResultAssembler,
}

impl Default for InterventionOptimizer {
    fn default() -> Self {
        let config = OptimizerConfig::default();
        Self {
            search: DifferentialEvolution::new(
                FitnessEvaluator::new(config.weights),
                config.evolution,
            ),
            assembler: ResultAssembler::new(InclusionPolicy::new(config.inclusion_threshold)),
            config,
        }
    }
}

impl InterventionOptimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search: DifferentialEvolution::new(
                FitnessEvaluator::new(config.weights),
                config.evolution,
            ),
            assembler: ResultAssembler::new(InclusionPolicy::new(config.inclusion_threshold)),
            config,
        })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Validate a raw request and optimize it
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult> {
        self.optimize_until(request, &NeverStop)
    }

    /// Like [`optimize`](Self::optimize), polling `stop` between generations
    pub fn optimize_until(
        &self,
        request: &OptimizationRequest,
        stop: &dyn StopSignal,
    ) -> Result<OptimizationResult> {
        let validated = request.validate()?;
        self.optimize_validated(&validated, stop)
    }

    /// Optimize an already validated request
    pub fn optimize_validated(
        &self,
        validated: &ValidatedRequest,
        stop: &dyn StopSignal,
    ) -> Result<OptimizationResult> {
        if validated.candidates.is_empty() {
            debug!("Empty candidate list, returning trivial result");
            return Ok(OptimizationResult::empty(&validated.params));
        }
        let constraints = validated
            .constraints
            .ok_or(ConfigurationError::MissingBudget)?;
        self.run(&validated.candidates, &constraints, &validated.params, stop)
    }

    /// Search and assemble for typed inputs
    #[instrument(
        skip(self, candidates, constraints, stop),
        fields(candidates = candidates.len(), max_budget = constraints.max_budget())
    )]
    pub fn run(
        &self,
        candidates: &[InterventionCandidate],
        constraints: &Constraints,
        params: &OptimizationParams,
        stop: &dyn StopSignal,
    ) -> Result<OptimizationResult> {
        if candidates.is_empty() {
            return Ok(OptimizationResult::empty(params));
        }
        let outcome = self.search.run_until(
            candidates,
            constraints,
            params.population_size,
            params.generations,
            params.seed,
            stop,
        )?;
        self.assembler.assemble(candidates, &outcome, params)
    }
}
