//! Optimization request and result records
//!
//! The request mirrors the JSON record consumed at the service boundary:
//!
//! ```text
//! { "interventions": [...], "constraints": { "max_budget": .. },
//!   "optimization_params": { "population_size": .., "generations": .., ... } }
//! ```
//!
//! The result is the flat `optimal_interventions` / `optimization_summary` /
//! `algorithm_params` structure returned to the caller.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::intervention::{Constraints, ConstraintsRecord, InterventionCandidate, InterventionRecord};
use crate::error::{CoolplanError, Result, ValidationError};

/// Search parameters; every field is optional on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationParams {
    pub population_size: usize,
    pub generations: usize,
    /// Informational; echoed in the result
    pub mutation_rate: f64,
    /// Informational; echoed in the result
    pub crossover_rate: f64,
    pub seed: u64,
}

impl Default for OptimizationParams {
    fn default() -> Self {
        Self {
            population_size: crate::DEFAULT_POPULATION_SIZE,
            generations: crate::DEFAULT_GENERATIONS,
            mutation_rate: crate::DEFAULT_MUTATION_RATE,
            crossover_rate: crate::DEFAULT_CROSSOVER_RATE,
            seed: crate::DEFAULT_SEED,
        }
    }
}

impl OptimizationParams {
    /// Set population size
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Set generation cap
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Optimization request as received from a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizationRequest {
    #[serde(default)]
    pub interventions: Vec<InterventionRecord>,
    #[serde(default)]
    pub constraints: ConstraintsRecord,
    #[serde(default)]
    pub optimization_params: OptimizationParams,
}

/// Strongly typed inputs ready for the engine
///
/// `constraints` is `None` only when the candidate list is empty and no usable
/// budget was supplied; such a request resolves trivially without a search.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub candidates: Vec<InterventionCandidate>,
    pub constraints: Option<Constraints>,
    pub params: OptimizationParams,
}

impl OptimizationRequest {
    /// Parse a request from a JSON value, reporting shape errors as validation errors
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| CoolplanError::Validation(ValidationError::Malformed(e.to_string())))
    }

    /// Validate every candidate, then the constraints
    ///
    /// An empty candidate list is accepted with any budget.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let candidates = self
            .interventions
            .iter()
            .enumerate()
            .map(|(i, record)| record.validate(i))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for candidate in &candidates {
            if !seen.insert(candidate.id.as_str()) {
                warn!(id = %candidate.id, "Duplicate intervention id in request");
            }
        }

        let constraints = if candidates.is_empty() {
            self.constraints.validate().ok()
        } else {
            Some(self.constraints.validate()?)
        };

        Ok(ValidatedRequest {
            candidates,
            constraints,
            params: self.optimization_params,
        })
    }
}

/// One intervention reported as part of the optimal portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedIntervention {
    pub intervention_id: String,
    /// Allocation in percent, rounded to one decimal
    pub allocation_percentage: f64,
    pub estimated_cost: f64,
    pub expected_cooling: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Aggregate statistics over the selected interventions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub total_budget_utilized: f64,
    pub total_cooling_potential: f64,
    /// Fitness of the raw (unthresholded) best allocation
    pub fitness_score: f64,
    pub convergence_achieved: bool,
    pub optimization_iterations: usize,
}

/// Algorithm configuration echoed back as metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParams {
    pub population_size: usize,
    pub generations_run: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub seed: u64,
}

/// Full optimization response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimal_interventions: Vec<SelectedIntervention>,
    pub optimization_summary: OptimizationSummary,
    pub algorithm_params: AlgorithmParams,
}

impl OptimizationResult {
    /// Trivial result for an empty candidate list
    pub fn empty(params: &OptimizationParams) -> Self {
        Self {
            optimal_interventions: Vec::new(),
            optimization_summary: OptimizationSummary {
                total_budget_utilized: 0.0,
                total_cooling_potential: 0.0,
                fitness_score: 0.0,
                convergence_achieved: true,
                optimization_iterations: 0,
            },
            algorithm_params: AlgorithmParams {
                population_size: params.population_size,
                generations_run: 0,
                mutation_rate: params.mutation_rate,
                crossover_rate: params.crossover_rate,
                seed: params.seed,
            },
        }
    }

    /// Number of selected interventions
    pub fn selected_count(&self) -> usize {
        self.optimal_interventions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use serde_json::json;

    #[test]
    fn test_params_defaults_applied() {
        let request = OptimizationRequest::from_value(json!({
            "interventions": [],
            "constraints": {"max_budget": 100.0},
            "optimization_params": {"generations": 10}
        }))
        .unwrap();

        let params = request.optimization_params;
        assert_eq!(params.generations, 10);
        assert_eq!(params.population_size, crate::DEFAULT_POPULATION_SIZE);
        assert_eq!(params.crossover_rate, crate::DEFAULT_CROSSOVER_RATE);
        assert_eq!(params.seed, crate::DEFAULT_SEED);
    }

    #[test]
    fn test_malformed_field_is_validation_error() {
        let err = OptimizationRequest::from_value(json!({
            "interventions": [{"id": "a", "cost": "expensive"}],
            "constraints": {"max_budget": 100.0}
        }))
        .unwrap_err();
        assert!(matches!(err, CoolplanError::Validation(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_validate_rejects_partial_candidate() {
        let request = OptimizationRequest::from_value(json!({
            "interventions": [
                {"id": "a", "cost": 10, "cooling_effect": 1, "feasibility": 0.5, "community_benefit": 0.5},
                {"id": "b", "cooling_effect": 1, "feasibility": 0.5, "community_benefit": 0.5}
            ],
            "constraints": {"max_budget": 100.0}
        }))
        .unwrap();

        let err = request.validate().unwrap_err();
        assert!(matches!(
            err,
            CoolplanError::Validation(ValidationError::MissingField { index: 1, field: "cost" })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_budget() {
        let request = OptimizationRequest::from_value(json!({
            "interventions": [
                {"id": "a", "cost": 10, "cooling_effect": 1, "feasibility": 0.5, "community_benefit": 0.5}
            ],
            "constraints": {"max_budget": 0}
        }))
        .unwrap();

        assert!(matches!(
            request.validate().unwrap_err(),
            CoolplanError::Configuration(ConfigurationError::InvalidBudget { .. })
        ));
    }

    #[test]
    fn test_empty_candidates_accept_any_budget() {
        let request = OptimizationRequest::from_value(json!({
            "interventions": [],
            "constraints": {"max_budget": -1}
        }))
        .unwrap();

        let validated = request.validate().unwrap();
        assert!(validated.candidates.is_empty());
        assert!(validated.constraints.is_none());
    }

    #[test]
    fn test_empty_result_serialization() {
        let result = OptimizationResult::empty(&OptimizationParams::default());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["optimal_interventions"], json!([]));
        assert_eq!(value["optimization_summary"]["total_budget_utilized"], json!(0.0));
        assert_eq!(value["algorithm_params"]["population_size"], json!(50));
    }
}
