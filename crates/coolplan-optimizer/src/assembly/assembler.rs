//! Result assembly: continuous best allocation → interpretable portfolio
//!
//! Totals are summed over the *selected* interventions only, so the reported
//! budget never exceeds the cost of the raw (feasible) best allocation.

use coolplan_common::{
    AlgorithmParams, InterventionCandidate, OptimizationError, OptimizationParams,
    OptimizationResult, OptimizationSummary, Result, SelectedIntervention, ValidationError,
};

use super::inclusion::InclusionPolicy;
use crate::evolution::SearchOutcome;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler {
    policy: InclusionPolicy,
}

impl ResultAssembler {
    pub fn new(policy: InclusionPolicy) -> Self {
        Self { policy }
    }

    pub fn assemble(
        &self,
        candidates: &[InterventionCandidate],
        outcome: &SearchOutcome,
        params: &OptimizationParams,
    ) -> Result<OptimizationResult> {
        let allocation = outcome.best_allocation.as_slice();
        if allocation.len() != candidates.len() {
            return Err(ValidationError::AllocationLength {
                expected: candidates.len(),
                actual: allocation.len(),
            }
            .into());
        }

        let mut selected = Vec::new();
        let mut total_budget = 0.0;
        let mut total_cooling = 0.0;

        for (&a, candidate) in allocation.iter().zip(candidates) {
            if !self.policy.should_include(a) {
                continue;
            }
            let estimated_cost = candidate.cost * a;
            let expected_cooling = candidate.cooling_effect * a;
            total_budget += estimated_cost;
            total_cooling += expected_cooling;

            selected.push(SelectedIntervention {
                intervention_id: candidate.id.clone(),
                allocation_percentage: round_to(a * 100.0, 1),
                estimated_cost,
                expected_cooling,
                intervention_type: candidate.intervention_type.clone(),
                name: candidate.name.clone(),
            });
        }

        ensure_finite("total_budget_utilized", total_budget)?;
        ensure_finite("total_cooling_potential", total_cooling)?;
        if !outcome.best_fitness.is_finite() {
            return Err(OptimizationError::NonFiniteFitness {
                value: outcome.best_fitness,
            }
            .into());
        }

        Ok(OptimizationResult {
            optimal_interventions: selected,
            optimization_summary: OptimizationSummary {
                total_budget_utilized: total_budget,
                total_cooling_potential: total_cooling,
                fitness_score: outcome.best_fitness,
                convergence_achieved: outcome.converged,
                optimization_iterations: outcome.iterations,
            },
            algorithm_params: AlgorithmParams {
                population_size: params.population_size,
                generations_run: outcome.iterations,
                mutation_rate: params.mutation_rate,
                crossover_rate: params.crossover_rate,
                seed: params.seed,
            },
        })
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OptimizationError::NonFiniteTotal { field }.into())
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
