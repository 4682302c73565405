//! Differential evolution over the allocation box [0, 1]^n
//!
//! Classic `rand/1/bin`: for every target, three other distinct members form a
//! mutant `base + F·(a − b)`, binomial crossover with probability `CR` builds the
//! trial, the trial is clamped into the box and replaces the target in the next
//! generation when its fitness is at least as good. Fitness is maximized.
//!
//! Part of the initial population is shrunk inside the budget so the search
//! starts with feasible members even when random vectors almost never are.
//! Convergence is only declared once every member is feasible.
//!
//! All randomness comes from a ChaCha8 stream seeded per call, so identical
//! inputs reproduce identical searches and concurrent calls share nothing.

use coolplan_common::types::allocation::clamp_unit;
use coolplan_common::{
    AllocationVector, ConfigurationError, Constraints, InterventionCandidate, OptimizationError,
    Result, BUDGET_VIOLATION_PENALTY,
};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::signal::{NeverStop, StopSignal};
use crate::fitness::FitnessEvaluator;

/// Smallest population that can supply three distinct donors per target
pub const MIN_POPULATION_SIZE: usize = 4;

/// Differential evolution tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Differential weight F applied to the donor difference
    pub differential_weight: f64,
    /// Binomial crossover probability CR
    pub crossover_probability: f64,
    /// Relative convergence tolerance on the population fitness spread
    pub tolerance: f64,
    /// Absolute convergence tolerance on the population fitness spread
    pub absolute_tolerance: f64,
    /// Share of the initial population scaled to fit inside the budget
    pub feasible_seed_fraction: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            differential_weight: 0.8,
            crossover_probability: 0.7,
            tolerance: 0.01,
            absolute_tolerance: 0.0,
            feasible_seed_fraction: 0.5,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        check_range("differential_weight", self.differential_weight, 0.0, 2.0)?;
        check_range("crossover_probability", self.crossover_probability, 0.0, 1.0)?;
        check_range("tolerance", self.tolerance, 0.0, f64::MAX)?;
        check_range("absolute_tolerance", self.absolute_tolerance, 0.0, f64::MAX)?;
        check_range("feasible_seed_fraction", self.feasible_seed_fraction, 0.0, 1.0)?;
        Ok(())
    }
}

fn check_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> std::result::Result<(), ConfigurationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigurationError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Outcome of one search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Best allocation seen across all generations
    pub best_allocation: AllocationVector,
    /// Fitness of `best_allocation`
    pub best_fitness: f64,
    /// Generations completed
    pub iterations: usize,
    /// Population fitness spread fell below tolerance
    pub converged: bool,
    /// Search ended because the stop signal fired
    pub cancelled: bool,
}

impl SearchOutcome {
    fn trivial() -> Self {
        Self {
            best_allocation: AllocationVector::zeros(0),
            best_fitness: 0.0,
            iterations: 0,
            converged: true,
            cancelled: false,
        }
    }
}

/// Population-based global optimizer for allocation vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferentialEvolution {
    evaluator: FitnessEvaluator,
    config: EvolutionConfig,
}

impl DifferentialEvolution {
    pub fn new(evaluator: FitnessEvaluator, config: EvolutionConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Run to the generation cap or convergence
    pub fn run(
        &self,
        candidates: &[InterventionCandidate],
        constraints: &Constraints,
        population_size: usize,
        generations: usize,
        seed: u64,
    ) -> Result<SearchOutcome> {
        self.run_until(
            candidates,
            constraints,
            population_size,
            generations,
            seed,
            &NeverStop,
        )
    }

    /// Run, polling `stop` before every generation
    #[instrument(
        skip(self, candidates, constraints, stop),
        fields(candidates = candidates.len(), max_budget = constraints.max_budget())
    )]
    pub fn run_until(
        &self,
        candidates: &[InterventionCandidate],
        constraints: &Constraints,
        population_size: usize,
        generations: usize,
        seed: u64,
        stop: &dyn StopSignal,
    ) -> Result<SearchOutcome> {
        if candidates.is_empty() {
            debug!("No candidates, skipping search");
            return Ok(SearchOutcome::trivial());
        }
        if population_size < MIN_POPULATION_SIZE {
            return Err(ConfigurationError::PopulationTooSmall {
                size: population_size,
                minimum: MIN_POPULATION_SIZE,
            }
            .into());
        }
        if generations == 0 {
            return Err(ConfigurationError::ZeroGenerations.into());
        }
        self.config.validate()?;

        let dims = candidates.len();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let seeded = (population_size as f64 * self.config.feasible_seed_fraction).round() as usize;
        let mut population = Vec::with_capacity(population_size);
        for i in 0..population_size {
            let mut member: Vec<f64> = (0..dims).map(|_| rng.gen::<f64>()).collect();
            if i < seeded {
                pull_within_budget(&mut member, candidates, constraints.max_budget(), &mut rng);
            }
            population.push(member);
        }
        let mut scores = population
            .iter()
            .map(|member| self.score(member, candidates, constraints))
            .collect::<Result<Vec<f64>>>()?;

        let (mut best_idx, mut best_fitness) = (0, scores[0]);
        for (i, &s) in scores.iter().enumerate().skip(1) {
            if s > best_fitness {
                best_idx = i;
                best_fitness = s;
            }
        }
        let mut best = population[best_idx].clone();

        let mut iterations = 0;
        let mut converged = false;
        let mut cancelled = false;

        for generation in 1..=generations {
            if stop.should_stop() {
                warn!(generation, "Stop requested, returning best allocation so far");
                cancelled = true;
                break;
            }

            let mut next_population = population.clone();
            let mut next_scores = scores.clone();

            for target in 0..population_size {
                let trial = self.trial_vector(&population, target, &mut rng);
                let trial_score = self.score(&trial, candidates, constraints)?;

                if trial_score >= scores[target] {
                    if trial_score > best_fitness {
                        best_fitness = trial_score;
                        best.clone_from(&trial);
                    }
                    next_population[target] = trial;
                    next_scores[target] = trial_score;
                }
            }

            population = next_population;
            scores = next_scores;
            iterations = generation;

            let (mean, spread) = mean_and_std(&scores);
            debug!(generation, best_fitness, mean, spread, "Generation complete");

            // A population resting on the penalty plateau has zero spread but has not converged.
            let all_feasible = scores.iter().all(|&s| s > BUDGET_VIOLATION_PENALTY);
            if all_feasible
                && spread <= self.config.absolute_tolerance + self.config.tolerance * mean.abs()
            {
                converged = true;
                break;
            }
        }

        let mut best_allocation = AllocationVector::from_raw(best);
        if best_fitness == BUDGET_VIOLATION_PENALTY {
            // The empty portfolio is always within budget.
            warn!("No feasible allocation found, falling back to the empty portfolio");
            best_allocation = AllocationVector::zeros(dims);
            best_fitness = self.score(best_allocation.as_slice(), candidates, constraints)?;
            converged = false;
        }

        info!(
            iterations,
            converged, cancelled, best_fitness, "Differential evolution finished"
        );

        Ok(SearchOutcome {
            best_allocation,
            best_fitness,
            iterations,
            converged,
            cancelled,
        })
    }

    /// Build a clamped trial vector for `target`
    fn trial_vector(&self, population: &[Vec<f64>], target: usize, rng: &mut ChaCha8Rng) -> Vec<f64> {
        // Three distinct donors drawn from everyone but the target.
        let donors = index::sample(rng, population.len() - 1, 3);
        let pick = |k: usize| {
            let i = donors.index(k);
            if i >= target {
                i + 1
            } else {
                i
            }
        };
        let (base, a, b) = (&population[pick(0)], &population[pick(1)], &population[pick(2)]);
        let current = &population[target];

        let dims = current.len();
        let forced = rng.gen_range(0..dims);
        let f = self.config.differential_weight;
        let cr = self.config.crossover_probability;

        (0..dims)
            .map(|j| {
                let from_mutant = j == forced || rng.gen::<f64>() < cr;
                if from_mutant {
                    clamp_unit(base[j] + f * (a[j] - b[j]))
                } else {
                    current[j]
                }
            })
            .collect()
    }

    fn score(
        &self,
        allocation: &[f64],
        candidates: &[InterventionCandidate],
        constraints: &Constraints,
    ) -> Result<f64> {
        let value = self.evaluator.evaluate(allocation, candidates, constraints);
        if !value.is_finite() {
            return Err(OptimizationError::NonFiniteFitness { value }.into());
        }
        Ok(value)
    }
}

/// Shrink an over-budget member toward the origin so it lands strictly inside the budget
fn pull_within_budget(
    member: &mut [f64],
    candidates: &[InterventionCandidate],
    max_budget: f64,
    rng: &mut ChaCha8Rng,
) {
    let cost: f64 = member.iter().zip(candidates).map(|(a, c)| a * c.cost).sum();
    if cost > max_budget {
        let scale = max_budget / cost * rng.gen_range(0.5..0.99);
        for a in member.iter_mut() {
            *a *= scale;
        }
    }
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Search with default fitness weights and evolution settings
///
/// Returns `(best_allocation, iterations_run, converged)`.
pub fn optimize(
    candidates: &[InterventionCandidate],
    constraints: &Constraints,
    population_size: usize,
    generations: usize,
    seed: u64,
) -> Result<(AllocationVector, usize, bool)> {
    let outcome = DifferentialEvolution::default().run(
        candidates,
        constraints,
        population_size,
        generations,
        seed,
    )?;
    Ok((outcome.best_allocation, outcome.iterations, outcome.converged))
}
