//! # Coolplan Common
//!
//! Shared types and errors for the Coolplan intervention portfolio engine.
//!
//! ## Core Types
//!
//! - [`InterventionCandidate`]: validated cooling intervention (cost, cooling, feasibility, community)
//! - [`Constraints`]: per-call budget constraint
//! - [`AllocationVector`]: fractional implementation degree per candidate, clamped to [0, 1]
//! - [`OptimizationResult`]: selected interventions, summary, and echoed algorithm parameters
//! - [`Alternative`]/[`CriteriaWeights`]/[`RankedAlternative`]: MCDA ranking types
//!
//! ## Wire Records
//!
//! [`OptimizationRequest`] and [`RankingRequest`] mirror the JSON records exchanged
//! with callers. Records are loosely typed; [`OptimizationRequest::validate`] turns
//! them into the strongly typed inputs the engine accepts.

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ConfigurationError, CoolplanError, OptimizationError, Result, ValidationError};
pub use types::{
    allocation::AllocationVector,
    intervention::{Constraints, ConstraintsRecord, InterventionCandidate, InterventionRecord, RecordId},
    mcda::{Alternative, CriteriaWeights, RankedAlternative, RankingRequest},
    optimization::{
        AlgorithmParams, OptimizationParams, OptimizationRequest, OptimizationResult,
        OptimizationSummary, SelectedIntervention, ValidatedRequest,
    },
};

/// Coolplan version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default population size for the global optimizer
pub const DEFAULT_POPULATION_SIZE: usize = 50;

/// Default generation cap for the global optimizer
pub const DEFAULT_GENERATIONS: usize = 100;

/// Default (informational) mutation rate echoed in results
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;

/// Default (informational) crossover rate echoed in results
pub const DEFAULT_CROSSOVER_RATE: f64 = 0.7;

/// Default optimizer seed
pub const DEFAULT_SEED: u64 = 42;

/// Allocations at or below this fraction are not reported as selected
pub const INCLUSION_THRESHOLD: f64 = 0.1;

/// Fitness returned for any allocation whose cost exceeds the budget
pub const BUDGET_VIOLATION_PENALTY: f64 = -1000.0;
