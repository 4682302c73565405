//! Fitness model over fractional allocations

pub mod evaluator;

pub use self::evaluator::{evaluate, FitnessEvaluator, FitnessWeights};
