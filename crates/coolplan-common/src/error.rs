//! Error types for the Coolplan engine
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using CoolplanError
pub type Result<T> = std::result::Result<T, CoolplanError>;

/// Unified error type for Coolplan operations
#[derive(Debug, Error)]
pub enum CoolplanError {
    // Input record errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // Constraint / parameter errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    // Numeric failures during search or assembly
    #[error("Optimization error: {0}")]
    Optimization(#[from] OptimizationError),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoolplanError {
    /// Stable machine-readable code for the error family
    pub fn code(&self) -> &'static str {
        match self {
            CoolplanError::Validation(_) => "validation_error",
            CoolplanError::Configuration(_) => "configuration_error",
            CoolplanError::Optimization(_) => "optimization_error",
            CoolplanError::Serialization(_) => "serialization_error",
            CoolplanError::Internal(_) => "internal_error",
        }
    }
}

/// Malformed or partially specified input records
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Intervention {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("Intervention {index} field `{field}` is not a finite number")]
    NonFinite { index: usize, field: &'static str },

    #[error("Intervention {index} field `{field}` must be non-negative, got {value}")]
    Negative {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Allocation length {actual} does not match candidate count {expected}")]
    AllocationLength { expected: usize, actual: usize },

    #[error("Alternative {alternative} is missing criterion `{criterion}`")]
    MissingCriterion {
        alternative: usize,
        criterion: String,
    },

    #[error("Alternative {alternative} criterion `{criterion}` is not a finite number")]
    NonFiniteCriterion {
        alternative: usize,
        criterion: String,
    },

    #[error("Criterion weight `{criterion}` is not a finite number")]
    NonFiniteWeight { criterion: String },

    #[error("At least one criterion weight is required")]
    NoCriteria,

    #[error("Malformed request: {0}")]
    Malformed(String),
}

/// Invalid constraints or optimizer parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Constraint `max_budget` is required")]
    MissingBudget,

    #[error("max_budget must be a positive finite number, got {max_budget}")]
    InvalidBudget { max_budget: f64 },

    #[error("Population size {size} is below the minimum of {minimum}")]
    PopulationTooSmall { size: usize, minimum: usize },

    #[error("Generation count must be at least 1")]
    ZeroGenerations,

    #[error("Parameter `{name}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Fitness weights must sum to 1.0, got {sum}")]
    FitnessWeightSum { sum: f64 },

    #[error("Request exceeds limit for {what}: {actual} > {limit}")]
    RequestLimit {
        what: &'static str,
        actual: usize,
        limit: usize,
    },
}

/// Numeric failures; the call cannot produce a trustworthy result
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizationError {
    #[error("Fitness evaluation produced a non-finite value: {value}")]
    NonFiniteFitness { value: f64 },

    #[error("Summary total `{field}` is not finite")]
    NonFiniteTotal { field: &'static str },

    #[error("TOPSIS score for alternative {index} is not finite")]
    NonFiniteScore { index: usize },

    #[error("Column norm for criterion `{criterion}` is not finite")]
    NonFiniteNorm { criterion: String },
}

// Implement From for common external error types
impl From<serde_json::Error> for CoolplanError {
    fn from(err: serde_json::Error) -> Self {
        CoolplanError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for CoolplanError {
    fn from(err: anyhow::Error) -> Self {
        CoolplanError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoolplanError::Validation(ValidationError::MissingField {
            index: 2,
            field: "cost",
        });
        assert!(err.to_string().contains("`cost`"));
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_configuration_error() {
        let err: CoolplanError = ConfigurationError::InvalidBudget { max_budget: -5.0 }.into();
        assert!(err.to_string().contains("-5"));
        assert_eq!(err.code(), "configuration_error");
    }
}
