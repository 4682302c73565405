//! Fitness evaluation over fractional allocations
//!
//! ```text
//! cost = Σ aᵢ·costᵢ
//! cost > budget  →  -1000
//! otherwise      →  0.40·Σ aᵢ·coolingᵢ + 0.20·Σ aᵢ·feasibilityᵢ
//!                 + 0.15·Σ aᵢ·communityᵢ + 0.25·(budget − cost)/budget
//! ```

use coolplan_common::{
    AllocationVector, ConfigurationError, Constraints, InterventionCandidate, ValidationError,
    BUDGET_VIOLATION_PENALTY,
};
use serde::{Deserialize, Serialize};

/// Tolerance on the sum-to-one check for fitness weights
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Relative weights of the four fitness terms; always sums to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightsRecord")]
pub struct FitnessWeights {
    cooling: f64,
    feasibility: f64,
    community: f64,
    budget_slack: f64,
}

#[derive(Deserialize)]
struct WeightsRecord {
    cooling: f64,
    feasibility: f64,
    community: f64,
    budget_slack: f64,
}

impl TryFrom<WeightsRecord> for FitnessWeights {
    type Error = ConfigurationError;

    fn try_from(r: WeightsRecord) -> Result<Self, Self::Error> {
        Self::new(r.cooling, r.feasibility, r.community, r.budget_slack)
    }
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            cooling: 0.40,
            feasibility: 0.20,
            community: 0.15,
            budget_slack: 0.25,
        }
    }
}

impl FitnessWeights {
    /// Create weights that already sum to 1.0
    pub fn new(
        cooling: f64,
        feasibility: f64,
        community: f64,
        budget_slack: f64,
    ) -> Result<Self, ConfigurationError> {
        let weights = Self::checked(cooling, feasibility, community, budget_slack)?;
        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigurationError::FitnessWeightSum { sum });
        }
        Ok(weights)
    }

    /// Create weights from arbitrary non-negative values, rescaled to sum to 1.0
    pub fn normalized(
        cooling: f64,
        feasibility: f64,
        community: f64,
        budget_slack: f64,
    ) -> Result<Self, ConfigurationError> {
        let weights = Self::checked(cooling, feasibility, community, budget_slack)?;
        let sum = weights.sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(ConfigurationError::FitnessWeightSum { sum });
        }
        Ok(Self {
            cooling: cooling / sum,
            feasibility: feasibility / sum,
            community: community / sum,
            budget_slack: budget_slack / sum,
        })
    }

    fn checked(
        cooling: f64,
        feasibility: f64,
        community: f64,
        budget_slack: f64,
    ) -> Result<Self, ConfigurationError> {
        for (name, value) in [
            ("cooling_weight", cooling),
            ("feasibility_weight", feasibility),
            ("community_weight", community),
            ("budget_slack_weight", budget_slack),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        Ok(Self {
            cooling,
            feasibility,
            community,
            budget_slack,
        })
    }

    pub fn cooling(&self) -> f64 {
        self.cooling
    }

    pub fn feasibility(&self) -> f64 {
        self.feasibility
    }

    pub fn community(&self) -> f64 {
        self.community
    }

    pub fn budget_slack(&self) -> f64 {
        self.budget_slack
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.cooling + self.feasibility + self.community + self.budget_slack
    }
}

/// Scores allocation vectors against a candidate set and a budget
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessEvaluator {
    weights: FitnessWeights,
}

impl FitnessEvaluator {
    pub fn new(weights: FitnessWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Score an allocation vector; its length must match the candidate list
    pub fn score(
        &self,
        allocation: &AllocationVector,
        candidates: &[InterventionCandidate],
        constraints: &Constraints,
    ) -> Result<f64, ValidationError> {
        if allocation.len() != candidates.len() {
            return Err(ValidationError::AllocationLength {
                expected: candidates.len(),
                actual: allocation.len(),
            });
        }
        Ok(self.evaluate(allocation.as_slice(), candidates, constraints))
    }

    /// Score raw components; callers guarantee equal lengths
    pub fn evaluate(
        &self,
        allocation: &[f64],
        candidates: &[InterventionCandidate],
        constraints: &Constraints,
    ) -> f64 {
        debug_assert_eq!(allocation.len(), candidates.len());

        let mut total_cost = 0.0;
        let mut cooling = 0.0;
        let mut feasibility = 0.0;
        let mut community = 0.0;
        for (a, c) in allocation.iter().zip(candidates) {
            total_cost += a * c.cost;
            cooling += a * c.cooling_effect;
            feasibility += a * c.feasibility;
            community += a * c.community_benefit;
        }

        let max_budget = constraints.max_budget();
        if total_cost > max_budget {
            return BUDGET_VIOLATION_PENALTY;
        }

        self.weights.cooling * cooling
            + self.weights.feasibility * feasibility
            + self.weights.community * community
            + self.weights.budget_slack * (max_budget - total_cost) / max_budget
    }
}

/// Score an allocation with the default weights
pub fn evaluate(
    allocation: &AllocationVector,
    candidates: &[InterventionCandidate],
    constraints: &Constraints,
) -> Result<f64, ValidationError> {
    FitnessEvaluator::default().score(allocation, candidates, constraints)
}
