//! AllocationVector - fractional implementation degree per candidate
//!
//! Component `i` is the degree to which candidate `i` is implemented:
//! 0 = not implemented, 1 = fully implemented, anything between is a partial or
//! phased rollout. Components are clamped into [0, 1] on every construction path.

use serde::Serialize;

use super::intervention::InterventionCandidate;

/// Box-constrained allocation over a candidate list
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct AllocationVector(Vec<f64>);

impl AllocationVector {
    /// All-zero allocation of length `len`
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// Build from raw components, clamping each into [0, 1]
    ///
    /// NaN components are mapped to 0.
    pub fn from_raw(values: impl IntoIterator<Item = f64>) -> Self {
        Self(values.into_iter().map(clamp_unit).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Σ allocation[i] × f(candidate[i])
    pub fn weighted_sum<F>(&self, candidates: &[InterventionCandidate], f: F) -> f64
    where
        F: Fn(&InterventionCandidate) -> f64,
    {
        self.0
            .iter()
            .zip(candidates)
            .map(|(a, c)| a * f(c))
            .sum()
    }

    /// Σ allocation[i] × cost[i]
    #[inline]
    pub fn total_cost(&self, candidates: &[InterventionCandidate]) -> f64 {
        self.weighted_sum(candidates, |c| c.cost)
    }
}

/// Clamp a component into the unit interval
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
