//! Intervention candidates and budget constraints
//!
//! Candidates arrive from the caller as loosely typed [`InterventionRecord`]s and
//! are validated into [`InterventionCandidate`]s before any search runs. The
//! engine only ever reads candidates; it never mutates caller-owned data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ValidationError};

/// Candidate identifier as it appears on the wire (string or number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Raw intervention record supplied by an external collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterventionRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub cooling_effect: Option<f64>,
    #[serde(default)]
    pub feasibility: Option<f64>,
    #[serde(default)]
    pub community_benefit: Option<f64>,
    /// Intervention category, e.g. "green_corridor" or "cool_roof"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_type: Option<String>,
    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InterventionRecord {
    /// Validate the record at position `index` into a candidate
    pub fn validate(&self, index: usize) -> Result<InterventionCandidate, ValidationError> {
        let id = self
            .id
            .as_ref()
            .ok_or(ValidationError::MissingField { index, field: "id" })?
            .to_string();

        let cost = non_negative(index, "cost", required(index, "cost", self.cost)?)?;
        let cooling_effect = non_negative(
            index,
            "cooling_effect",
            required(index, "cooling_effect", self.cooling_effect)?,
        )?;
        let feasibility = non_negative(
            index,
            "feasibility",
            required(index, "feasibility", self.feasibility)?,
        )?;
        let community_benefit = non_negative(
            index,
            "community_benefit",
            required(index, "community_benefit", self.community_benefit)?,
        )?;

        Ok(InterventionCandidate {
            id,
            cost,
            cooling_effect,
            feasibility,
            community_benefit,
            intervention_type: self.intervention_type.clone(),
            name: self.name.clone(),
        })
    }
}

fn required(index: usize, field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField { index, field })?;
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { index, field });
    }
    Ok(value)
}

fn non_negative(index: usize, field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value < 0.0 {
        return Err(ValidationError::Negative { index, field, value });
    }
    Ok(value)
}

/// A validated cooling intervention candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionCandidate {
    /// Caller-assigned identifier
    pub id: String,
    /// Full implementation cost (currency units, >= 0)
    pub cost: f64,
    /// Expected temperature reduction at full implementation (>= 0)
    pub cooling_effect: f64,
    /// Feasibility score, conventionally 0-1
    pub feasibility: f64,
    /// Community benefit score, conventionally 0-1
    pub community_benefit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InterventionCandidate {
    /// Create a candidate from its numeric attributes
    pub fn new(
        id: impl Into<String>,
        cost: f64,
        cooling_effect: f64,
        feasibility: f64,
        community_benefit: f64,
    ) -> Self {
        Self {
            id: id.into(),
            cost,
            cooling_effect,
            feasibility,
            community_benefit,
            intervention_type: None,
            name: None,
        }
    }

    /// Set intervention type
    pub fn with_type(mut self, intervention_type: impl Into<String>) -> Self {
        self.intervention_type = Some(intervention_type.into());
        self
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Raw constraints record; `max_budget` may be absent on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintsRecord {
    #[serde(default)]
    pub max_budget: Option<f64>,
}

impl ConstraintsRecord {
    pub fn validate(&self) -> Result<Constraints, ConfigurationError> {
        let max_budget = self.max_budget.ok_or(ConfigurationError::MissingBudget)?;
        Constraints::new(max_budget)
    }
}

/// Per-call optimization constraints
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Constraints {
    max_budget: f64,
}

impl Constraints {
    /// Create constraints; `max_budget` must be positive and finite
    pub fn new(max_budget: f64) -> Result<Self, ConfigurationError> {
        if !max_budget.is_finite() || max_budget <= 0.0 {
            return Err(ConfigurationError::InvalidBudget { max_budget });
        }
        Ok(Self { max_budget })
    }

    #[inline]
    pub fn max_budget(&self) -> f64 {
        self.max_budget
    }
}
