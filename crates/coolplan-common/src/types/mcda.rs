//! Multi-criteria decision analysis types
//!
//! [`CriteriaWeights`] keeps criteria in the order the caller supplied them; that
//! order defines the column order of the TOPSIS decision matrix.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoolplanError, Result as CoolplanResult, ValidationError};

/// A named set of criterion values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alternative {
    pub values: HashMap<String, f64>,
}

impl Alternative {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a criterion value
    pub fn with(mut self, criterion: impl Into<String>, value: f64) -> Self {
        self.values.insert(criterion.into(), value);
        self
    }

    pub fn get(&self, criterion: &str) -> Option<f64> {
        self.values.get(criterion).copied()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Alternative {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Ordered criterion → weight mapping
///
/// Weights are used as supplied; normalizing them is the caller's responsibility.
/// Re-inserting an existing criterion replaces its weight in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaWeights {
    entries: Vec<(String, f64)>,
}

impl CriteriaWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append (or replace) a criterion weight
    pub fn with(mut self, criterion: impl Into<String>, weight: f64) -> Self {
        self.insert(criterion, weight);
        self
    }

    pub fn insert(&mut self, criterion: impl Into<String>, weight: f64) {
        let criterion = criterion.into();
        match self.entries.iter_mut().find(|(name, _)| *name == criterion) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((criterion, weight)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, w)| (name.as_str(), *w))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for CriteriaWeights {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut weights = Self::new();
        for (criterion, weight) in iter {
            weights.insert(criterion, weight);
        }
        weights
    }
}

impl Serialize for CriteriaWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, weight) in &self.entries {
            map.serialize_entry(name, weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CriteriaWeights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeightsVisitor;

        impl<'de> Visitor<'de> for WeightsVisitor {
            type Value = CriteriaWeights;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of criterion names to numeric weights")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut weights = CriteriaWeights::new();
                while let Some((name, weight)) = access.next_entry::<String, f64>()? {
                    weights.insert(name, weight);
                }
                Ok(weights)
            }
        }

        deserializer.deserialize_map(WeightsVisitor)
    }
}

/// One alternative's TOPSIS outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    /// Position of the alternative in the input list
    pub alternative_index: usize,
    /// Relative closeness to the ideal, in [0, 1]
    pub topsis_score: f64,
    /// 1 = best
    pub rank: usize,
}

/// Ranking request as received from a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingRequest {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub criteria_weights: CriteriaWeights,
}

impl RankingRequest {
    /// Parse a request from a JSON value, reporting shape errors as validation errors
    pub fn from_value(value: serde_json::Value) -> CoolplanResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| CoolplanError::Validation(ValidationError::Malformed(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_preserve_document_order() {
        let weights: CriteriaWeights =
            serde_json::from_str(r#"{"zeta": 0.5, "alpha": 0.3, "mid": 0.2}"#).unwrap();
        let names: Vec<&str> = weights.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&weights).unwrap();
        assert_eq!(json, r#"{"zeta":0.5,"alpha":0.3,"mid":0.2}"#);
    }

    #[test]
    fn test_weights_reinsert_replaces() {
        let weights = CriteriaWeights::new()
            .with("cooling", 0.4)
            .with("cost", 0.6)
            .with("cooling", 0.1);
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.iter().next(), Some(("cooling", 0.1)));
    }

    #[test]
    fn test_ranking_request_shape_errors() {
        let request = RankingRequest::from_value(serde_json::json!({
            "alternatives": [{"cooling": 1.0}],
            "criteria_weights": {"cooling": 1.0}
        }))
        .unwrap();
        assert_eq!(request.alternatives.len(), 1);

        let err = RankingRequest::from_value(serde_json::json!({"alternatives": "nope"})).unwrap_err();
        assert_eq!(err.code(), "validation_error");

        let err = RankingRequest::from_value(serde_json::json!({
            "alternatives": [{"cooling": "high"}],
            "criteria_weights": {"cooling": 1.0}
        }))
        .unwrap_err();
        assert!(matches!(err, CoolplanError::Validation(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_alternative_transparent() {
        let alt: Alternative = serde_json::from_str(r#"{"cooling": 2.5}"#).unwrap();
        assert_eq!(alt.get("cooling"), Some(2.5));
        assert_eq!(alt.get("cost"), None);
    }
}
