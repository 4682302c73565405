//! Decision matrix construction and weighting

use coolplan_common::{Alternative, CriteriaWeights, OptimizationError, ValidationError};

/// Row-major alternatives × criteria matrix
///
/// Columns follow the order of the [`CriteriaWeights`] it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl DecisionMatrix {
    /// Build from alternatives, requiring every weighted criterion to be present and finite
    pub fn build(
        alternatives: &[Alternative],
        weights: &CriteriaWeights,
    ) -> Result<Self, ValidationError> {
        let cols = weights.len();
        let mut values = Vec::with_capacity(alternatives.len() * cols);

        for (index, alternative) in alternatives.iter().enumerate() {
            for (criterion, _) in weights.iter() {
                let value =
                    alternative
                        .get(criterion)
                        .ok_or_else(|| ValidationError::MissingCriterion {
                            alternative: index,
                            criterion: criterion.to_string(),
                        })?;
                if !value.is_finite() {
                    return Err(ValidationError::NonFiniteCriterion {
                        alternative: index,
                        criterion: criterion.to_string(),
                    });
                }
                values.push(value);
            }
        }

        Ok(Self {
            rows: alternatives.len(),
            cols,
            values,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Euclidean norm of each column
    ///
    /// Values are scaled by the column's largest magnitude before squaring, so
    /// large finite entries do not overflow. The result is still infinite when
    /// the norm itself exceeds `f64::MAX`.
    pub fn column_norms(&self) -> Vec<f64> {
        (0..self.cols)
            .map(|col| {
                let peak = (0..self.rows)
                    .map(|row| self.get(row, col).abs())
                    .fold(0.0, f64::max);
                if peak == 0.0 {
                    return 0.0;
                }
                let scaled = (0..self.rows)
                    .map(|row| (self.get(row, col) / peak).powi(2))
                    .sum::<f64>()
                    .sqrt();
                peak * scaled
            })
            .collect()
    }

    /// Vector-normalize each column, then scale it by its weight
    ///
    /// A column whose norm is zero becomes all zeros.
    pub fn normalized_weighted(&self, weights: &CriteriaWeights) -> Result<Self, OptimizationError> {
        let norms = self.column_norms();
        if let Some(((criterion, _), _)) = weights.iter().zip(&norms).find(|(_, n)| !n.is_finite()) {
            return Err(OptimizationError::NonFiniteNorm {
                criterion: criterion.to_string(),
            });
        }
        let column_weights: Vec<f64> = weights.iter().map(|(_, w)| w).collect();

        let mut values = Vec::with_capacity(self.values.len());
        for row in 0..self.rows {
            for col in 0..self.cols {
                let norm = norms[col];
                let normalized = if norm > 0.0 {
                    self.get(row, col) / norm
                } else {
                    0.0
                };
                values.push(normalized * column_weights[col]);
            }
        }

        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            values,
        })
    }

    /// Column-wise maxima and minima
    pub fn ideal_points(&self) -> (Vec<f64>, Vec<f64>) {
        let mut best = vec![f64::NEG_INFINITY; self.cols];
        let mut worst = vec![f64::INFINITY; self.cols];
        for row in 0..self.rows {
            for (col, &v) in self.row(row).iter().enumerate() {
                best[col] = best[col].max(v);
                worst[col] = worst[col].min(v);
            }
        }
        (best, worst)
    }
}

/// Euclidean distance between two equal-length points
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
