//! TOPSIS closeness scoring and ranking

use coolplan_common::{
    Alternative, CriteriaWeights, OptimizationError, RankedAlternative, Result, ValidationError,
};
use ordered_float::OrderedFloat;
use tracing::{debug, instrument};

use super::matrix::{distance, DecisionMatrix};

/// Ranks alternatives by relative closeness to the ideal solution
#[derive(Debug, Clone, Copy, Default)]
pub struct TopsisRanker;

impl TopsisRanker {
    pub fn new() -> Self {
        Self
    }

    /// Score and rank `alternatives` against `weights`
    ///
    /// The result is ordered best first. Equal scores are ordered by ascending
    /// input index, so ranks are always a permutation of `1..=N`.
    #[instrument(skip_all, fields(alternatives = alternatives.len(), criteria = weights.len()))]
    pub fn rank(
        &self,
        alternatives: &[Alternative],
        weights: &CriteriaWeights,
    ) -> Result<Vec<RankedAlternative>> {
        validate_weights(weights)?;
        if alternatives.is_empty() {
            return Ok(Vec::new());
        }

        let scores = self.scores(alternatives, weights)?;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            OrderedFloat(scores[b])
                .cmp(&OrderedFloat(scores[a]))
                .then(a.cmp(&b))
        });

        let ranked: Vec<RankedAlternative> = order
            .into_iter()
            .enumerate()
            .map(|(position, index)| RankedAlternative {
                alternative_index: index,
                topsis_score: scores[index],
                rank: position + 1,
            })
            .collect();

        debug!(
            best = ranked.first().map(|r| r.alternative_index),
            "TOPSIS ranking complete"
        );
        Ok(ranked)
    }

    /// Closeness score per alternative, in input order
    pub fn scores(&self, alternatives: &[Alternative], weights: &CriteriaWeights) -> Result<Vec<f64>> {
        let weighted = DecisionMatrix::build(alternatives, weights)?.normalized_weighted(weights)?;
        let (best, worst) = weighted.ideal_points();

        (0..weighted.rows())
            .map(|i| {
                let row = weighted.row(i);
                let to_best = distance(row, &best);
                let to_worst = distance(row, &worst);
                let total = to_best + to_worst;
                let score = if total > 0.0 { to_worst / total } else { 0.0 };

                if score.is_finite() {
                    Ok(score)
                } else {
                    Err(OptimizationError::NonFiniteScore { index: i }.into())
                }
            })
            .collect()
    }
}

fn validate_weights(weights: &CriteriaWeights) -> std::result::Result<(), ValidationError> {
    if weights.is_empty() {
        return Err(ValidationError::NoCriteria);
    }
    match weights.iter().find(|(_, w)| !w.is_finite()) {
        Some((criterion, _)) => Err(ValidationError::NonFiniteWeight {
            criterion: criterion.to_string(),
        }),
        None => Ok(()),
    }
}

/// Rank with a default [`TopsisRanker`]
pub fn rank(alternatives: &[Alternative], weights: &CriteriaWeights) -> Result<Vec<RankedAlternative>> {
    TopsisRanker::new().rank(alternatives, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coolplan_common::CoolplanError;
    use proptest::prelude::*;

    fn weights() -> CriteriaWeights {
        CriteriaWeights::new()
            .with("cooling", 0.5)
            .with("feasibility", 0.3)
            .with("community", 0.2)
    }

    fn alt(cooling: f64, feasibility: f64, community: f64) -> Alternative {
        Alternative::new()
            .with("cooling", cooling)
            .with("feasibility", feasibility)
            .with("community", community)
    }

    #[test]
    fn test_ideal_best_and_worst() {
        let alternatives = vec![alt(2.0, 0.5, 0.5), alt(3.0, 0.9, 0.8), alt(1.0, 0.1, 0.2)];
        let ranking = rank(&alternatives, &weights()).unwrap();

        assert_eq!(ranking[0].alternative_index, 1);
        assert_eq!(ranking[0].topsis_score, 1.0);
        assert_eq!(ranking[0].rank, 1);

        assert_eq!(ranking[2].alternative_index, 2);
        assert_eq!(ranking[2].topsis_score, 0.0);
        assert_eq!(ranking[2].rank, 3);
    }

    #[test]
    fn test_identical_alternatives_tie_by_index() {
        let alternatives = vec![alt(1.0, 0.2, 0.2), alt(2.0, 0.6, 0.4), alt(2.0, 0.6, 0.4)];
        let ranking = rank(&alternatives, &weights()).unwrap();

        assert_eq!(ranking[0].topsis_score, ranking[1].topsis_score);
        assert_eq!(ranking[0].alternative_index, 1);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[1].alternative_index, 2);
        assert_eq!(ranking[1].rank, 2);
        assert_eq!(ranking[2].alternative_index, 0);
    }

    #[test]
    fn test_single_alternative_scores_zero() {
        let ranking = rank(&[alt(4.0, 0.5, 0.5)], &weights()).unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].topsis_score, 0.0);
        assert_eq!(ranking[0].rank, 1);
    }

    #[test]
    fn test_empty_alternatives() {
        assert!(rank(&[], &weights()).unwrap().is_empty());
    }

    #[test]
    fn test_weights_are_required_and_finite() {
        assert!(matches!(
            rank(&[alt(1.0, 1.0, 1.0)], &CriteriaWeights::new()),
            Err(CoolplanError::Validation(ValidationError::NoCriteria))
        ));

        let bad = weights().with("feasibility", f64::INFINITY);
        assert!(matches!(
            rank(&[alt(1.0, 1.0, 1.0)], &bad),
            Err(CoolplanError::Validation(ValidationError::NonFiniteWeight { .. }))
        ));
    }

    #[test]
    fn test_missing_criterion() {
        let alternatives = vec![alt(1.0, 1.0, 1.0), Alternative::new().with("cooling", 2.0)];
        assert!(matches!(
            rank(&alternatives, &weights()),
            Err(CoolplanError::Validation(ValidationError::MissingCriterion { alternative: 1, .. }))
        ));
    }

    #[test]
    fn test_large_criterion_values_rank_correctly() {
        let alternatives = vec![
            Alternative::new().with("cooling", 1e200),
            Alternative::new().with("cooling", 2e200),
        ];
        let weights = CriteriaWeights::new().with("cooling", 1.0);
        let ranking = rank(&alternatives, &weights).unwrap();

        assert_eq!(ranking[0].alternative_index, 1);
        assert_eq!(ranking[0].topsis_score, 1.0);
        assert_eq!(ranking[1].alternative_index, 0);
        assert_eq!(ranking[1].topsis_score, 0.0);
    }

    #[test]
    fn test_norm_overflow_surfaces() {
        let alternatives = vec![
            Alternative::new().with("cooling", f64::MAX),
            Alternative::new().with("cooling", f64::MAX),
        ];
        let weights = CriteriaWeights::new().with("cooling", 1.0);
        assert!(matches!(
            rank(&alternatives, &weights),
            Err(CoolplanError::Optimization(OptimizationError::NonFiniteNorm { .. }))
        ));
    }

    #[test]
    fn test_weights_used_as_supplied() {
        // Scaling every weight by the same factor leaves closeness unchanged.
        let alternatives = vec![alt(1.0, 0.9, 0.3), alt(2.0, 0.4, 0.7), alt(1.5, 0.6, 0.5)];
        let scaled: CriteriaWeights = weights().iter().map(|(c, w)| (c.to_string(), w * 10.0)).collect();

        let a = TopsisRanker::new().scores(&alternatives, &weights()).unwrap();
        let b = TopsisRanker::new().scores(&alternatives, &scaled).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    fn alternatives_strategy() -> impl Strategy<Value = Vec<Alternative>> {
        prop::collection::vec((-100.0f64..100.0, 0.0f64..1.0, 0.0f64..1.0), 1..12)
            .prop_map(|rows| rows.into_iter().map(|(c, f, m)| alt(c, f, m)).collect())
    }

    proptest! {
        #[test]
        fn prop_scores_in_unit_interval_and_ranks_permute(
            alternatives in alternatives_strategy(),
            w in (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0),
        ) {
            let weights = CriteriaWeights::new()
                .with("cooling", w.0)
                .with("feasibility", w.1)
                .with("community", w.2);
            let ranking = rank(&alternatives, &weights).unwrap();

            prop_assert_eq!(ranking.len(), alternatives.len());
            for r in &ranking {
                prop_assert!((0.0..=1.0).contains(&r.topsis_score));
            }

            let mut ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
            ranks.sort_unstable();
            prop_assert_eq!(ranks, (1..=alternatives.len()).collect::<Vec<_>>());

            let mut indices: Vec<usize> = ranking.iter().map(|r| r.alternative_index).collect();
            indices.sort_unstable();
            prop_assert_eq!(indices, (0..alternatives.len()).collect::<Vec<_>>());

            for pair in ranking.windows(2) {
                prop_assert!(pair[0].topsis_score >= pair[1].topsis_score);
                if pair[0].topsis_score == pair[1].topsis_score {
                    prop_assert!(pair[0].alternative_index < pair[1].alternative_index);
                }
            }
        }
    }
}
