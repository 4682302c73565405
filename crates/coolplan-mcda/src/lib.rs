//! # Coolplan MCDA
//!
//! Multi-criteria ranking of arbitrary alternatives with TOPSIS.
//!
//! ## Procedure
//!
//! ```text
//! X[i][j]   = value of criterion j for alternative i (columns in weight order)
//! R[i][j]   = X[i][j] / ‖X[·][j]‖₂          (zero-norm column → 0)
//! V[i][j]   = R[i][j] · w[j]
//! A⁺, A⁻    = column max / column min of V
//! score[i]  = d⁻ / (d⁺ + d⁻)                 (0 when both are 0)
//! ```
//!
//! Alternatives are ranked by descending score; equal scores keep their input
//! order. The ranker is independent of the portfolio optimizer.

pub mod topsis;

use coolplan_common::{RankedAlternative, RankingRequest, Result};

pub use topsis::{rank, DecisionMatrix, TopsisRanker};

/// Rank the alternatives of a caller-supplied ranking record
pub fn rank_request(request: &RankingRequest) -> Result<Vec<RankedAlternative>> {
    TopsisRanker::new().rank(&request.alternatives, &request.criteria_weights)
}
