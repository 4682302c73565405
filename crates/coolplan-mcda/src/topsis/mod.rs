//! TOPSIS ranking
//!
//! - [`DecisionMatrix`]: validated alternatives × criteria values
//! - [`TopsisRanker`]: closeness scores and ranks

pub mod matrix;
pub mod ranker;

pub use matrix::DecisionMatrix;
pub use ranker::{rank, TopsisRanker};
