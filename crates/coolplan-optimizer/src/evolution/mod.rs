//! Global optimizer: differential evolution over allocation vectors
pub mod differential;
pub mod signal;

pub use self::differential::{
    optimize, DifferentialEvolution, EvolutionConfig, SearchOutcome, MIN_POPULATION_SIZE,
};
pub use self::signal::{Deadline, NeverStop, StopSignal};
