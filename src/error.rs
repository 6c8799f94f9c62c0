//! Error types.
//!
//! None of these escape [`Orchestrator::plan`](crate::planner::Orchestrator::plan):
//! the orchestrator logs them and degrades to a fallback or empty plan.

use std::time::Duration;
use thiserror::Error;

/// Invalid configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("loading horizon must be positive (got {0}h)")]
    LoadingHorizon(u32),

    #[error("purchase horizon {purchase}h must be at least the loading horizon {loading}h")]
    PurchaseShorterThanLoading { purchase: u32, loading: u32 },

    #[error("purchase horizon {horizon}h does not exceed longest purchase delay {delay}h")]
    PurchaseHorizonTooShort { horizon: u32, delay: u32 },

    #[error("{name} must be within [0, 1] (got {value})")]
    Probability { name: &'static str, value: f64 },

    #[error("{name} must be positive")]
    NonPositive { name: &'static str },

    #[error("{name} must be a finite, non-negative number (got {value})")]
    NegativeFactor { name: &'static str, value: f64 },
}

/// Failure to build a planning problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("catalog has no hub airport")]
    NoHub,

    #[error("catalog has {0} hub airports, expected exactly one")]
    MultipleHubs(usize),

    #[error("unknown airport '{0}'")]
    UnknownAirport(String),

    #[error("unknown aircraft type '{0}'")]
    UnknownAircraft(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure of the exact network solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("network model is infeasible")]
    Infeasible,

    #[error("network model is unbounded")]
    Unbounded,

    #[error("solver error: {0}")]
    Solver(String),

    #[error("solver exceeded {0:?}")]
    Timeout(Duration),

    #[error("solver worker terminated without a result")]
    WorkerLost,

    #[error("{0} timed-out solver workers still running")]
    Saturated(usize),
}
