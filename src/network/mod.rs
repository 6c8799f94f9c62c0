//! Time-expanded network optimizer.
//!
//! Formulates the whole horizon as an integer flow problem (see
//! [`NetworkModel`]) and solves it under a hard wall-clock timeout. Loads
//! for every flight and purchases placed this hour are read back, rounded,
//! and passed through repair.
//!
//! Any solver failure (infeasible, unbounded, timeout, saturated, worker lost) falls
//! back to the greedy heuristic; the error is reported through
//! [`NetworkOutcome`] and never propagated.
//!
//! # Reference
//! - Ford & Fulkerson (1958), "Constructing maximal dynamic flows from static flows"
//! - Wolsey (1998), "Integer Programming", ch. 1

mod config;
mod model;
mod solve;

pub use config::{DemandMode, NetworkConfig};
pub use model::NetworkModel;
pub use solve::{
    LinearProgram, MAX_ABANDONED_WORKERS, Row, Sense, VarDef, WorkerGate, solve_gated,
    solve_with_timeout,
};

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{ConfigError, SolveError};
use crate::heuristic::{DemandForecast, greedy_decision};
use crate::models::Decision;
use crate::planner::{KitPlanner, TickContext};
use crate::problem::PlanningProblem;
use crate::timeline::CostBreakdown;

/// Which path produced a network decision.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkOutcome {
    /// The solver returned an optimal solution.
    Optimal,
    /// The solver failed; the greedy heuristic was used.
    Fallback(SolveError),
}

impl NetworkOutcome {
    /// Whether the fallback fired.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Result of one network run.
#[derive(Debug, Clone)]
pub struct NetworkResult {
    /// Repaired decision.
    pub decision: Decision,
    /// Cost breakdown of `decision`.
    pub cost: CostBreakdown,
    /// Solver or fallback.
    pub outcome: NetworkOutcome,
    /// Model variables.
    pub variables: usize,
    /// Model constraints.
    pub constraints: usize,
}

/// Network-flow strategy.
#[derive(Debug, Clone, Default)]
pub struct NetworkOptimizer {
    config: NetworkConfig,
}

impl NetworkOptimizer {
    /// Creates an optimizer after checking `config`.
    pub fn new(config: NetworkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Builds, solves, and extracts a decision; falls back on failure.
    #[tracing::instrument(
        level = "debug",
        skip(self, problem, demand),
        fields(flights = problem.flight_count())
    )]
    pub fn run(
        &self,
        problem: &PlanningProblem,
        demand: &DemandForecast,
        deadline: Option<Instant>,
    ) -> NetworkResult {
        let mut model = NetworkModel::build(problem, demand, &self.config);
        debug!(
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            nodes = model.node_count(),
            scale = model.scale(),
            "network model built"
        );

        let timeout = match deadline {
            Some(d) => self
                .config
                .solve_timeout
                .min(d.saturating_duration_since(Instant::now())),
            None => self.config.solve_timeout,
        };

        let program = model.take_program();
        let (mut decision, outcome) = match solve_with_timeout(program, timeout) {
            Ok(values) => (model.decision(&values), NetworkOutcome::Optimal),
            Err(err) => {
                warn!(error = %err, "network solve failed, using greedy fallback");
                (greedy_decision(problem, demand), NetworkOutcome::Fallback(err))
            }
        };

        if !outcome.is_fallback() {
            problem.repair_and_score(&mut decision);
        }
        let cost = problem.evaluate(&decision);

        NetworkResult {
            decision,
            cost,
            outcome,
            variables: model.variable_count(),
            constraints: model.constraint_count(),
        }
    }

    /// Convenience: solve with a specific timeout, ignoring any deadline.
    pub fn run_with_timeout(
        &self,
        problem: &PlanningProblem,
        demand: &DemandForecast,
        timeout: Duration,
    ) -> NetworkResult {
        let optimizer = Self {
            config: self.config.clone().with_solve_timeout(timeout),
        };
        optimizer.run(problem, demand, None)
    }
}

impl KitPlanner for NetworkOptimizer {
    fn plan(&self, ctx: &TickContext) -> Decision {
        self.run(&ctx.problem, &ctx.demand, ctx.deadline).decision
    }
}
