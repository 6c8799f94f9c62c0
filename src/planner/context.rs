//! Per-tick context.

use std::time::{Duration, Instant};

use crate::config::HorizonConfig;
use crate::heuristic::DemandForecast;
use crate::problem::PlanningProblem;

/// Everything a strategy may read during one tick.
///
/// Built fresh each tick and dropped afterwards; strategies never keep
/// state between ticks.
#[derive(Debug, Clone)]
pub struct TickContext {
    /// The planning problem.
    pub problem: PlanningProblem,
    /// Effective horizon windows.
    pub horizon: HorizonConfig,
    /// Demand analysis of `problem`.
    pub demand: DemandForecast,
    /// Wall-clock deadline for the tick, if bounded.
    pub deadline: Option<Instant>,
}

impl TickContext {
    /// Analyses demand and starts the tick clock.
    pub fn new(problem: PlanningProblem, horizon: HorizonConfig, budget: Option<Duration>) -> Self {
        let demand = DemandForecast::analyze(&problem, &horizon);
        let deadline = budget.and_then(|b| Instant::now().checked_add(b));
        Self {
            problem,
            horizon,
            demand,
            deadline,
        }
    }

    /// Time left before the deadline (`None` if unbounded).
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
