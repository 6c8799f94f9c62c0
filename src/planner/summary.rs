//! Plan quality indicators.
//!
//! Computed over the whole planning horizon of a tick (every visible
//! flight, not only the ones departing now), so the numbers describe the
//! plan the strategy committed to.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Projected cost | Timeline cost breakdown of the decision |
//! | Kits loaded | Σ loads over all flights |
//! | Passengers served | Σ min(load, passengers) |
//! | Fulfilment rate | served / passengers (1.0 with no passengers) |

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{Decision, ServiceClass};
use crate::problem::PlanningProblem;
use crate::timeline::CostBreakdown;

/// Which path produced a tick's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Genetic optimizer.
    Genetic,
    /// Time-expanded network optimizer.
    NetworkFlow,
    /// Greedy heuristic.
    Heuristic,
    /// No flights to load; purchase rule only.
    PurchaseOnly,
    /// No plan could be built.
    Empty,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Genetic => "genetic",
            Self::NetworkFlow => "network-flow",
            Self::Heuristic => "heuristic",
            Self::PurchaseOnly => "purchase-only",
            Self::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// Tick summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Projected cost over the horizon.
    pub cost: CostBreakdown,
    /// Kits loaded across all planned flights.
    pub kits_loaded: u64,
    /// Kits purchased this hour.
    pub kits_purchased: u64,
    /// Passengers on planned flights.
    pub passengers: u64,
    /// Passengers with a kit.
    pub passengers_served: u64,
    /// Passengers without a kit.
    pub passengers_unserved: u64,
    /// `passengers_served / passengers` (0.0..1.0).
    pub fulfilment_rate: f64,
    /// Strategy that produced the decision.
    pub strategy: StrategyKind,
    /// Whether the network solver failed and the heuristic was used.
    pub fallback_used: bool,
    /// Wall-clock time spent on the tick.
    pub elapsed: Duration,
}

impl PlanSummary {
    /// Computes the summary of `decision` on `problem`.
    pub fn calculate(
        problem: &PlanningProblem,
        decision: &Decision,
        strategy: StrategyKind,
        fallback_used: bool,
        elapsed: Duration,
    ) -> Self {
        let mut passengers = 0u64;
        let mut served = 0u64;
        for (flight, loads) in problem.flights.iter().zip(&decision.loads) {
            for class in ServiceClass::ALL {
                let pax = flight.passengers[class];
                passengers += u64::from(pax);
                served += u64::from(pax.min(loads[class]));
            }
        }

        let fulfilment_rate = if passengers == 0 {
            1.0
        } else {
            served as f64 / passengers as f64
        };

        Self {
            cost: problem.evaluate(decision),
            kits_loaded: decision.total_loaded(),
            kits_purchased: decision.purchases.total(),
            passengers,
            passengers_served: served,
            passengers_unserved: passengers - served,
            fulfilment_rate,
            strategy,
            fallback_used,
            elapsed,
        }
    }

    /// Summary of a tick that produced nothing.
    pub fn empty(elapsed: Duration) -> Self {
        Self {
            cost: CostBreakdown::default(),
            kits_loaded: 0,
            kits_purchased: 0,
            passengers: 0,
            passengers_served: 0,
            passengers_unserved: 0,
            fulfilment_rate: 1.0,
            strategy: StrategyKind::Empty,
            fallback_used: false,
            elapsed,
        }
    }

    /// Whether the plan serves at least `min_rate` of passengers with no penalties
    /// other than unfulfilled demand.
    pub fn meets_thresholds(&self, min_rate: f64) -> bool {
        self.fulfilment_rate >= min_rate
            && self.cost.overload == 0.0
            && self.cost.negative_inventory == 0.0
    }
}
