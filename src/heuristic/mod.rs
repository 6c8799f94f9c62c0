//! Greedy load and purchase heuristic.
//!
//! A single pass that is always feasible and fully deterministic. It is
//! used three ways: as the `Heuristic` planning strategy, as the GA's
//! anchor individual, and as the network optimizer's fallback.
//!
//! # Algorithm
//!
//! 1. Every flight asks for its full passenger count in every class.
//! 2. Repair clamps each request to `min(passengers, capacity, available)`
//!    in departure order.
//! 3. For each class, project hub stock at the hour a purchase placed now
//!    would become usable (`now + lead time + hub processing`). If it falls
//!    under `safety multiple × rolling hub demand`, buy the difference,
//!    clamped to hub headroom.

mod demand;

pub use demand::DemandForecast;

use tracing::debug;

use crate::models::{ClassMap, Decision, ServiceClass};
use crate::planner::{KitPlanner, TickContext};
use crate::problem::PlanningProblem;
use crate::timeline::InventoryTimeline;

/// Loads equal to passenger demand, before repair.
pub fn demand_loads(problem: &PlanningProblem) -> Decision {
    Decision::new(
        problem.flights.iter().map(|f| f.passengers).collect(),
        ClassMap::default(),
    )
}

/// Greedy loads: `min(passengers, capacity, available)` per flight, no purchases.
pub fn greedy_loads(problem: &PlanningProblem) -> Decision {
    let mut decision = demand_loads(problem);
    problem.repair(&mut decision);
    decision
}

/// Reorder quantities for the hub given the loads already in `decision`.
///
/// Existing purchases in `decision` are ignored for the projection.
pub fn reorder_quantities(
    problem: &PlanningProblem,
    decision: &Decision,
    demand: &DemandForecast,
) -> ClassMap<u32> {
    let mut without_purchases = decision.clone();
    without_purchases.purchases = ClassMap::default();
    let timeline = InventoryTimeline::build(problem, &without_purchases);
    let headroom = problem.hub_headroom();

    ClassMap::from_fn(|class: ServiceClass| {
        let usable = problem.purchase_usable_hour(class);
        let projected = timeline.level_at(problem.hub, class, usable) as f64;
        let threshold = demand.reorder_threshold(class);
        if projected >= threshold {
            return 0;
        }
        let wanted = (threshold - projected).ceil().min(f64::from(u32::MAX)) as u32;
        let qty = wanted.min(headroom[class]);
        if qty > 0 {
            debug!(
                class = %class,
                projected,
                threshold,
                qty,
                "hub projected below reorder threshold"
            );
        }
        qty
    })
}

/// Greedy loads plus rule-based purchases, repaired.
pub fn greedy_decision(problem: &PlanningProblem, demand: &DemandForecast) -> Decision {
    let mut decision = greedy_loads(problem);
    decision.purchases = reorder_quantities(problem, &decision, demand);
    problem.repair_and_score(&mut decision);
    decision
}

/// The deterministic greedy strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPlanner;

impl HeuristicPlanner {
    /// Creates the planner.
    pub fn new() -> Self {
        Self
    }
}

impl KitPlanner for HeuristicPlanner {
    fn plan(&self, ctx: &TickContext) -> Decision {
        greedy_decision(&ctx.problem, &ctx.demand)
    }
}
