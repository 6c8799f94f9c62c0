//! Inventory timeline cost model.
//!
//! The shared objective of every optimizer. Given a decision, simulates
//! per-airport, per-class stock across the horizon and prices it.
//!
//! # Cost terms
//!
//! | Term | Per unit |
//! |------|----------|
//! | Loading | origin loading cost |
//! | Processing | destination processing cost (hub processing for purchases) |
//! | Transport | distance × fuel cost × kit weight |
//! | Purchase | kit purchase cost |
//! | Unfulfilled | unfulfilled factor(class) × distance × kit cost |
//! | Overload | overload factor × distance × fuel cost × kit cost |
//! | Negative inventory | problem's negative unit penalty per kit below zero, per checkpoint |
//! | Over capacity | over-capacity factor per kit above storage, per checkpoint |
//!
//! Evaluation is pure: it reads the problem and decision, iterates
//! flights in slot order and checkpoints in hour order, and returns the
//! same value for the same inputs.

mod inventory;

pub use inventory::InventoryTimeline;

use serde::{Deserialize, Serialize};

use crate::models::{Decision, ServiceClass};
use crate::problem::PlanningProblem;

/// Itemised cost of one decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Loading cost at origins.
    pub loading: f64,
    /// Processing cost at destinations and at the hub for purchases.
    pub processing: f64,
    /// Transport (fuel) cost.
    pub transport: f64,
    /// Purchase cost.
    pub purchase: f64,
    /// Penalty for passengers without a kit.
    pub unfulfilled: f64,
    /// Penalty for kits above aircraft capacity.
    pub overload: f64,
    /// Penalty for stock below zero.
    pub negative_inventory: f64,
    /// Penalty for stock above storage capacity.
    pub over_capacity: f64,
    /// Passengers without a kit.
    pub unfulfilled_kits: u64,
    /// Kits above aircraft capacity.
    pub overload_kits: u64,
}

impl CostBreakdown {
    /// Loading + processing + transport + purchase.
    pub fn operational(&self) -> f64 {
        self.loading + self.processing + self.transport + self.purchase
    }

    /// Unfulfilled + overload + negative inventory + over capacity.
    pub fn penalty(&self) -> f64 {
        self.unfulfilled + self.overload + self.negative_inventory + self.over_capacity
    }

    /// Scalar objective.
    pub fn total(&self) -> f64 {
        self.operational() + self.penalty()
    }
}

/// Scores a decision against a planning problem.
pub fn evaluate(problem: &PlanningProblem, decision: &Decision) -> CostBreakdown {
    let mut cost = CostBreakdown::default();
    let factors = &problem.cost;

    for (flight, loads) in problem.flights.iter().zip(&decision.loads) {
        let origin = &problem.airports[flight.origin];
        let destination = &problem.airports[flight.destination];

        for class in ServiceClass::ALL {
            let load = loads[class];
            let pax = flight.passengers[class];
            let capacity = flight.capacity[class];
            let kit_cost = problem.kit_classes[class].purchase_cost;
            let qty = f64::from(load);

            cost.loading += origin.loading_cost[class] * qty;
            cost.processing += destination.processing_cost[class] * qty;
            cost.transport += problem.unit_transport_cost(flight, class) * qty;

            let unfulfilled = pax.saturating_sub(load);
            if unfulfilled > 0 {
                cost.unfulfilled_kits += u64::from(unfulfilled);
                cost.unfulfilled += factors.unfulfilled_factor[class]
                    * flight.distance
                    * kit_cost
                    * f64::from(unfulfilled);
            }

            let overload = load.saturating_sub(capacity);
            if overload > 0 {
                cost.overload_kits += u64::from(overload);
                cost.overload += factors.overload_factor
                    * flight.distance
                    * flight.fuel_cost_per_km
                    * kit_cost
                    * f64::from(overload);
            }
        }
    }

    let hub = &problem.airports[problem.hub];
    for (class, &qty) in decision.purchases.iter() {
        let qty = f64::from(qty);
        cost.purchase += problem.kit_classes[class].purchase_cost * qty;
        cost.processing += hub.processing_cost[class] * qty;
    }

    let timeline = InventoryTimeline::build(problem, decision);
    for (index, airport) in problem.airports.iter().enumerate() {
        for class in ServiceClass::ALL {
            let capacity = i64::from(airport.capacity[class]);
            for (_, level) in timeline.checkpoints(index, class, problem.horizon_end) {
                if level < 0 {
                    cost.negative_inventory += problem.negative_unit_penalty * (-level) as f64;
                } else if level > capacity {
                    cost.over_capacity += factors.over_capacity_factor * (level - capacity) as f64;
                }
            }
        }
    }

    cost
}
