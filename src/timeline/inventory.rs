//! Sparse per-airport, per-class inventory timeline.
//!
//! Stores stock changes as `hour → delta` in a `BTreeMap` per
//! (airport, class). The level at any hour is the initial stock plus
//! every delta at or before that hour, so arrivals, purchases, and
//! departures sharing an hour are netted before the level is checked.

use std::collections::BTreeMap;

use crate::models::{ClassMap, Decision, ServiceClass};
use crate::problem::PlanningProblem;

/// Inventory deltas for every (airport, class).
#[derive(Debug, Clone)]
pub struct InventoryTimeline {
    initial: Vec<ClassMap<i64>>,
    deltas: Vec<ClassMap<BTreeMap<i64, i64>>>,
}

impl InventoryTimeline {
    /// Timeline holding only the snapshot stock and pending inflows.
    pub fn seeded(problem: &PlanningProblem) -> Self {
        let mut timeline = Self {
            initial: problem.initial_stock.clone(),
            deltas: vec![ClassMap::default(); problem.airports.len()],
        };
        for inflow in &problem.inflows {
            for (class, &qty) in inflow.kits.iter() {
                timeline.add(inflow.airport, class, inflow.hour, i64::from(qty));
            }
        }
        timeline
    }

    /// Full timeline of a decision: pending inflows, purchases, loads, and arrivals.
    pub fn build(problem: &PlanningProblem, decision: &Decision) -> Self {
        let mut timeline = Self::seeded(problem);
        timeline.add_purchases(problem, decision.purchases);
        for (flight, loads) in problem.flights.iter().zip(&decision.loads) {
            for (class, &qty) in loads.iter() {
                timeline.add_load(problem, flight, class, qty);
            }
        }
        timeline
    }

    /// Records hub purchases placed at `current_hour`.
    pub fn add_purchases(&mut self, problem: &PlanningProblem, purchases: ClassMap<u32>) {
        for (class, &qty) in purchases.iter() {
            self.add(
                problem.hub,
                class,
                problem.purchase_usable_hour(class),
                i64::from(qty),
            );
        }
    }

    /// Records a load: stock leaves the origin at departure and becomes
    /// usable at the destination after arrival plus processing.
    pub fn add_load(
        &mut self,
        problem: &PlanningProblem,
        flight: &crate::problem::FlightInfo,
        class: ServiceClass,
        qty: u32,
    ) {
        if qty == 0 {
            return;
        }
        let qty = i64::from(qty);
        self.add(flight.origin, class, flight.departure_hour, -qty);
        self.add(
            flight.destination,
            class,
            problem.arrival_usable_hour(flight, class),
            qty,
        );
    }

    /// Adds a stock change.
    pub fn add(&mut self, airport: usize, class: ServiceClass, hour: i64, delta: i64) {
        if delta == 0 {
            return;
        }
        let changes = &mut self.deltas[airport][class];
        let net = changes.entry(hour).or_insert(0);
        *net += delta;
        if *net == 0 {
            changes.remove(&hour);
        }
    }

    /// Stock level after every change at or before `hour`.
    pub fn level_at(&self, airport: usize, class: ServiceClass, hour: i64) -> i64 {
        self.initial[airport][class]
            + self.deltas[airport][class]
                .range(..=hour)
                .map(|(_, d)| d)
                .sum::<i64>()
    }

    /// Lowest level from `hour` onwards (up to `until`, inclusive).
    ///
    /// Used by repair: consuming at `hour` must not push any later
    /// checkpoint negative.
    pub fn min_level_from(
        &self,
        airport: usize,
        class: ServiceClass,
        hour: i64,
        until: i64,
    ) -> i64 {
        let mut level = self.level_at(airport, class, hour);
        let mut lowest = level;
        if until > hour {
            for (_, d) in self.deltas[airport][class].range(hour + 1..=until) {
                level += d;
                lowest = lowest.min(level);
            }
        }
        lowest
    }

    /// `(hour, level)` after each change, in hour order, up to `until` inclusive.
    pub fn checkpoints(
        &self,
        airport: usize,
        class: ServiceClass,
        until: i64,
    ) -> impl Iterator<Item = (i64, i64)> + '_ {
        let mut level = self.initial[airport][class];
        self.deltas[airport][class]
            .range(..=until)
            .map(move |(&hour, &delta)| {
                level += delta;
                (hour, level)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostConfig;
    use crate::models::{ClassMap, GameState, PendingMovement, ServiceClass::*};
    use crate::testutil::{hub_catalog, sample_flight};

    fn problem() -> PlanningProblem {
        let catalog = hub_catalog();
        let snapshot = GameState::at_hour(0)
            .with_stock("HUB", ClassMap::splat(100))
            .with_stock("OUT", ClassMap::splat(0))
            .with_pending(PendingMovement::new("OUT", 3, ClassMap::splat(7)));
        let flights = vec![sample_flight("F1", "HUB", "OUT", 2, 5)];
        PlanningProblem::new(&catalog, &snapshot, &flights, 72, CostConfig::default()).unwrap()
    }

    #[test]
    fn test_level_tracks_departure_and_arrival() {
        let p = problem();
        let mut d = p.empty_decision();
        d.loads[0][Economy] = 40;
        let t = InventoryTimeline::build(&p, &d);
        let hub = p.hub;
        let out = 1;
        assert_eq!(t.level_at(hub, Economy, 1), 100);
        assert_eq!(t.level_at(hub, Economy, 2), 60);
        // Pending arrives at 3; flight arrives at 5, usable at 5 + 2.
        assert_eq!(t.level_at(out, Economy, 3), 7);
        assert_eq!(t.level_at(out, Economy, 6), 7);
        assert_eq!(t.level_at(out, Economy, 7), 47);
    }

    #[test]
    fn test_checkpoints_only_at_changes() {
        let p = problem();
        let mut d = p.empty_decision();
        d.loads[0][Economy] = 40;
        let t = InventoryTimeline::build(&p, &d);
        let points: Vec<(i64, i64)> = t.checkpoints(1, Economy, 100).collect();
        assert_eq!(points, vec![(3, 7), (7, 47)]);
    }

    #[test]
    fn test_same_hour_changes_are_netted() {
        let p = problem();
        let mut t = InventoryTimeline::seeded(&p);
        t.add(p.hub, First, 4, -100);
        t.add(p.hub, First, 4, 100);
        assert_eq!(t.checkpoints(p.hub, First, 100).count(), 0);
        assert_eq!(t.level_at(p.hub, First, 4), 100);
    }

    #[test]
    fn test_cancelled_load_leaves_no_checkpoint() {
        let p = problem();
        let flight = &p.flights[0];
        let mut t = InventoryTimeline::seeded(&p);
        t.add_load(&p, flight, Business, 25);
        t.add(flight.origin, Business, flight.departure_hour, 25);
        let dest_hour = p.arrival_usable_hour(flight, Business);
        t.add(flight.destination, Business, dest_hour, -25);
        assert_eq!(t.checkpoints(flight.origin, Business, 100).count(), 0);
        // Only the pending inflow at hour 3 remains at the outstation.
        let points: Vec<(i64, i64)> = t.checkpoints(flight.destination, Business, 100).collect();
        assert_eq!(points, vec![(3, 7)]);
    }

    #[test]
    fn test_min_level_from() {
        let p = problem();
        let mut t = InventoryTimeline::seeded(&p);
        t.add(p.hub, First, 10, -80);
        t.add(p.hub, First, 20, 50);
        assert_eq!(t.min_level_from(p.hub, First, 5, 30), 20);
        assert_eq!(t.min_level_from(p.hub, First, 20, 30), 70);
    }
}
