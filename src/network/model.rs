//! Time-expanded flow model.
//!
//! # Formulation
//!
//! Inventory nodes exist per (airport, class) at every hour where stock
//! can change: the current hour, departures, usable arrivals, pending
//! inflows, and (at the hub) usable purchases. Stock is constant between
//! nodes, so this is the hourly network with idle arcs contracted.
//!
//! | Variable | Bounds | Cost |
//! |----------|--------|------|
//! | `load[f][c]` (integer) | `[0, aircraft capacity]` | loading + destination processing + transport |
//! | `buy[t][c]` (integer) | `[0, multiple × horizon demand]` | purchase + hub processing + ε·(t − now) |
//! | `inv[a][c][node]` | `[0, max(storage, exogenous stock)]` | holding ε |
//! | `short[f][c]` (soft mode) | `[0, passengers]` | unfulfilled penalty |
//!
//! Flow balance at each node:
//! `inv[node] = inv[previous] + arrivals + purchases + inflows − departures`,
//! with the first node seeded by the snapshot stock.
//!
//! Demand: `load ≥ passengers` (hard) or `load + short ≥ passengers` (soft).
//!
//! Objective coefficients are divided by `max(1, max |coefficient| / 100)`
//! before solving.

use std::collections::BTreeMap;

use super::solve::{LinearProgram, Sense};
use super::{DemandMode, NetworkConfig};
use crate::heuristic::DemandForecast;
use crate::models::{ClassMap, Decision, ServiceClass};
use crate::problem::PlanningProblem;

#[derive(Debug, Default)]
struct Node {
    terms: Vec<(usize, f64)>,
    inflow: f64,
}

/// A built network model plus the mapping back to a [`Decision`].
#[derive(Debug, Clone)]
pub struct NetworkModel {
    program: LinearProgram,
    loads: Vec<ClassMap<usize>>,
    current_purchases: ClassMap<Option<usize>>,
    variables: usize,
    constraints: usize,
    nodes: usize,
    scale: f64,
}

impl NetworkModel {
    /// Builds the model for one tick.
    pub fn build(
        problem: &PlanningProblem,
        demand: &DemandForecast,
        config: &NetworkConfig,
    ) -> Self {
        let mut lp = LinearProgram::default();
        let now = problem.current_hour;
        let end = problem
            .flights
            .iter()
            .map(|f| f.departure_hour)
            .fold(problem.horizon_end, i64::max);

        let mut events: Vec<ClassMap<BTreeMap<i64, Node>>> = problem
            .airports
            .iter()
            .map(|_| ClassMap::default())
            .collect();

        let loads: Vec<ClassMap<usize>> = problem
            .flights
            .iter()
            .map(|flight| {
                ClassMap::from_fn(|class| {
                    lp.add_var(
                        0.0,
                        f64::from(flight.capacity[class]),
                        true,
                        problem.unit_load_cost(flight, class),
                    )
                })
            })
            .collect();

        for (flight, vars) in problem.flights.iter().zip(&loads) {
            for class in ServiceClass::ALL {
                let load = vars[class];
                events[flight.origin][class]
                    .entry(flight.departure_hour)
                    .or_default()
                    .terms
                    .push((load, -1.0));

                let usable = problem.arrival_usable_hour(flight, class);
                if usable <= end {
                    events[flight.destination][class]
                        .entry(usable)
                        .or_default()
                        .terms
                        .push((load, 1.0));
                }

                let pax = f64::from(flight.passengers[class]);
                if pax <= 0.0 {
                    continue;
                }
                match config.demand_mode {
                    DemandMode::Hard => lp.add_row(vec![(load, 1.0)], Sense::Ge, pax),
                    DemandMode::Soft => {
                        let penalty = problem.cost.unfulfilled_factor[class]
                            * flight.distance
                            * problem.kit_classes[class].purchase_cost;
                        let short = lp.add_var(0.0, pax, false, penalty);
                        lp.add_row(vec![(load, 1.0), (short, 1.0)], Sense::Ge, pax);
                    }
                }
            }
        }

        let mut current_purchases = ClassMap::splat(None);
        for class in ServiceClass::ALL {
            let delay = problem.purchase_usable_hour(class) - now;
            let bound = demand.purchase_bound(class, config.purchase_bound_multiple);
            let unit = problem.unit_purchase_cost(class);
            for order in now..=end - delay {
                let offset = (order - now) as f64;
                let buy = lp.add_var(0.0, bound, true, unit + config.time_preference * offset);
                if order == now {
                    current_purchases[class] = Some(buy);
                }
                events[problem.hub][class]
                    .entry(order + delay)
                    .or_default()
                    .terms
                    .push((buy, 1.0));
            }
        }

        for inflow in &problem.inflows {
            if inflow.hour > end {
                continue;
            }
            for (class, &kits) in inflow.kits.iter() {
                events[inflow.airport][class]
                    .entry(inflow.hour)
                    .or_default()
                    .inflow += f64::from(kits);
            }
        }

        let mut nodes = 0;
        for (index, airport) in problem.airports.iter().enumerate() {
            for class in ServiceClass::ALL {
                let timeline = &mut events[index][class];
                timeline.entry(now).or_default();

                let initial = problem.initial_stock[index][class].max(0) as f64;
                let exogenous = initial + timeline.values().map(|n| n.inflow).sum::<f64>();
                let upper = f64::from(airport.capacity[class]).max(exogenous);

                let mut previous = None;
                for node in timeline.values() {
                    let inv = lp.add_var(0.0, upper, false, config.holding_cost);
                    let mut terms = Vec::with_capacity(node.terms.len() + 2);
                    terms.push((inv, 1.0));
                    let mut rhs = node.inflow;
                    match previous {
                        Some(prev) => terms.push((prev, -1.0)),
                        None => rhs += initial,
                    }
                    terms.extend(node.terms.iter().map(|&(var, coef)| (var, -coef)));
                    lp.add_row(terms, Sense::Eq, rhs);
                    previous = Some(inv);
                    nodes += 1;
                }
            }
        }

        let scale = (lp.max_cost() / 100.0).max(1.0);
        lp.scale_costs(scale);

        Self {
            variables: lp.vars.len(),
            constraints: lp.rows.len(),
            program: lp,
            loads,
            current_purchases,
            nodes,
            scale,
        }
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints
    }

    /// Number of inventory nodes.
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Divisor applied to objective coefficients.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The program to solve.
    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    /// Moves the program out, leaving the decision mapping in place.
    pub fn take_program(&mut self) -> LinearProgram {
        std::mem::take(&mut self.program)
    }

    /// Reads loads and current-hour purchases from a solution vector.
    pub fn decision(&self, values: &[f64]) -> Decision {
        let read = |index: usize| -> u32 {
            let value = values.get(index).copied().unwrap_or(0.0);
            value.round().clamp(0.0, f64::from(u32::MAX)) as u32
        };
        Decision::new(
            self.loads
                .iter()
                .map(|vars| vars.map(|_, &var| read(var)))
                .collect(),
            self.current_purchases.map(|_, var| var.map_or(0, read)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CostConfig, HorizonConfig};
    use crate::models::{GameState, PendingMovement, ServiceClass::*};
    use crate::network::solve::solve;
    use crate::testutil::{hub_catalog, sample_flight, single_flight_problem};

    fn build(problem: &PlanningProblem, mode: DemandMode) -> NetworkModel {
        let demand = DemandForecast::analyze(problem, &HorizonConfig::default());
        NetworkModel::build(
            problem,
            &demand,
            &NetworkConfig::default().with_demand_mode(mode),
        )
    }

    #[test]
    fn test_model_shape() {
        let p = single_flight_problem(200, 100, 150);
        let m = build(&p, DemandMode::Hard);
        // Purchase windows over 72h:
        // FC 54h delay → 19, BC 42h → 31, PE 30h → 43, EC 18h → 55.
        let purchases = 19 + 31 + 43 + 55;
        let loads = 4;
        assert!(m.variable_count() > loads + purchases);
        assert!(m.node_count() >= 2 * 4);
        assert!(m.current_purchases.iter().all(|(_, v)| v.is_some()));
        assert_eq!(m.constraint_count(), m.node_count() + 1);
    }

    #[test]
    fn test_soft_mode_adds_shortfall() {
        let p = single_flight_problem(200, 100, 150);
        let hard = build(&p, DemandMode::Hard);
        let soft = build(&p, DemandMode::Soft);
        assert_eq!(soft.variable_count(), hard.variable_count() + 1);
    }

    #[test]
    fn test_costs_scaled_to_hundred() {
        let p = single_flight_problem(200, 100, 150);
        let m = build(&p, DemandMode::Hard);
        assert!(m.scale() >= 1.0);
        assert!(m.program().max_cost() <= 100.0 + 1e-9);
    }

    #[test]
    fn test_decision_rounds_values() {
        let p = single_flight_problem(200, 100, 150);
        let m = build(&p, DemandMode::Hard);
        let mut values = vec![0.0; m.variable_count()];
        values[m.loads[0][Economy]] = 99.999_999;
        if let Some(v) = m.current_purchases[First] {
            values[v] = 3.000_001;
        }
        let d = m.decision(&values);
        assert_eq!(d.loads[0][Economy], 100);
        assert_eq!(d.purchases[First], 3);
    }

    #[test]
    fn test_solved_chain_respects_processing() {
        let catalog = hub_catalog();
        let snapshot = GameState::at_hour(0)
            .with_stock("HUB", ClassMap::splat(0).with(Economy, 100))
            .with_stock("OUT", ClassMap::splat(0))
            .with_pending(PendingMovement::new("OUT", 8, ClassMap::splat(0).with(Economy, 5)));
        let flights = vec![
            sample_flight("A", "HUB", "OUT", 1, 3)
                .with_passengers(ClassMap::splat(0).with(Economy, 80)),
            // A's kits are usable at OUT from 5; plus 5 pending at 8.
            sample_flight("B", "OUT", "HUB", 10, 12)
                .with_passengers(ClassMap::splat(0).with(Economy, 85)),
        ];
        let p = PlanningProblem::new(&catalog, &snapshot, &flights, 72, CostConfig::default())
            .unwrap();
        let m = build(&p, DemandMode::Hard);
        let values = solve(m.program()).unwrap();
        let d = m.decision(&values);
        assert_eq!(d.loads[0][Economy], 80);
        assert_eq!(d.loads[1][Economy], 85);
    }
}
