//! Rolling-horizon decision orchestrator.
//!
//! One call to [`Orchestrator::plan`] is one simulated hour:
//!
//! 1. Validate inputs (problems are logged, never fatal).
//! 2. Resolve the loading and purchase windows; a purchase window shorter
//!    than the longest purchase delay is extended.
//! 3. Keep loadable flights departing in `[now, now + purchase window)`.
//! 4. If none departs inside the loading window, run the purchase rule only.
//!    Otherwise run the selected strategy over every kept flight.
//! 5. Emit loads for flights departing this hour and purchase orders
//!    placed this hour.
//!
//! Every tick returns a plan, possibly empty.

mod context;
mod summary;

pub use context::TickContext;
pub use summary::{PlanSummary, StrategyKind};

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::error::ConfigError;
use crate::ga::{GaConfig, GeneticOptimizer};
use crate::heuristic::{HeuristicPlanner, reorder_quantities};
use crate::models::{
    Catalog, ClassMap, Decision, Flight, GameState, KitClassSpec, LoadDecision, PurchaseOrder,
};
use crate::network::{NetworkConfig, NetworkOptimizer};
use crate::problem::PlanningProblem;
use crate::validation::{partition_flights, validate_catalog};

/// A planning strategy.
pub trait KitPlanner {
    /// Produces a repaired decision for the tick.
    fn plan(&self, ctx: &TickContext) -> Decision;
}

/// The available strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Genetic optimizer.
    Genetic(GeneticOptimizer),
    /// Time-expanded network optimizer with heuristic fallback.
    NetworkFlow(NetworkOptimizer),
    /// Greedy heuristic.
    Heuristic(HeuristicPlanner),
}

/// Decision plus whether a fallback produced it.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    /// Repaired, scored decision.
    pub decision: Decision,
    /// Whether the network solver failed over to the heuristic.
    pub fallback_used: bool,
}

impl Strategy {
    /// Genetic strategy.
    pub fn genetic(config: GaConfig) -> Result<Self, ConfigError> {
        GeneticOptimizer::new(config).map(Self::Genetic)
    }

    /// Network strategy.
    pub fn network(config: NetworkConfig) -> Result<Self, ConfigError> {
        NetworkOptimizer::new(config).map(Self::NetworkFlow)
    }

    /// Heuristic strategy.
    pub fn heuristic() -> Self {
        Self::Heuristic(HeuristicPlanner::new())
    }

    /// Which kind this is.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Genetic(_) => StrategyKind::Genetic,
            Self::NetworkFlow(_) => StrategyKind::NetworkFlow,
            Self::Heuristic(_) => StrategyKind::Heuristic,
        }
    }

    /// Runs the strategy, reporting fallbacks.
    pub fn execute(&self, ctx: &TickContext) -> StrategyRun {
        match self {
            Self::Genetic(ga) => StrategyRun {
                decision: ga.run(&ctx.problem, &ctx.demand, ctx.deadline).best,
                fallback_used: false,
            },
            Self::NetworkFlow(network) => {
                let result = network.run(&ctx.problem, &ctx.demand, ctx.deadline);
                StrategyRun {
                    fallback_used: result.outcome.is_fallback(),
                    decision: result.decision,
                }
            }
            Self::Heuristic(heuristic) => StrategyRun {
                decision: heuristic.plan(ctx),
                fallback_used: false,
            },
        }
    }
}

impl KitPlanner for Strategy {
    fn plan(&self, ctx: &TickContext) -> Decision {
        self.execute(ctx).decision
    }
}

/// Decisions for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutput {
    /// Loads for flights departing this hour.
    pub loads: Vec<LoadDecision>,
    /// Purchase orders placed this hour.
    pub purchases: Vec<PurchaseOrder>,
    /// Quality indicators of the full-horizon plan.
    pub summary: PlanSummary,
}

impl PlanOutput {
    /// A plan with no decisions.
    pub fn empty(started: Instant) -> Self {
        Self {
            loads: Vec::new(),
            purchases: Vec::new(),
            summary: PlanSummary::empty(started.elapsed()),
        }
    }
}

/// Purchase-only decision: no loads, purchase rule at the hub.
pub fn purchase_only(ctx: &TickContext) -> Decision {
    let mut decision = ctx.problem.empty_decision();
    decision.purchases = reorder_quantities(&ctx.problem, &decision, &ctx.demand);
    ctx.problem.repair_and_score(&mut decision);
    decision
}

/// Groups this hour's purchases into one order per delivery hour.
pub fn purchase_orders(
    order_hour: i64,
    purchases: &ClassMap<u32>,
    kit_classes: &ClassMap<KitClassSpec>,
) -> Vec<PurchaseOrder> {
    let mut by_delivery: BTreeMap<i64, ClassMap<u32>> = BTreeMap::new();
    for (class, &qty) in purchases.iter() {
        if qty == 0 {
            continue;
        }
        let delivery = order_hour + i64::from(kit_classes[class].lead_time_hours);
        by_delivery.entry(delivery).or_default()[class] = qty;
    }
    by_delivery
        .into_iter()
        .map(|(delivery_hour, kits)| PurchaseOrder {
            order_hour,
            kits,
            delivery_hour,
        })
        .collect()
}

/// Rolling-horizon orchestrator.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: PlannerConfig,
    strategy: Strategy,
}

impl Orchestrator {
    /// Creates an orchestrator.
    pub fn new(config: PlannerConfig, strategy: Strategy) -> Self {
        Self { config, strategy }
    }

    /// Orchestrator running the greedy heuristic.
    pub fn heuristic(config: PlannerConfig) -> Self {
        Self::new(config, Strategy::heuristic())
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The active strategy.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Plans one tick.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(hour = snapshot.current_hour, strategy = %self.strategy.kind())
    )]
    pub fn plan(
        &self,
        snapshot: &GameState,
        visible_flights: &[Flight],
        catalog: &Catalog,
    ) -> PlanOutput {
        let started = Instant::now();
        let now = snapshot.current_hour;

        if let Err(errors) = validate_catalog(catalog) {
            for e in &errors {
                warn!(kind = ?e.kind, entity = %e.entity_id, "{}", e.message);
            }
        }
        let (accepted, errors) = partition_flights(visible_flights, catalog);
        for e in &errors {
            warn!(kind = ?e.kind, entity = %e.entity_id, "{}", e.message);
        }

        let horizon = match self.config.horizon.validate(catalog) {
            Ok(()) => self.config.horizon.clone(),
            Err(err) => {
                let covering = self.config.horizon.covering(catalog);
                warn!(
                    error = %err,
                    purchase_hours = covering.purchase_hours,
                    "adjusting horizon"
                );
                covering
            }
        };

        let purchase_end = now + i64::from(horizon.purchase_hours);
        let loading_end = now + i64::from(horizon.loading_hours);
        let flights: Vec<Flight> = accepted
            .into_iter()
            .filter(|f| f.status.is_loadable())
            .filter(|f| (now..purchase_end).contains(&f.departure_hour()))
            .cloned()
            .collect();

        let problem = match PlanningProblem::new(
            catalog,
            snapshot,
            &flights,
            horizon.purchase_hours,
            self.config.cost.clone(),
        ) {
            Ok(problem) => problem,
            Err(err) => {
                warn!(error = %err, "cannot build planning problem, returning empty plan");
                return PlanOutput::empty(started);
            }
        };

        let loading = problem
            .flights
            .iter()
            .filter(|f| f.departure_hour < loading_end)
            .count();

        let remaining = self.config.tick_budget.saturating_sub(started.elapsed());
        let ctx = TickContext::new(problem, horizon, Some(remaining));

        let (run, kind) = if loading == 0 {
            let decision = purchase_only(&ctx);
            (
                StrategyRun {
                    decision,
                    fallback_used: false,
                },
                StrategyKind::PurchaseOnly,
            )
        } else {
            (self.strategy.execute(&ctx), self.strategy.kind())
        };
        let decision = run.decision;

        let loads = ctx
            .problem
            .flights
            .iter()
            .zip(&decision.loads)
            .filter(|(flight, _)| flight.departure_hour == now)
            .map(|(flight, kits)| LoadDecision {
                flight_id: flight.id.clone(),
                kits: *kits,
            })
            .collect::<Vec<_>>();
        let purchases = purchase_orders(now, &decision.purchases, &ctx.problem.kit_classes);

        let elapsed = started.elapsed();
        let summary =
            PlanSummary::calculate(&ctx.problem, &decision, kind, run.fallback_used, elapsed);

        if elapsed > self.config.tick_budget {
            warn!(?elapsed, budget = ?self.config.tick_budget, "tick exceeded its budget");
        }
        info!(
            hour = now,
            flights = ctx.problem.flight_count(),
            loads = loads.len(),
            kits_loaded = loads.iter().map(|l| l.kits.total()).sum::<u64>(),
            kits_purchased = decision.purchases.total(),
            cost = summary.cost.total(),
            fulfilment = summary.fulfilment_rate,
            strategy = %kind,
            fallback = run.fallback_used,
            elapsed_ms = elapsed.as_millis() as u64,
            "tick planned"
        );

        PlanOutput {
            loads,
            purchases,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HorizonConfig;
    use crate::models::{AircraftType, Airport, FlightStatus, ServiceClass::*};
    use crate::network::DemandMode;
    use crate::testutil::{hub_catalog, init_tracing, sample_flight};
    use std::time::Duration;

    fn ga() -> Strategy {
        Strategy::genetic(
            GaConfig::default()
                .with_population_size(20)
                .with_max_generations(30)
                .with_seed(42)
                .with_parallel(false),
        )
        .unwrap()
    }

    fn network(mode: DemandMode) -> Strategy {
        Strategy::network(
            NetworkConfig::default()
                .with_demand_mode(mode)
                .with_solve_timeout(Duration::from_secs(30)),
        )
        .unwrap()
    }

    fn config() -> PlannerConfig {
        PlannerConfig::default().with_tick_budget(Duration::from_secs(60))
    }

    fn snapshot(hub_economy: i64) -> GameState {
        GameState::at_hour(0)
            .with_stock("HUB", ClassMap::splat(0).with(Economy, hub_economy))
            .with_stock("OUT", ClassMap::splat(0))
    }

    fn departing_now(pax: u32) -> Vec<Flight> {
        vec![sample_flight("F1", "HUB", "OUT", 0, 2)
            .with_passengers(ClassMap::splat(0).with(Economy, pax))]
    }

    #[test]
    fn test_exact_coverage_all_strategies() {
        init_tracing();
        let catalog = hub_catalog();
        for strategy in [Strategy::heuristic(), ga(), network(DemandMode::Hard)] {
            let kind = strategy.kind();
            let out = Orchestrator::new(config(), strategy).plan(
                &snapshot(200),
                &departing_now(100),
                &catalog,
            );
            assert_eq!(out.loads.len(), 1, "{kind}");
            assert_eq!(out.loads[0].flight_id, "F1");
            assert_eq!(out.loads[0].kits[Economy], 100, "{kind}");
            assert!(out.purchases.is_empty(), "{kind}");
            assert_eq!(out.summary.cost.penalty(), 0.0);
            // loading 1.0 + processing 0.5 + 1000 km × 0.01 × 1.5 kg
            assert!((out.summary.cost.total() - 100.0 * 16.5).abs() < 1e-6, "{kind}");
            assert_eq!(out.summary.strategy, kind);
        }
    }

    #[test]
    fn test_overload_prevention_all_strategies() {
        let catalog =
            hub_catalog().with_aircraft(AircraftType::new("SMALL", ClassMap::splat(50), 0.01));
        let flights = vec![Flight::new("F1", "HUB", "OUT", "SMALL")
            .with_hours(0, 2)
            .with_distance(1000.0)
            .with_passengers(ClassMap::splat(0).with(Economy, 100))];
        for strategy in [Strategy::heuristic(), ga(), network(DemandMode::Soft)] {
            let out =
                Orchestrator::new(config(), strategy).plan(&snapshot(200), &flights, &catalog);
            assert_eq!(out.loads[0].kits[Economy], 50);
            assert_eq!(out.summary.cost.overload, 0.0);
            assert_eq!(out.summary.passengers_unserved, 50);
        }
    }

    #[test]
    fn test_lead_time_limits_first_class() {
        let catalog = hub_catalog();
        let snapshot = GameState::at_hour(0)
            .with_stock("HUB", ClassMap::splat(0).with(First, 10))
            .with_stock("OUT", ClassMap::splat(0));
        let flights = vec![sample_flight("LATE", "HUB", "OUT", 40, 43)
            .with_passengers(ClassMap::splat(0).with(First, 100))];
        let config = config().with_horizon(HorizonConfig::default().with_loading_hours(48));
        let out = Orchestrator::new(config, ga()).plan(&snapshot, &flights, &catalog);
        // Nothing departs now; the plan still covers the 40h flight.
        assert!(out.loads.is_empty());
        assert_eq!(out.summary.passengers_unserved, 90);
        assert_eq!(out.summary.kits_loaded, 10);
    }

    #[test]
    fn test_network_failure_matches_heuristic() {
        // 30 kits for 100 passengers under hard demand is infeasible.
        let catalog = hub_catalog();
        let flights = departing_now(100);
        let fallback = Orchestrator::new(config(), network(DemandMode::Hard))
            .plan(&snapshot(30), &flights, &catalog);
        let heuristic = Orchestrator::heuristic(config()).plan(&snapshot(30), &flights, &catalog);

        assert!(fallback.summary.fallback_used);
        assert_eq!(fallback.summary.strategy, StrategyKind::NetworkFlow);
        assert_eq!(fallback.loads, heuristic.loads);
        assert_eq!(fallback.purchases, heuristic.purchases);
        assert_eq!(
            fallback.summary.cost.total().to_bits(),
            heuristic.summary.cost.total().to_bits()
        );
    }

    #[test]
    fn test_purchase_only_when_nothing_to_load() {
        let catalog = hub_catalog();
        let snapshot = GameState::at_hour(0)
            .with_stock("HUB", ClassMap::splat(0).with(First, 10))
            .with_stock("OUT", ClassMap::splat(0));
        let flights = vec![sample_flight("LATE", "HUB", "OUT", 40, 43)
            .with_passengers(ClassMap::splat(0).with(First, 100))];
        let out = Orchestrator::new(config(), ga()).plan(&snapshot, &flights, &catalog);

        assert!(out.loads.is_empty());
        assert_eq!(out.summary.strategy, StrategyKind::PurchaseOnly);
        assert_eq!(out.purchases.len(), 1);
        let order = &out.purchases[0];
        assert_eq!(order.order_hour, 0);
        assert_eq!(order.delivery_hour, 48);
        assert!(order.kits[First] > 0);
        assert_eq!(order.kits[Economy], 0);
    }

    #[test]
    fn test_flight_visibility() {
        let catalog = hub_catalog();
        let pax = ClassMap::splat(0).with(Economy, 10);
        let flights = vec![
            sample_flight("NOW", "HUB", "OUT", 5, 7).with_passengers(pax),
            sample_flight("GONE", "HUB", "OUT", 5, 7)
                .with_passengers(pax)
                .with_status(FlightStatus::Departed),
            sample_flight("PAST", "HUB", "OUT", 4, 6).with_passengers(pax),
            sample_flight("FAR", "HUB", "OUT", 5 + 72, 5 + 74).with_passengers(pax),
            Flight::new("GHOST", "HUB", "OUT", "UNKNOWN").with_hours(5, 7),
        ];
        let snapshot = GameState::at_hour(5).with_stock("HUB", ClassMap::splat(100));
        let out = Orchestrator::heuristic(config()).plan(&snapshot, &flights, &catalog);

        let ids: Vec<&str> = out.loads.iter().map(|l| l.flight_id.as_str()).collect();
        assert_eq!(ids, vec!["NOW"]);
        assert_eq!(out.loads[0].kits[Economy], 10);
        assert_eq!(out.summary.passengers, 10);
    }

    #[test]
    fn test_rejected_flights_are_not_planned() {
        let catalog = hub_catalog();
        let pax = ClassMap::splat(0).with(Economy, 10);
        let flights = vec![
            sample_flight("DUP", "HUB", "OUT", 0, 2).with_passengers(pax),
            sample_flight("DUP", "HUB", "OUT", 0, 3).with_passengers(pax),
            sample_flight("LOOP", "HUB", "HUB", 0, 2).with_passengers(pax),
            sample_flight("BACK", "HUB", "OUT", 1, 0).with_passengers(pax),
        ];
        let out = Orchestrator::heuristic(config()).plan(&snapshot(100), &flights, &catalog);

        let ids: Vec<&str> = out.loads.iter().map(|l| l.flight_id.as_str()).collect();
        assert_eq!(ids, vec!["DUP"]);
        assert_eq!(out.loads[0].kits[Economy], 10);
        assert_eq!(out.summary.passengers, 10);
    }

    #[test]
    fn test_actual_passengers_override_planned() {
        let catalog = hub_catalog();
        let flights = vec![sample_flight("F1", "HUB", "OUT", 0, 2)
            .with_passengers(ClassMap::splat(0).with(Economy, 100))
            .with_actual_passengers(ClassMap::splat(0).with(Economy, 80))];
        let out = Orchestrator::heuristic(config()).plan(&snapshot(200), &flights, &catalog);
        assert_eq!(out.loads[0].kits[Economy], 80);
    }

    #[test]
    fn test_missing_hub_returns_empty_plan() {
        let catalog = Catalog::new()
            .with_airport(Airport::new("OUT"))
            .with_aircraft(AircraftType::new("A320", ClassMap::splat(150), 0.01));
        let flights = vec![Flight::new("F1", "OUT", "OUT", "A320").with_hours(0, 2)];
        let out =
            Orchestrator::heuristic(config()).plan(&GameState::at_hour(0), &flights, &catalog);
        assert!(out.loads.is_empty());
        assert!(out.purchases.is_empty());
        assert_eq!(out.summary.strategy, StrategyKind::Empty);
    }

    #[test]
    fn test_short_purchase_horizon_is_extended() {
        let catalog = hub_catalog();
        let snapshot = GameState::at_hour(0)
            .with_stock("HUB", ClassMap::splat(0).with(First, 10))
            .with_stock("OUT", ClassMap::splat(0));
        let flights = vec![sample_flight("LATE", "HUB", "OUT", 40, 43)
            .with_passengers(ClassMap::splat(0).with(First, 100))];
        // 24h cannot see the 40h flight nor cover the 54h first-class delay.
        let horizon = HorizonConfig::default()
            .with_loading_hours(24)
            .with_purchase_hours(24);
        let out = Orchestrator::heuristic(config().with_horizon(horizon))
            .plan(&snapshot, &flights, &catalog);
        assert_eq!(out.summary.passengers, 100);
        assert_eq!(out.summary.strategy, StrategyKind::PurchaseOnly);
    }

    #[test]
    fn test_purchase_orders_grouped_by_delivery() {
        let mut kits = crate::models::KitClassSpec::standard();
        let first_lead = kits[First].lead_time_hours;
        kits[Business].lead_time_hours = first_lead;
        let orders = purchase_orders(10, &ClassMap([3, 4, 0, 5]), &kits);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].delivery_hour, 10 + 12);
        assert_eq!(orders[0].kits, ClassMap([0, 0, 0, 5]));
        assert_eq!(orders[1].delivery_hour, 10 + 48);
        assert_eq!(orders[1].kits, ClassMap([3, 4, 0, 0]));
        assert!(orders.iter().all(|o| o.order_hour == 10));
    }

    #[test]
    fn test_plan_output_serializes() {
        let catalog = hub_catalog();
        let out =
            Orchestrator::heuristic(config()).plan(&snapshot(200), &departing_now(100), &catalog);
        let json = serde_json::to_string(&out).unwrap();
        let back: PlanOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.loads, out.loads);
    }

    #[test]
    fn test_strategy_as_planner_trait() {
        let catalog = hub_catalog();
        let problem = PlanningProblem::new(
            &catalog,
            &snapshot(200),
            &departing_now(100),
            72,
            crate::config::CostConfig::default(),
        )
        .unwrap();
        let ctx = TickContext::new(problem, HorizonConfig::default(), None);
        let planners: Vec<Box<dyn KitPlanner>> =
            vec![Box::new(Strategy::heuristic()), Box::new(ga())];
        for planner in planners {
            assert_eq!(planner.plan(&ctx).loads[0][Economy], 100);
        }
    }
}
