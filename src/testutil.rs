//! Shared test fixtures.

use crate::config::CostConfig;
use crate::models::{
    AircraftType, Airport, Catalog, ClassMap, Flight, GameState, ServiceClass,
};
use crate::problem::PlanningProblem;

/// Installs a debug-level subscriber writing through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// HUB (6h processing) and OUT (2h processing), storage 1000 per class,
/// one aircraft type "A320" with 150 kits per class.
pub fn hub_catalog() -> Catalog {
    Catalog::new()
        .with_airport(
            Airport::hub("HUB")
                .with_capacity(ClassMap::splat(1000))
                .with_loading_cost(ClassMap::splat(1.0))
                .with_processing_cost(ClassMap::splat(0.5))
                .with_processing_time(ClassMap::splat(6)),
        )
        .with_airport(
            Airport::new("OUT")
                .with_capacity(ClassMap::splat(1000))
                .with_loading_cost(ClassMap::splat(1.0))
                .with_processing_cost(ClassMap::splat(0.5))
                .with_processing_time(ClassMap::splat(2)),
        )
        .with_aircraft(AircraftType::new("A320", ClassMap::splat(150), 0.01))
}

/// A 1000 km "A320" flight with no passengers.
pub fn sample_flight(id: &str, origin: &str, destination: &str, dep: i64, arr: i64) -> Flight {
    Flight::new(id, origin, destination, "A320")
        .with_hours(dep, arr)
        .with_distance(1000.0)
}

/// One HUB→OUT flight (dep 1, arr 3) carrying only economy passengers.
///
/// The hub holds `stock` economy kits; the aircraft takes `capacity`
/// economy kits.
pub fn single_flight_problem(stock: i64, passengers: u32, capacity: u32) -> PlanningProblem {
    let catalog = hub_catalog().with_aircraft(AircraftType::new(
        "TEST",
        ClassMap::splat(150).with(ServiceClass::Economy, capacity),
        0.01,
    ));
    let snapshot = GameState::at_hour(0)
        .with_stock("HUB", ClassMap::splat(0).with(ServiceClass::Economy, stock))
        .with_stock("OUT", ClassMap::splat(0));
    let flights = vec![Flight::new("F1", "HUB", "OUT", "TEST")
        .with_hours(1, 3)
        .with_distance(1000.0)
        .with_passengers(ClassMap::splat(0).with(ServiceClass::Economy, passengers))];
    match PlanningProblem::new(&catalog, &snapshot, &flights, 72, CostConfig::default()) {
        Ok(problem) => problem,
        Err(err) => panic!("fixture problem: {err}"),
    }
}
