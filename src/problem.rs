//! Per-tick planning problem.
//!
//! Resolves the catalog, snapshot, and visible flights into a compact,
//! index-based form shared by the cost model, the repair step, and every
//! optimizer. Built once per tick and discarded afterwards.

use tracing::{debug, warn};

use crate::config::CostConfig;
use crate::error::PlanError;
use crate::models::{
    Airport, Catalog, ClassMap, Decision, Flight, FlightSlots, GameState, KitClassSpec,
    ServiceClass,
};
use crate::repair;
use crate::timeline::{self, CostBreakdown};

/// Compact flight descriptor.
///
/// Extracted from `Flight` with airport and aircraft references resolved
/// to dense indices, so evaluation never touches strings.
#[derive(Debug, Clone)]
pub struct FlightInfo {
    /// Flight identifier.
    pub id: String,
    /// Origin airport index.
    pub origin: usize,
    /// Destination airport index.
    pub destination: usize,
    /// Absolute departure hour.
    pub departure_hour: i64,
    /// Absolute arrival hour.
    pub arrival_hour: i64,
    /// Distance.
    pub distance: f64,
    /// Passenger demand per class (actual when known).
    pub passengers: ClassMap<u32>,
    /// Aircraft kit capacity per class.
    pub capacity: ClassMap<u32>,
    /// Aircraft fuel cost per kg per distance unit.
    pub fuel_cost_per_km: f64,
}

/// Kits becoming usable at an airport at a given hour.
#[derive(Debug, Clone)]
pub struct Inflow {
    /// Airport index.
    pub airport: usize,
    /// Absolute hour the kits become usable.
    pub hour: i64,
    /// Quantity per class.
    pub kits: ClassMap<u32>,
}

/// Everything one tick needs to evaluate and repair decisions.
#[derive(Debug, Clone)]
pub struct PlanningProblem {
    /// Current absolute hour.
    pub current_hour: i64,
    /// Last absolute hour whose inventory is checked.
    pub horizon_end: i64,
    /// Airports (dense, catalog order).
    pub airports: Vec<Airport>,
    /// Kit class definitions.
    pub kit_classes: ClassMap<KitClassSpec>,
    /// Hub airport index.
    pub hub: usize,
    /// Flights in departure order (ties by id). Slot `i` = `flights[i]`.
    pub flights: Vec<FlightInfo>,
    /// Flight id ↔ slot lookup.
    pub slots: FlightSlots,
    /// Usable stock at `current_hour` per airport.
    pub initial_stock: Vec<ClassMap<i64>>,
    /// Pending inbound kits.
    pub inflows: Vec<Inflow>,
    /// Cost model factors.
    pub cost: CostConfig,
    /// Price of one kit below zero at one checkpoint.
    ///
    /// At least `negative_inventory_factor`, raised so that it exceeds
    /// every other per-kit penalty this problem can charge, once per
    /// flight plus one.
    pub negative_unit_penalty: f64,
}

impl PlanningProblem {
    /// Builds a problem from domain models.
    ///
    /// Flights referencing unknown airports or aircraft types are skipped
    /// with a warning; so are pending movements to unknown airports.
    /// Flights that already departed (before `current_hour`) are dropped.
    pub fn new(
        catalog: &Catalog,
        snapshot: &GameState,
        flights: &[Flight],
        horizon_hours: u32,
        cost: CostConfig,
    ) -> Result<Self, PlanError> {
        cost.validate()?;
        let hubs: Vec<usize> = catalog
            .airports()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_hub)
            .map(|(i, _)| i)
            .collect();
        let hub = match hubs.as_slice() {
            [] => return Err(PlanError::NoHub),
            [hub] => *hub,
            many => return Err(PlanError::MultipleHubs(many.len())),
        };

        let current_hour = snapshot.current_hour;
        let mut infos = Vec::with_capacity(flights.len());
        for flight in flights {
            match Self::resolve_flight(catalog, flight) {
                Ok(info) if info.departure_hour < current_hour => {
                    debug!(flight = %flight.id, "dropping flight that already departed");
                }
                Ok(info) => infos.push(info),
                Err(err) => warn!(flight = %flight.id, error = %err, "skipping flight"),
            }
        }
        infos.sort_by(|a, b| {
            a.departure_hour
                .cmp(&b.departure_hour)
                .then_with(|| a.id.cmp(&b.id))
        });

        let initial_stock = catalog
            .airports()
            .iter()
            .map(|a| snapshot.stock(&a.code).unwrap_or(a.stock))
            .collect();

        let mut inflows = Vec::with_capacity(snapshot.pending.len());
        for movement in &snapshot.pending {
            match catalog.airport_index(&movement.airport) {
                Some(airport) => inflows.push(Inflow {
                    airport,
                    hour: movement.usable_hour.max(current_hour),
                    kits: movement.kits,
                }),
                None => warn!(
                    airport = %movement.airport,
                    "skipping pending movement to unknown airport"
                ),
            }
        }

        let slots = FlightSlots::new(infos.iter().map(|f: &FlightInfo| f.id.as_str()));
        let negative_unit_penalty = price_negative_stock(&infos, &catalog.kit_classes, &cost);

        Ok(Self {
            current_hour,
            horizon_end: current_hour + i64::from(horizon_hours),
            airports: catalog.airports().to_vec(),
            kit_classes: catalog.kit_classes,
            hub,
            flights: infos,
            slots,
            initial_stock,
            inflows,
            cost,
            negative_unit_penalty,
        })
    }

    fn resolve_flight(catalog: &Catalog, flight: &Flight) -> Result<FlightInfo, PlanError> {
        let origin = catalog
            .airport_index(&flight.origin)
            .ok_or_else(|| PlanError::UnknownAirport(flight.origin.clone()))?;
        let destination = catalog
            .airport_index(&flight.destination)
            .ok_or_else(|| PlanError::UnknownAirport(flight.destination.clone()))?;
        let aircraft = catalog
            .aircraft(&flight.aircraft_type)
            .ok_or_else(|| PlanError::UnknownAircraft(flight.aircraft_type.clone()))?;

        Ok(FlightInfo {
            id: flight.id.clone(),
            origin,
            destination,
            departure_hour: flight.departure_hour(),
            arrival_hour: flight.arrival_hour().max(flight.departure_hour()),
            distance: flight.distance.max(0.0),
            passengers: flight.passengers(),
            capacity: aircraft.kit_capacity,
            fuel_cost_per_km: aircraft.fuel_cost_per_km,
        })
    }

    /// Number of flight slots.
    pub fn flight_count(&self) -> usize {
        self.flights.len()
    }

    /// Whether there is nothing to load.
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// All-zero decision sized for this problem.
    pub fn empty_decision(&self) -> Decision {
        Decision::empty(self.flights.len())
    }

    /// Hour at which kits loaded on `flight` become usable at its destination.
    pub fn arrival_usable_hour(&self, flight: &FlightInfo, class: ServiceClass) -> i64 {
        flight.arrival_hour + i64::from(self.airports[flight.destination].processing_time[class])
    }

    /// Hour at which a purchase placed now becomes usable at the hub.
    pub fn purchase_usable_hour(&self, class: ServiceClass) -> i64 {
        self.current_hour
            + i64::from(self.kit_classes[class].lead_time_hours)
            + i64::from(self.airports[self.hub].processing_time[class])
    }

    /// Linear cost of moving one kit on `flight`: loading, destination processing, transport.
    pub fn unit_load_cost(&self, flight: &FlightInfo, class: ServiceClass) -> f64 {
        self.airports[flight.origin].loading_cost[class]
            + self.airports[flight.destination].processing_cost[class]
            + self.unit_transport_cost(flight, class)
    }

    /// Transport cost of one kit on `flight`.
    pub fn unit_transport_cost(&self, flight: &FlightInfo, class: ServiceClass) -> f64 {
        flight.distance * flight.fuel_cost_per_km * self.kit_classes[class].weight_kg
    }

    /// Linear cost of buying one kit: purchase price plus hub processing.
    pub fn unit_purchase_cost(&self, class: ServiceClass) -> f64 {
        self.kit_classes[class].purchase_cost + self.airports[self.hub].processing_cost[class]
    }

    /// Free hub storage per class at `current_hour`.
    pub fn hub_headroom(&self) -> ClassMap<u32> {
        let hub = &self.airports[self.hub];
        let stock = self.initial_stock[self.hub];
        ClassMap::from_fn(|c| {
            let free = i64::from(hub.capacity[c]) - stock[c].max(0);
            free.clamp(0, i64::from(u32::MAX)) as u32
        })
    }

    /// Scores a decision with the inventory timeline model.
    pub fn evaluate(&self, decision: &Decision) -> CostBreakdown {
        timeline::evaluate(self, decision)
    }

    /// Projects a decision onto the feasible region.
    pub fn repair(&self, decision: &mut Decision) {
        repair::repair(self, decision);
    }

    /// Repairs, then stores the total cost as fitness.
    pub fn repair_and_score(&self, decision: &mut Decision) -> f64 {
        self.repair(decision);
        let total = self.evaluate(decision).total();
        decision.fitness = total;
        total
    }
}

/// Largest per-kit unfulfilled or overload penalty over `flights`, plus
/// the storage overflow price, times `flights + 1`; floored at the
/// configured negative inventory factor.
///
/// A kit taken below zero serves at most one passenger per flight, so
/// negative stock always costs more than the shortfall it covers.
fn price_negative_stock(
    flights: &[FlightInfo],
    kit_classes: &ClassMap<KitClassSpec>,
    cost: &CostConfig,
) -> f64 {
    let per_kit = flights
        .iter()
        .flat_map(|flight| {
            ServiceClass::ALL.into_iter().map(move |class| {
                let kit_cost = kit_classes[class].purchase_cost;
                let unfulfilled = cost.unfulfilled_factor[class] * flight.distance * kit_cost;
                let overload =
                    cost.overload_factor * flight.distance * flight.fuel_cost_per_km * kit_cost;
                unfulfilled.max(overload)
            })
        })
        .fold(0.0, f64::max);
    let bound = (per_kit + cost.over_capacity_factor.max(0.0)) * (flights.len() + 1) as f64;
    cost.negative_inventory_factor.max(bound)
}
