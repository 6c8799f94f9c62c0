//! Rolling-horizon kit allocation for a hub-and-spoke airline.
//!
//! Every simulated hour the planner decides how many catering kits of each
//! service class to load onto each departing flight and how many to buy at
//! the hub, minimising operational cost plus penalties for unserved
//! passengers, overloaded aircraft, negative stock, and overfull storage.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Airport`, `Flight`, `Catalog`, `GameState`,
//!   `Decision`, `ServiceClass`, `ClassMap`
//! - **`config`**: Cost factors, horizon windows, per-tick budget
//! - **`problem`**: Per-tick index-based planning problem
//! - **`timeline`**: Inventory timeline and the shared cost model
//! - **`repair`**: Projection of any decision onto the feasible region
//! - **`heuristic`**: Greedy loads and the hub purchase rule
//! - **`ga`**: Genetic optimizer over load/purchase quantities
//! - **`network`**: Time-expanded MILP with heuristic fallback
//! - **`planner`**: Strategy selection and the rolling-horizon orchestrator
//! - **`validation`**: Input integrity checks
//!
//! # Example
//!
//! ```
//! use u_kitplan::config::PlannerConfig;
//! use u_kitplan::models::{
//!     AircraftType, Airport, Catalog, ClassMap, Flight, GameState, ServiceClass,
//! };
//! use u_kitplan::planner::Orchestrator;
//!
//! let catalog = Catalog::new()
//!     .with_airport(Airport::hub("HUB").with_capacity(ClassMap::splat(1000)))
//!     .with_airport(Airport::new("OUT").with_capacity(ClassMap::splat(1000)))
//!     .with_aircraft(AircraftType::new("A320", ClassMap::splat(150), 0.01));
//! let snapshot = GameState::at_hour(0).with_stock("HUB", ClassMap::splat(200));
//! let flights = vec![Flight::new("F1", "HUB", "OUT", "A320")
//!     .with_hours(0, 2)
//!     .with_distance(800.0)
//!     .with_passengers(ClassMap([4, 12, 20, 100]))];
//!
//! let planner = Orchestrator::heuristic(PlannerConfig::default());
//! let plan = planner.plan(&snapshot, &flights, &catalog);
//! assert_eq!(plan.loads[0].kits[ServiceClass::Economy], 100);
//! ```
//!
//! # References
//!
//! - Silver, Pyke & Thomas (2017), "Inventory and Production Management in Supply Chains"
//! - Powell (2011), "Approximate Dynamic Programming", ch. 2 (rolling horizons)

pub mod config;
pub mod error;
pub mod ga;
pub mod heuristic;
pub mod models;
pub mod network;
pub mod planner;
pub mod problem;
pub mod repair;
pub mod timeline;
pub mod validation;

#[cfg(test)]
mod testutil;

pub use config::{CostConfig, HorizonConfig, PlannerConfig};
pub use error::{ConfigError, PlanError, SolveError};
pub use planner::{KitPlanner, Orchestrator, PlanOutput, PlanSummary, Strategy};
