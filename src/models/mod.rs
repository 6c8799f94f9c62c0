//! Kit allocation domain models.
//!
//! Provides the data types shared by the cost model, the repair step,
//! and both optimizers.
//!
//! # Domain Mappings
//!
//! | u-kitplan | Meaning |
//! |-----------|---------|
//! | ServiceClass | One of four kit classes (first → economy) |
//! | Airport | Storage node with handling costs and processing delay |
//! | AircraftType | Per-class kit ceiling for one flight |
//! | Flight | Demand sink at the origin, supply source at the destination |
//! | GameState | Read-only inventory snapshot for one tick |
//! | Decision | Loads per (flight, class) plus hub purchases |

mod airport;
mod catalog;
mod class;
mod decision;
mod flight;
mod state;

pub use airport::Airport;
pub use catalog::Catalog;
pub use class::{ClassMap, KitClassSpec, ServiceClass};
pub use decision::{Decision, FlightSlots, LoadDecision, PurchaseOrder};
pub use flight::{AircraftType, Flight, FlightStatus, ScheduleTime};
pub use state::{GameState, PendingMovement};
