//! Aircraft types and flights.
//!
//! # Time Representation
//! The simulation clock counts whole hours. A [`ScheduleTime`] is a
//! `(day, hour)` pair; [`ScheduleTime::absolute_hour`] converts it to the
//! absolute hour index used everywhere else (`day * 24 + hour`).

use serde::{Deserialize, Serialize};

use super::ClassMap;

/// Aircraft type: physical kit capacity and fuel cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftType {
    /// Type code (unique).
    pub code: String,
    /// Maximum kits per class per flight.
    pub kit_capacity: ClassMap<u32>,
    /// Fuel cost per kg per distance unit.
    pub fuel_cost_per_km: f64,
}

impl AircraftType {
    /// Creates an aircraft type.
    pub fn new(
        code: impl Into<String>,
        kit_capacity: ClassMap<u32>,
        fuel_cost_per_km: f64,
    ) -> Self {
        Self {
            code: code.into(),
            kit_capacity,
            fuel_cost_per_km,
        }
    }
}

/// A `(day, hour)` point on the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleTime {
    /// Simulation day (0-based).
    pub day: u32,
    /// Hour of day (0..24).
    pub hour: u32,
}

impl ScheduleTime {
    /// Creates a time point.
    pub fn new(day: u32, hour: u32) -> Self {
        Self { day, hour }
    }

    /// Converts to an absolute hour index.
    pub fn absolute_hour(self) -> i64 {
        i64::from(self.day) * 24 + i64::from(self.hour)
    }

    /// Converts an absolute hour index back to `(day, hour)`.
    pub fn from_absolute(hour: i64) -> Self {
        let hour = hour.max(0);
        Self {
            day: (hour / 24) as u32,
            hour: (hour % 24) as u32,
        }
    }
}

/// Flight lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlightStatus {
    /// Published schedule, planned passenger counts only.
    #[default]
    Scheduled,
    /// Check-in closed, actual passenger counts known.
    CheckedIn,
    /// Left the origin.
    Departed,
    /// Arrived at the destination.
    Landed,
}

impl FlightStatus {
    /// Whether kits can still be loaded.
    pub fn is_loadable(self) -> bool {
        matches!(self, FlightStatus::Scheduled | FlightStatus::CheckedIn)
    }
}

/// A scheduled flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    /// Flight identifier (unique per tick).
    pub id: String,
    /// Origin airport code.
    pub origin: String,
    /// Destination airport code.
    pub destination: String,
    /// Scheduled departure.
    pub departure: ScheduleTime,
    /// Scheduled arrival.
    pub arrival: ScheduleTime,
    /// Great-circle distance.
    pub distance: f64,
    /// Planned passengers per class.
    pub planned_passengers: ClassMap<u32>,
    /// Actual passengers per class, once known.
    pub actual_passengers: Option<ClassMap<u32>>,
    /// Aircraft type code.
    pub aircraft_type: String,
    /// Lifecycle status.
    pub status: FlightStatus,
}

impl Flight {
    /// Creates a scheduled flight with no passengers.
    pub fn new(
        id: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        aircraft_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            origin: origin.into(),
            destination: destination.into(),
            departure: ScheduleTime::new(0, 0),
            arrival: ScheduleTime::new(0, 0),
            distance: 0.0,
            planned_passengers: ClassMap::default(),
            actual_passengers: None,
            aircraft_type: aircraft_type.into(),
            status: FlightStatus::Scheduled,
        }
    }

    /// Sets departure and arrival from absolute hours.
    pub fn with_hours(mut self, departure_hour: i64, arrival_hour: i64) -> Self {
        self.departure = ScheduleTime::from_absolute(departure_hour);
        self.arrival = ScheduleTime::from_absolute(arrival_hour);
        self
    }

    /// Sets the distance.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Sets planned passengers.
    pub fn with_passengers(mut self, passengers: ClassMap<u32>) -> Self {
        self.planned_passengers = passengers;
        self
    }

    /// Sets actual passengers and marks the flight checked in.
    pub fn with_actual_passengers(mut self, passengers: ClassMap<u32>) -> Self {
        self.actual_passengers = Some(passengers);
        self.status = FlightStatus::CheckedIn;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: FlightStatus) -> Self {
        self.status = status;
        self
    }

    /// Absolute departure hour.
    pub fn departure_hour(&self) -> i64 {
        self.departure.absolute_hour()
    }

    /// Absolute arrival hour.
    pub fn arrival_hour(&self) -> i64 {
        self.arrival.absolute_hour()
    }

    /// Passenger demand: actual counts when known, planned otherwise.
    pub fn passengers(&self) -> ClassMap<u32> {
        self.actual_passengers.unwrap_or(self.planned_passengers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceClass;

    #[test]
    fn test_absolute_hour_roundtrip() {
        let t = ScheduleTime::new(2, 5);
        assert_eq!(t.absolute_hour(), 53);
        assert_eq!(ScheduleTime::from_absolute(53), t);
        assert_eq!(ScheduleTime::from_absolute(-3), ScheduleTime::new(0, 0));
    }

    #[test]
    fn test_actual_passengers_supersede_planned() {
        let f = Flight::new("F1", "A", "B", "A320")
            .with_passengers(ClassMap::splat(100))
            .with_actual_passengers(ClassMap::splat(80).with(ServiceClass::First, 3));
        assert_eq!(f.passengers()[ServiceClass::Economy], 80);
        assert_eq!(f.passengers()[ServiceClass::First], 3);
        assert_eq!(f.status, FlightStatus::CheckedIn);
    }

    #[test]
    fn test_flight_hours() {
        let f = Flight::new("F1", "A", "B", "A320").with_hours(30, 34);
        assert_eq!(f.departure_hour(), 30);
        assert_eq!(f.arrival_hour(), 34);
        assert_eq!(f.departure, ScheduleTime::new(1, 6));
    }

    #[test]
    fn test_status_loadable() {
        assert!(FlightStatus::Scheduled.is_loadable());
        assert!(FlightStatus::CheckedIn.is_loadable());
        assert!(!FlightStatus::Departed.is_loadable());
        assert!(!FlightStatus::Landed.is_loadable());
    }
}
