//! Input validation for planning ticks.
//!
//! Checks structural integrity of the catalog and the visible flights
//! before planning. Detects:
//! - Duplicate airport, aircraft, and flight IDs
//! - Missing or duplicated hub
//! - Flights referencing unknown airports or aircraft types
//! - Flights arriving before they depart, or returning to their origin
//!
//! Validation never aborts a tick. The orchestrator logs each error and
//! plans over the flights that passed.

use std::collections::HashSet;

use crate::models::{Catalog, Flight};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending entity (airport code, aircraft code, or flight id).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// No airport is flagged as hub.
    MissingHub,
    /// More than one airport is flagged as hub.
    MultipleHubs,
    /// A flight references an airport that doesn't exist.
    UnknownAirport,
    /// A flight references an aircraft type that doesn't exist.
    UnknownAircraft,
    /// A flight arrives before it departs.
    InvalidTiming,
    /// A flight's origin equals its destination.
    SelfLoop,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, entity_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.to_string(),
            message: message.into(),
        }
    }
}

/// Validates the catalog.
///
/// Checks:
/// 1. No duplicate airport codes
/// 2. No duplicate aircraft type codes
/// 3. Exactly one hub
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult {
    let mut errors = Vec::new();

    let mut codes = HashSet::new();
    for airport in catalog.airports() {
        if !codes.insert(airport.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &airport.code,
                format!("Duplicate airport code: {}", airport.code),
            ));
        }
    }

    let mut aircraft = HashSet::new();
    for a in catalog.aircraft_types() {
        if !aircraft.insert(a.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &a.code,
                format!("Duplicate aircraft type: {}", a.code),
            ));
        }
    }

    let hubs: Vec<&str> = catalog
        .airports()
        .iter()
        .filter(|a| a.is_hub)
        .map(|a| a.code.as_str())
        .collect();
    match hubs.len() {
        0 => errors.push(ValidationError::new(
            ValidationErrorKind::MissingHub,
            "",
            "No hub airport in catalog",
        )),
        1 => {}
        n => errors.push(ValidationError::new(
            ValidationErrorKind::MultipleHubs,
            hubs[1],
            format!("{n} hub airports: {}", hubs.join(", ")),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates flights against the catalog.
///
/// Checks:
/// 1. No duplicate flight IDs
/// 2. Origin and destination exist
/// 3. Aircraft type exists
/// 4. Arrival is not before departure
/// 5. Origin differs from destination
pub fn validate_flights(flights: &[Flight], catalog: &Catalog) -> ValidationResult {
    let (_, errors) = partition_flights(flights, catalog);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Splits flights into those passing every check and the errors of the rest.
///
/// The first flight carrying an id is judged on its own; later flights
/// with the same id are rejected as duplicates.
pub fn partition_flights<'a>(
    flights: &'a [Flight],
    catalog: &Catalog,
) -> (Vec<&'a Flight>, Vec<ValidationError>) {
    let mut accepted = Vec::with_capacity(flights.len());
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for flight in flights {
        let before = errors.len();
        if !ids.insert(flight.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &flight.id,
                format!("Duplicate flight ID: {}", flight.id),
            ));
        }
        check_flight(flight, catalog, &mut errors);
        if errors.len() == before {
            accepted.push(flight);
        }
    }

    (accepted, errors)
}

fn check_flight(flight: &Flight, catalog: &Catalog, errors: &mut Vec<ValidationError>) {
    for code in [&flight.origin, &flight.destination] {
        if catalog.airport(code).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownAirport,
                &flight.id,
                format!("Flight '{}' references unknown airport '{}'", flight.id, code),
            ));
        }
    }

    if catalog.aircraft(&flight.aircraft_type).is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownAircraft,
            &flight.id,
            format!(
                "Flight '{}' references unknown aircraft type '{}'",
                flight.id, flight.aircraft_type
            ),
        ));
    }

    if flight.arrival_hour() < flight.departure_hour() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTiming,
            &flight.id,
            format!(
                "Flight '{}' arrives at hour {} before departing at hour {}",
                flight.id,
                flight.arrival_hour(),
                flight.departure_hour()
            ),
        ));
    }

    if flight.origin == flight.destination {
        errors.push(ValidationError::new(
            ValidationErrorKind::SelfLoop,
            &flight.id,
            format!("Flight '{}' departs and arrives at '{}'", flight.id, flight.origin),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AircraftType, Airport, ClassMap};

    fn sample_catalog() -> Catalog {
        Catalog::new()
            .with_airport(Airport::hub("HUB"))
            .with_airport(Airport::new("OUT"))
            .with_aircraft(AircraftType::new("A320", ClassMap::splat(100), 0.01))
    }

    fn flight(id: &str, from: &str, to: &str, aircraft: &str) -> Flight {
        Flight::new(id, from, to, aircraft).with_hours(2, 5)
    }

    #[test]
    fn test_valid_input() {
        let catalog = sample_catalog();
        assert!(validate_catalog(&catalog).is_ok());
        let flights = vec![flight("F1", "HUB", "OUT", "A320")];
        assert!(validate_flights(&flights, &catalog).is_ok());
    }

    #[test]
    fn test_missing_hub() {
        let catalog = Catalog::new().with_airport(Airport::new("OUT"));
        let errors = validate_catalog(&catalog).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingHub));
    }

    #[test]
    fn test_multiple_hubs() {
        let catalog = Catalog::new()
            .with_airport(Airport::hub("H1"))
            .with_airport(Airport::hub("H2"));
        let errors = validate_catalog(&catalog).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MultipleHubs && e.entity_id == "H2"));
    }

    #[test]
    fn test_duplicate_airport_code() {
        let catalog = sample_catalog().with_airport(Airport::new("OUT"));
        let errors = validate_catalog(&catalog).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("airport")));
    }

    #[test]
    fn test_unknown_references() {
        let catalog = sample_catalog();
        let flights = vec![
            flight("F1", "HUB", "NOWHERE", "A320"),
            flight("F2", "HUB", "OUT", "B777"),
        ];
        let errors = validate_flights(&flights, &catalog).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownAirport && e.entity_id == "F1"));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownAircraft && e.entity_id == "F2"));
    }

    #[test]
    fn test_timing_and_self_loop() {
        let catalog = sample_catalog();
        let flights = vec![
            Flight::new("F1", "HUB", "OUT", "A320").with_hours(10, 5),
            flight("F2", "OUT", "OUT", "A320"),
        ];
        let errors = validate_flights(&flights, &catalog).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidTiming));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::SelfLoop));
    }

    #[test]
    fn test_duplicate_flight_id() {
        let catalog = sample_catalog();
        let flights = vec![
            flight("F1", "HUB", "OUT", "A320"),
            flight("F1", "OUT", "HUB", "A320"),
        ];
        let errors = validate_flights(&flights, &catalog).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateId);
    }

    #[test]
    fn test_partition_keeps_first_of_duplicates() {
        let catalog = sample_catalog();
        let flights = vec![
            flight("DUP", "HUB", "OUT", "A320"),
            flight("DUP", "OUT", "HUB", "A320"),
            flight("LOOP", "HUB", "HUB", "A320"),
            Flight::new("BACK", "HUB", "OUT", "A320").with_hours(9, 4),
            flight("OK", "OUT", "HUB", "A320"),
        ];
        let (accepted, errors) = partition_flights(&flights, &catalog);
        let ids: Vec<&str> = accepted.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["DUP", "OK"]);
        assert_eq!(accepted[0].destination, "OUT");
        assert_eq!(errors.len(), 3);
    }
}
