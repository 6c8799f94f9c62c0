//! Domain catalog: airports, aircraft types, and kit classes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{AircraftType, Airport, ClassMap, KitClassSpec};

/// Static reference data for planning.
///
/// Airports are kept in insertion order; lookups go through a code index
/// so that per-airport state can live in dense vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    airports: Vec<Airport>,
    aircraft_types: Vec<AircraftType>,
    /// Kit class definitions.
    pub kit_classes: ClassMap<KitClassSpec>,
    #[serde(skip)]
    airport_index: HashMap<String, usize>,
    #[serde(skip)]
    aircraft_index: HashMap<String, usize>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Creates an empty catalog with the standard kit classes.
    pub fn new() -> Self {
        Self {
            airports: Vec::new(),
            aircraft_types: Vec::new(),
            kit_classes: KitClassSpec::standard(),
            airport_index: HashMap::new(),
            aircraft_index: HashMap::new(),
        }
    }

    /// Sets kit class definitions.
    pub fn with_kit_classes(mut self, kit_classes: ClassMap<KitClassSpec>) -> Self {
        self.kit_classes = kit_classes;
        self
    }

    /// Adds an airport. A later airport with the same code shadows the earlier one.
    pub fn with_airport(mut self, airport: Airport) -> Self {
        self.airport_index
            .insert(airport.code.clone(), self.airports.len());
        self.airports.push(airport);
        self
    }

    /// Adds an aircraft type.
    pub fn with_aircraft(mut self, aircraft: AircraftType) -> Self {
        self.aircraft_index
            .insert(aircraft.code.clone(), self.aircraft_types.len());
        self.aircraft_types.push(aircraft);
        self
    }

    /// Rebuilds the lookup indices (needed after deserialization).
    pub fn reindex(&mut self) {
        self.airport_index = self
            .airports
            .iter()
            .enumerate()
            .map(|(i, a)| (a.code.clone(), i))
            .collect();
        self.aircraft_index = self
            .aircraft_types
            .iter()
            .enumerate()
            .map(|(i, a)| (a.code.clone(), i))
            .collect();
    }

    /// All airports in insertion order.
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// All aircraft types.
    pub fn aircraft_types(&self) -> &[AircraftType] {
        &self.aircraft_types
    }

    /// Dense index of an airport code.
    pub fn airport_index(&self, code: &str) -> Option<usize> {
        self.airport_index.get(code).copied()
    }

    /// Looks up an airport by code.
    pub fn airport(&self, code: &str) -> Option<&Airport> {
        self.airport_index(code).map(|i| &self.airports[i])
    }

    /// Looks up an aircraft type by code.
    pub fn aircraft(&self, code: &str) -> Option<&AircraftType> {
        self.aircraft_index
            .get(code)
            .map(|&i| &self.aircraft_types[i])
    }

    /// Index of the first hub airport.
    pub fn hub_index(&self) -> Option<usize> {
        self.airports.iter().position(|a| a.is_hub)
    }

    /// The hub airport.
    pub fn hub(&self) -> Option<&Airport> {
        self.hub_index().map(|i| &self.airports[i])
    }

    /// Longest `lead time + hub processing time` over all classes.
    ///
    /// The purchase horizon must exceed this for purchases to matter.
    pub fn max_purchase_delay(&self) -> u32 {
        let hub_processing = self
            .hub()
            .map(|h| h.processing_time)
            .unwrap_or_default();
        self.kit_classes
            .iter()
            .map(|(c, spec)| spec.lead_time_hours + hub_processing[c])
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceClass;

    fn sample() -> Catalog {
        Catalog::new()
            .with_airport(Airport::hub("HUB").with_processing_time(ClassMap::splat(6)))
            .with_airport(Airport::new("OUT"))
            .with_aircraft(AircraftType::new("A320", ClassMap::splat(100), 0.01))
    }

    #[test]
    fn test_lookup() {
        let c = sample();
        assert_eq!(c.airport_index("OUT"), Some(1));
        assert!(c.airport("NOPE").is_none());
        assert_eq!(c.aircraft("A320").map(|a| a.kit_capacity[ServiceClass::First]), Some(100));
        assert_eq!(c.hub_index(), Some(0));
    }

    #[test]
    fn test_max_purchase_delay() {
        let c = sample();
        // First class: 48h lead + 6h processing.
        assert_eq!(c.max_purchase_delay(), 54);
    }

    #[test]
    fn test_reindex_after_deserialize() {
        let c = sample();
        let json = serde_json::to_string(&c).unwrap();
        let mut back: Catalog = serde_json::from_str(&json).unwrap();
        assert!(back.airport("HUB").is_none());
        back.reindex();
        assert!(back.airport("HUB").is_some());
        assert!(back.aircraft("A320").is_some());
    }
}
