//! Decision encoding and planner output.
//!
//! # Encoding
//!
//! A [`Decision`] is a dense gene vector:
//! - **Loads**: one `ClassMap<u32>` per flight slot. Slot `i` is the `i`-th
//!   flight of the planning problem (departure order). Flattened gene index
//!   `i * 4 + class.index()`.
//! - **Purchases**: one `ClassMap<u32>` of kits ordered at the hub this hour.
//!
//! [`FlightSlots`] maps flight ids to slots and back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ClassMap, ServiceClass};

/// Candidate loads and purchases for one planning tick.
///
/// Lower fitness = better (minimization convention).
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Kits loaded per flight slot and class.
    pub loads: Vec<ClassMap<u32>>,
    /// Kits purchased at the hub this hour.
    pub purchases: ClassMap<u32>,
    /// Total cost (lower = better); `INFINITY` until evaluated.
    pub fitness: f64,
}

impl Decision {
    /// All-zero decision over `flight_count` slots.
    pub fn empty(flight_count: usize) -> Self {
        Self {
            loads: vec![ClassMap::default(); flight_count],
            purchases: ClassMap::default(),
            fitness: f64::INFINITY,
        }
    }

    /// Creates a decision from explicit genes.
    pub fn new(loads: Vec<ClassMap<u32>>, purchases: ClassMap<u32>) -> Self {
        Self {
            loads,
            purchases,
            fitness: f64::INFINITY,
        }
    }

    /// Number of flight slots.
    pub fn flight_count(&self) -> usize {
        self.loads.len()
    }

    /// Number of flattened load genes.
    pub fn gene_count(&self) -> usize {
        self.loads.len() * ServiceClass::COUNT
    }

    /// Reads a flattened load gene.
    pub fn gene(&self, index: usize) -> u32 {
        self.loads[index / ServiceClass::COUNT].0[index % ServiceClass::COUNT]
    }

    /// Writes a flattened load gene.
    pub fn set_gene(&mut self, index: usize, value: u32) {
        self.loads[index / ServiceClass::COUNT].0[index % ServiceClass::COUNT] = value;
    }

    /// Load for one slot and class.
    pub fn load(&self, slot: usize, class: ServiceClass) -> u32 {
        self.loads[slot][class]
    }

    /// Whether the decision loads and buys nothing.
    pub fn is_empty(&self) -> bool {
        self.loads.iter().all(|l| l.is_zero()) && self.purchases.is_zero()
    }

    /// Total kits loaded.
    pub fn total_loaded(&self) -> u64 {
        self.loads.iter().map(|l| l.total()).sum()
    }

    /// Marks the decision as needing re-evaluation.
    pub fn invalidate(&mut self) {
        self.fitness = f64::INFINITY;
    }
}

/// Flight id ↔ slot lookup.
#[derive(Debug, Clone, Default)]
pub struct FlightSlots {
    ids: Vec<String>,
    index: HashMap<String, usize>,
}

impl FlightSlots {
    /// Builds the table from ids in slot order.
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let ids: Vec<String> = ids.into_iter().map(str::to_string).collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self { ids, index }
    }

    /// Slot of a flight id.
    pub fn slot(&self, flight_id: &str) -> Option<usize> {
        self.index.get(flight_id).copied()
    }

    /// Flight id of a slot.
    pub fn id(&self, slot: usize) -> Option<&str> {
        self.ids.get(slot).map(String::as_str)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Kits to load onto one flight departing this hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDecision {
    /// Flight identifier.
    pub flight_id: String,
    /// Kits per class.
    pub kits: ClassMap<u32>,
}

/// A purchase order placed at the hub.
///
/// Classes sharing a lead time share one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Absolute hour the order is placed.
    pub order_hour: i64,
    /// Kits per class.
    pub kits: ClassMap<u32>,
    /// Absolute hour the kits reach the hub (before processing).
    pub delivery_hour: i64,
}
