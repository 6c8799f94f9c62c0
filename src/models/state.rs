//! Per-tick game state snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ClassMap;

/// Kits in transit or in processing that will become usable later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMovement {
    /// Airport receiving the kits.
    pub airport: String,
    /// Absolute hour at which the kits become usable (processing included).
    pub usable_hour: i64,
    /// Quantity per class.
    pub kits: ClassMap<u32>,
}

impl PendingMovement {
    /// Creates a pending movement.
    pub fn new(airport: impl Into<String>, usable_hour: i64, kits: ClassMap<u32>) -> Self {
        Self {
            airport: airport.into(),
            usable_hour,
            kits,
        }
    }
}

/// Read-only inventory snapshot handed to one planning tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Current absolute hour.
    pub current_hour: i64,
    /// Usable stock per airport code.
    pub inventory: HashMap<String, ClassMap<i64>>,
    /// Inbound kits not yet usable.
    pub pending: Vec<PendingMovement>,
}

impl GameState {
    /// Creates an empty snapshot at the given hour.
    pub fn at_hour(current_hour: i64) -> Self {
        Self {
            current_hour,
            ..Default::default()
        }
    }

    /// Sets stock for an airport.
    pub fn with_stock(mut self, airport: impl Into<String>, stock: ClassMap<i64>) -> Self {
        self.inventory.insert(airport.into(), stock);
        self
    }

    /// Adds a pending movement.
    pub fn with_pending(mut self, movement: PendingMovement) -> Self {
        self.pending.push(movement);
        self
    }

    /// Stock at an airport, if the snapshot carries it.
    pub fn stock(&self, airport: &str) -> Option<ClassMap<i64>> {
        self.inventory.get(airport).copied()
    }
}
