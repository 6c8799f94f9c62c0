//! Airport model.
//!
//! Airports store kits between flights. Each has per-class storage
//! capacity, handling costs, and a processing delay before arriving
//! stock becomes usable. Exactly one airport in a catalog is the hub,
//! the only place purchased kits are delivered to.

use serde::{Deserialize, Serialize};

use super::{ClassMap, ServiceClass};

/// An airport that stores and handles kits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    /// Airport code (unique).
    pub code: String,
    /// Whether purchases are delivered here.
    pub is_hub: bool,
    /// Storage capacity per class.
    pub capacity: ClassMap<u32>,
    /// Cost of loading one kit onto a departing flight.
    pub loading_cost: ClassMap<f64>,
    /// Cost of processing one arriving (or purchased) kit.
    pub processing_cost: ClassMap<f64>,
    /// Hours before arriving stock becomes usable.
    pub processing_time: ClassMap<u32>,
    /// Reference stock, used when a snapshot carries no entry for this airport.
    pub stock: ClassMap<i64>,
}

impl Airport {
    /// Creates an outstation with zero capacity and zero costs.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            is_hub: false,
            capacity: ClassMap::default(),
            loading_cost: ClassMap::default(),
            processing_cost: ClassMap::default(),
            processing_time: ClassMap::default(),
            stock: ClassMap::default(),
        }
    }

    /// Creates the hub.
    pub fn hub(code: impl Into<String>) -> Self {
        Self {
            is_hub: true,
            ..Self::new(code)
        }
    }

    /// Sets the storage capacity for all classes.
    pub fn with_capacity(mut self, capacity: ClassMap<u32>) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the storage capacity for one class.
    pub fn with_class_capacity(mut self, class: ServiceClass, capacity: u32) -> Self {
        self.capacity[class] = capacity;
        self
    }

    /// Sets per-kit loading costs.
    pub fn with_loading_cost(mut self, cost: ClassMap<f64>) -> Self {
        self.loading_cost = cost;
        self
    }

    /// Sets per-kit processing costs.
    pub fn with_processing_cost(mut self, cost: ClassMap<f64>) -> Self {
        self.processing_cost = cost;
        self
    }

    /// Sets processing times (hours).
    pub fn with_processing_time(mut self, hours: ClassMap<u32>) -> Self {
        self.processing_time = hours;
        self
    }

    /// Sets the reference stock.
    pub fn with_stock(mut self, stock: ClassMap<i64>) -> Self {
        self.stock = stock;
        self
    }
}
