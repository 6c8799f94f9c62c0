//! Service classes and per-class dense storage.
//!
//! Kits come in exactly four service classes. Every per-class quantity in
//! the crate (capacities, costs, loads, purchases) is stored in a
//! [`ClassMap`], a fixed `[T; 4]` indexed by [`ServiceClass`], so genes and
//! inventory vectors stay contiguous and cheap to copy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the four fixed kit service classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceClass {
    /// First class.
    First,
    /// Business class.
    Business,
    /// Premium economy.
    PremiumEconomy,
    /// Economy.
    Economy,
}

impl ServiceClass {
    /// All classes in index order.
    pub const ALL: [ServiceClass; 4] = [
        ServiceClass::First,
        ServiceClass::Business,
        ServiceClass::PremiumEconomy,
        ServiceClass::Economy,
    ];

    /// Number of classes.
    pub const COUNT: usize = 4;

    /// Dense index (0..4).
    pub fn index(self) -> usize {
        match self {
            ServiceClass::First => 0,
            ServiceClass::Business => 1,
            ServiceClass::PremiumEconomy => 2,
            ServiceClass::Economy => 3,
        }
    }

    /// Short label used in logs.
    pub fn code(self) -> &'static str {
        match self {
            ServiceClass::First => "FC",
            ServiceClass::Business => "BC",
            ServiceClass::PremiumEconomy => "PE",
            ServiceClass::Economy => "EC",
        }
    }
}

impl fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A value per service class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ClassMap<T>(pub [T; 4]);

impl<T> ClassMap<T> {
    /// Builds a map by evaluating `f` for each class.
    pub fn from_fn(mut f: impl FnMut(ServiceClass) -> T) -> Self {
        ClassMap(ServiceClass::ALL.map(&mut f))
    }

    /// Iterates `(class, &value)` pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceClass, &T)> {
        ServiceClass::ALL.into_iter().zip(self.0.iter())
    }

    /// Maps every value.
    pub fn map<U>(&self, mut f: impl FnMut(ServiceClass, &T) -> U) -> ClassMap<U> {
        ClassMap::from_fn(|c| f(c, &self[c]))
    }
}

impl<T: Copy> ClassMap<T> {
    /// Same value for every class.
    pub fn splat(value: T) -> Self {
        ClassMap([value; 4])
    }

    /// Returns a copy with one class replaced.
    pub fn with(mut self, class: ServiceClass, value: T) -> Self {
        self[class] = value;
        self
    }
}

impl ClassMap<u32> {
    /// Sum over all classes.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&v| u64::from(v)).sum()
    }

    /// Whether every class is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }
}

impl<T> Index<ServiceClass> for ClassMap<T> {
    type Output = T;

    fn index(&self, class: ServiceClass) -> &T {
        &self.0[class.index()]
    }
}

impl<T> IndexMut<ServiceClass> for ClassMap<T> {
    fn index_mut(&mut self, class: ServiceClass) -> &mut T {
        &mut self.0[class.index()]
    }
}

/// Reference data for one kit class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KitClassSpec {
    /// Purchase cost per kit.
    pub purchase_cost: f64,
    /// Unit weight (kg), drives transport cost.
    pub weight_kg: f64,
    /// Hours between placing an order and arrival at the hub.
    pub lead_time_hours: u32,
}

impl KitClassSpec {
    /// Creates a kit class definition.
    pub fn new(purchase_cost: f64, weight_kg: f64, lead_time_hours: u32) -> Self {
        Self {
            purchase_cost,
            weight_kg,
            lead_time_hours,
        }
    }

    /// Standard kit catalog.
    ///
    /// | Class | Cost | Weight (kg) | Lead time (h) |
    /// |-------|------|-------------|---------------|
    /// | First | 200 | 5.0 | 48 |
    /// | Business | 150 | 3.0 | 36 |
    /// | Premium economy | 100 | 2.5 | 24 |
    /// | Economy | 50 | 1.5 | 12 |
    pub fn standard() -> ClassMap<KitClassSpec> {
        ClassMap([
            KitClassSpec::new(200.0, 5.0, 48),
            KitClassSpec::new(150.0, 3.0, 36),
            KitClassSpec::new(100.0, 2.5, 24),
            KitClassSpec::new(50.0, 1.5, 12),
        ])
    }
}
