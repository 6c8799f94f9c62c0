//! Cost model and planning horizon configuration.
//!
//! All configs are serde-derivable so an ingestion layer can load them from
//! JSON, and follow the `Default` + `with_*` builder convention.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::{Catalog, ClassMap};

/// Penalty factors of the cost model.
///
/// `negative_inventory_factor` is a floor: each planning problem raises
/// it above every other per-kit penalty it can charge, so negative stock
/// is never cheaper than a shortfall. See
/// [`negative_unit_penalty`](crate::problem::PlanningProblem::negative_unit_penalty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Per-class multiplier of `distance × kit_cost` per unserved passenger.
    pub unfulfilled_factor: ClassMap<f64>,
    /// Multiplier of `distance × fuel_cost × kit_cost` per kit above aircraft capacity.
    pub overload_factor: f64,
    /// Minimum cost per kit below zero at any checkpoint.
    pub negative_inventory_factor: f64,
    /// Cost per kit above storage capacity at any checkpoint.
    pub over_capacity_factor: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            unfulfilled_factor: ClassMap([0.010, 0.008, 0.006, 0.005]),
            overload_factor: 5.0,
            negative_inventory_factor: 5342.0,
            over_capacity_factor: 777.0,
        }
    }
}

impl CostConfig {
    /// Sets per-class unfulfilled factors.
    pub fn with_unfulfilled_factor(mut self, factor: ClassMap<f64>) -> Self {
        self.unfulfilled_factor = factor;
        self
    }

    /// Sets the overload factor.
    pub fn with_overload_factor(mut self, factor: f64) -> Self {
        self.overload_factor = factor;
        self
    }

    /// Sets the negative inventory factor.
    pub fn with_negative_inventory_factor(mut self, factor: f64) -> Self {
        self.negative_inventory_factor = factor;
        self
    }

    /// Sets the over-capacity factor.
    pub fn with_over_capacity_factor(mut self, factor: f64) -> Self {
        self.over_capacity_factor = factor;
        self
    }

    /// Rejects negative or non-finite factors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("overload_factor", self.overload_factor),
            ("negative_inventory_factor", self.negative_inventory_factor),
            ("over_capacity_factor", self.over_capacity_factor),
        ];
        let per_class = self
            .unfulfilled_factor
            .iter()
            .map(|(_, &value)| ("unfulfilled_factor", value));
        for (name, value) in scalars.into_iter().chain(per_class) {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeFactor { name, value });
            }
        }
        Ok(())
    }
}

/// Rolling-horizon windows and purchase-rule parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonConfig {
    /// Hours ahead whose departures receive load decisions.
    pub loading_hours: u32,
    /// Hours ahead visible to purchase sizing.
    pub purchase_hours: u32,
    /// Window (hours) of demand the hub should cover after a purchase lands.
    pub rolling_demand_hours: u32,
    /// Buy when projected hub stock falls under this multiple of rolling demand.
    pub safety_multiple: f64,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            loading_hours: 24,
            purchase_hours: 72,
            rolling_demand_hours: 24,
            safety_multiple: 1.5,
        }
    }
}

impl HorizonConfig {
    /// Sets the loading horizon.
    pub fn with_loading_hours(mut self, hours: u32) -> Self {
        self.loading_hours = hours;
        self
    }

    /// Sets the purchase horizon.
    pub fn with_purchase_hours(mut self, hours: u32) -> Self {
        self.purchase_hours = hours;
        self
    }

    /// Sets the rolling demand window.
    pub fn with_rolling_demand_hours(mut self, hours: u32) -> Self {
        self.rolling_demand_hours = hours;
        self
    }

    /// Sets the safety multiple.
    pub fn with_safety_multiple(mut self, multiple: f64) -> Self {
        self.safety_multiple = multiple;
        self
    }

    /// Checks the windows against the catalog's purchase delays.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        if self.loading_hours == 0 {
            return Err(ConfigError::LoadingHorizon(self.loading_hours));
        }
        if self.purchase_hours < self.loading_hours {
            return Err(ConfigError::PurchaseShorterThanLoading {
                purchase: self.purchase_hours,
                loading: self.loading_hours,
            });
        }
        let delay = catalog.max_purchase_delay();
        if self.purchase_hours <= delay {
            return Err(ConfigError::PurchaseHorizonTooShort {
                horizon: self.purchase_hours,
                delay,
            });
        }
        if self.safety_multiple <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "safety_multiple",
            });
        }
        Ok(())
    }

    /// Returns a copy whose purchase horizon covers the longest purchase delay.
    pub fn covering(&self, catalog: &Catalog) -> Self {
        let min_purchase = (catalog.max_purchase_delay() + 1).max(self.loading_hours.max(1));
        Self {
            loading_hours: self.loading_hours.max(1),
            purchase_hours: self.purchase_hours.max(min_purchase),
            rolling_demand_hours: self.rolling_demand_hours.max(1),
            safety_multiple: if self.safety_multiple > 0.0 {
                self.safety_multiple
            } else {
                1.0
            },
        }
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Cost model factors.
    pub cost: CostConfig,
    /// Horizon windows.
    pub horizon: HorizonConfig,
    /// Wall-clock budget for one tick.
    pub tick_budget: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cost: CostConfig::default(),
            horizon: HorizonConfig::default(),
            tick_budget: Duration::from_secs(5),
        }
    }
}

impl PlannerConfig {
    /// Sets the cost config.
    pub fn with_cost(mut self, cost: CostConfig) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the horizon config.
    pub fn with_horizon(mut self, horizon: HorizonConfig) -> Self {
        self.horizon = horizon;
        self
    }

    /// Sets the per-tick wall-clock budget.
    pub fn with_tick_budget(mut self, budget: Duration) -> Self {
        self.tick_budget = budget;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Airport;

    fn catalog() -> Catalog {
        Catalog::new().with_airport(Airport::hub("HUB").with_processing_time(ClassMap::splat(6)))
    }

    #[test]
    fn test_default_horizon_is_valid() {
        assert!(HorizonConfig::default().validate(&catalog()).is_ok());
    }

    #[test]
    fn test_purchase_horizon_too_short() {
        let h = HorizonConfig::default().with_purchase_hours(54);
        assert_eq!(
            h.validate(&catalog()),
            Err(ConfigError::PurchaseHorizonTooShort {
                horizon: 54,
                delay: 54
            })
        );
    }

    #[test]
    fn test_zero_loading_horizon() {
        let h = HorizonConfig::default().with_loading_hours(0);
        assert_eq!(h.validate(&catalog()), Err(ConfigError::LoadingHorizon(0)));
    }

    #[test]
    fn test_covering_extends_purchase_horizon() {
        let h = HorizonConfig::default()
            .with_loading_hours(0)
            .with_purchase_hours(10)
            .covering(&catalog());
        assert_eq!(h.loading_hours, 1);
        assert_eq!(h.purchase_hours, 55);
        assert!(h.validate(&catalog()).is_ok());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let cfg = PlannerConfig::default().with_tick_budget(Duration::from_millis(750));
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PlannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_cost_factors_checked() {
        assert!(CostConfig::default().validate().is_ok());
        let bad = CostConfig::default().with_overload_factor(-1.0);
        assert_eq!(
            bad.validate(),
            Err(ConfigError::NegativeFactor {
                name: "overload_factor",
                value: -1.0
            })
        );
        let nan =
            CostConfig::default().with_unfulfilled_factor(ClassMap([0.01, f64::NAN, 0.0, 0.0]));
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_penalty_ordering() {
        let c = CostConfig::default();
        assert!(c.negative_inventory_factor > c.over_capacity_factor);
        assert!(c.overload_factor > 0.0);
    }
}
