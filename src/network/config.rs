//! Network optimizer configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// How passenger demand enters the network model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandMode {
    /// `load ≥ passengers` for every flight and class. Any flight that cannot
    /// be fully served makes the model infeasible and triggers the fallback.
    #[default]
    Hard,
    /// `load + shortfall ≥ passengers`, shortfall priced at the unfulfilled
    /// penalty. Always feasible.
    Soft,
}

/// Time-expanded network parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Wall-clock cap for one solve.
    pub solve_timeout: Duration,
    /// Hard or soft passenger demand.
    pub demand_mode: DemandMode,
    /// Purchase variables are bounded by this multiple of horizon demand.
    pub purchase_bound_multiple: f64,
    /// Extra cost per kit per hour a purchase is delayed.
    pub time_preference: f64,
    /// Cost per kit held at an inventory node.
    pub holding_cost: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            solve_timeout: Duration::from_secs(4),
            demand_mode: DemandMode::Hard,
            purchase_bound_multiple: 3.0,
            time_preference: 1e-3,
            holding_cost: 1e-6,
        }
    }
}

impl NetworkConfig {
    /// Sets the solve timeout.
    pub fn with_solve_timeout(mut self, timeout: Duration) -> Self {
        self.solve_timeout = timeout;
        self
    }

    /// Sets the demand mode.
    pub fn with_demand_mode(mut self, mode: DemandMode) -> Self {
        self.demand_mode = mode;
        self
    }

    /// Sets the purchase bound multiple.
    pub fn with_purchase_bound_multiple(mut self, multiple: f64) -> Self {
        self.purchase_bound_multiple = multiple;
        self
    }

    /// Sets the earlier-purchase preference.
    pub fn with_time_preference(mut self, epsilon: f64) -> Self {
        self.time_preference = epsilon;
        self
    }

    /// Sets the holding cost.
    pub fn with_holding_cost(mut self, epsilon: f64) -> Self {
        self.holding_cost = epsilon;
        self
    }

    /// Checks ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.purchase_bound_multiple <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "purchase_bound_multiple",
            });
        }
        if self.time_preference < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "time_preference",
            });
        }
        if self.holding_cost < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "holding_cost",
            });
        }
        Ok(())
    }
}
