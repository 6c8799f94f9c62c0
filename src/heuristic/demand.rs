//! Per-tick demand analysis.
//!
//! Summarises passenger demand over the visible flights so the purchase
//! rule and the network model's purchase bounds can size orders. Computed
//! fresh for every tick and carried in the tick context.

use crate::config::HorizonConfig;
use crate::models::{ClassMap, ServiceClass};
use crate::problem::PlanningProblem;

/// Demand statistics for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandForecast {
    /// Passengers per class over all visible flights.
    pub total: ClassMap<u64>,
    /// Passengers per class on flights departing the hub.
    pub hub_departures: ClassMap<u64>,
    /// Hours covered by the visible flights.
    pub window_hours: u32,
    /// Hours of demand the hub should cover after a purchase lands.
    pub rolling_hours: u32,
    /// Safety multiple applied to rolling demand.
    pub safety_multiple: f64,
}

impl DemandForecast {
    /// Analyses the problem's flights.
    pub fn analyze(problem: &PlanningProblem, horizon: &HorizonConfig) -> Self {
        let mut total = ClassMap::<u64>::default();
        let mut hub_departures = ClassMap::<u64>::default();

        for flight in &problem.flights {
            for (class, &pax) in flight.passengers.iter() {
                total[class] += u64::from(pax);
                if flight.origin == problem.hub {
                    hub_departures[class] += u64::from(pax);
                }
            }
        }

        let window_hours =
            (problem.horizon_end - problem.current_hour).clamp(1, i64::from(u32::MAX)) as u32;

        Self {
            total,
            hub_departures,
            window_hours,
            rolling_hours: horizon.rolling_demand_hours.max(1),
            safety_multiple: horizon.safety_multiple,
        }
    }

    /// Hub-departure passengers per hour.
    pub fn hub_rate(&self, class: ServiceClass) -> f64 {
        self.hub_departures[class] as f64 / f64::from(self.window_hours)
    }

    /// Expected hub demand over the rolling window.
    pub fn rolling_demand(&self, class: ServiceClass) -> f64 {
        self.hub_rate(class) * f64::from(self.rolling_hours)
    }

    /// Stock level under which the hub should reorder.
    pub fn reorder_threshold(&self, class: ServiceClass) -> f64 {
        self.safety_multiple * self.rolling_demand(class)
    }

    /// Upper bound for one purchase variable: `multiple × total demand`, at least 1.
    pub fn purchase_bound(&self, class: ServiceClass, multiple: f64) -> f64 {
        (multiple * self.total[class] as f64).ceil().max(1.0)
    }
}
