//! GA configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Genetic optimizer parameters.
///
/// # Example
/// ```
/// use u_kitplan::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(30)
///     .with_max_generations(50)
///     .with_seed(42)
///     .with_parallel(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation budget.
    pub max_generations: usize,
    /// Individuals sampled per tournament.
    pub tournament_size: usize,
    /// Probability that two parents are recombined.
    pub crossover_rate: f64,
    /// Base per-gene mutation probability (scaled by class criticality).
    pub mutation_rate: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Generations without improvement before stopping.
    pub stagnation_limit: usize,
    /// Over-provisioning of the aggressive construction heuristic (0.1 = +10%).
    pub aggressive_buffer: f64,
    /// ±1 hill-climbing passes on the best individual (0 disables).
    pub local_search_passes: usize,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Score offspring on the rayon pool.
    pub parallel: bool,
    /// Wall-clock cap for one run.
    pub time_budget: Option<Duration>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            max_generations: 80,
            tournament_size: 3,
            crossover_rate: 0.85,
            mutation_rate: 0.05,
            elite_count: 2,
            stagnation_limit: 15,
            aggressive_buffer: 0.10,
            local_search_passes: 2,
            seed: None,
            parallel: true,
            time_budget: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the base mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the aggressive construction buffer.
    pub fn with_aggressive_buffer(mut self, buffer: f64) -> Self {
        self.aggressive_buffer = buffer;
        self
    }

    /// Sets the number of local-search passes.
    pub fn with_local_search_passes(mut self, passes: usize) -> Self {
        self.local_search_passes = passes;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the wall-clock cap.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Checks ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::NonPositive {
                name: "population_size",
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::NonPositive {
                name: "tournament_size",
            });
        }
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        if self.aggressive_buffer < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "aggressive_buffer",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_probability() {
        let c = GaConfig::default().with_crossover_rate(1.5);
        assert_eq!(
            c.validate(),
            Err(ConfigError::Probability {
                name: "crossover_rate",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_zero_population() {
        let c = GaConfig::default().with_population_size(0);
        assert!(c.validate().is_err());
    }
}
