//! Selection, recombination, and adaptive mutation.
//!
//! [`GeneticOperators`] bundles the per-run operator settings taken from
//! [`GaConfig`](super::GaConfig) so the optimizer loop only asks for
//! "a parent", "two children", or "the mutation rate now".
//!
//! # Adaptive mutation
//!
//! | Condition | Effect |
//! |-----------|--------|
//! | stagnation ≥ limit / 2 | rate × 2 |
//! | generation ≥ 80% of budget | rate × 0.5 |
//!
//! The result is capped at 0.5.
//!
//! ```
//! use u_kitplan::ga::{GaConfig, operators::GeneticOperators};
//!
//! let ops = GeneticOperators::from_config(&GaConfig::default().with_mutation_rate(0.1));
//! assert!((ops.mutation_rate_at(0, 100, 0, 10) - 0.1).abs() < 1e-10);
//! assert!((ops.mutation_rate_at(0, 100, 5, 10) - 0.2).abs() < 1e-10);
//! assert!((ops.mutation_rate_at(90, 100, 0, 10) - 0.05).abs() < 1e-10);
//! ```

use rand::{Rng, RngExt};
use u_metaheur::ga::Selection;

use super::GaConfig;
use super::chromosome::{tiered_mutation, two_point_crossover};
use crate::models::Decision;

/// Upper bound on the adaptive mutation rate.
pub const MAX_MUTATION_RATE: f64 = 0.5;

/// Operator settings for one GA run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticOperators {
    /// Parent selection scheme.
    pub selection: Selection,
    /// Probability of recombining two parents.
    pub crossover_rate: f64,
    /// Base per-gene mutation probability.
    pub mutation_rate: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self::from_config(&GaConfig::default())
    }
}

impl GeneticOperators {
    /// Takes operator settings from a GA configuration.
    pub fn from_config(config: &GaConfig) -> Self {
        Self {
            selection: Selection::Tournament(config.tournament_size.max(1)),
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
        }
    }

    /// Picks one parent.
    ///
    /// `population` must not be empty.
    pub fn select<'a, R: Rng>(&self, population: &'a [Decision], rng: &mut R) -> &'a Decision {
        &population[self.selection.select(population, rng)]
    }

    /// Two children: recombined with probability `crossover_rate`, else copies.
    pub fn recombine<R: Rng>(
        &self,
        p1: &Decision,
        p2: &Decision,
        rng: &mut R,
    ) -> (Decision, Decision) {
        if rng.random_bool(self.crossover_rate.clamp(0.0, 1.0)) {
            two_point_crossover(p1, p2, rng)
        } else {
            let mut c1 = p1.clone();
            let mut c2 = p2.clone();
            c1.invalidate();
            c2.invalidate();
            (c1, c2)
        }
    }

    /// Mutation rate adjusted for search progress.
    pub fn mutation_rate_at(
        &self,
        generation: usize,
        max_generations: usize,
        stagnation: usize,
        stagnation_limit: usize,
    ) -> f64 {
        let mut rate = self.mutation_rate;
        if stagnation_limit > 0 && stagnation * 2 >= stagnation_limit {
            rate *= 2.0;
        }
        if max_generations > 0 && generation * 5 >= max_generations * 4 {
            rate *= 0.5;
        }
        rate.min(MAX_MUTATION_RATE)
    }

    /// Applies tiered mutation at `rate`.
    pub fn mutate<R: Rng>(&self, decision: &mut Decision, rate: f64, rng: &mut R) {
        tiered_mutation(decision, rate, rng);
    }
}
