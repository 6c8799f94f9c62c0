//! Generational GA over kit plans.
//!
//! # Loop
//!
//! 1. Seed the population with the greedy anchor plus conservative,
//!    aggressive, and exploratory constructions; repair and score all.
//! 2. Each generation keeps the `elite_count` best and re-inserts the
//!    anchor, then fills the rest with tournament-selected, recombined,
//!    mutated, repaired offspring.
//! 3. Stop on the generation budget, on `stagnation_limit` generations
//!    without improvement, or when the deadline passes.
//! 4. Polish the best individual with ±1 hill climbing.
//!
//! The anchor is always present, so the result is never worse than the
//! greedy heuristic. Offspring scoring is pure and may run on the rayon
//! pool; all randomness stays on the loop thread, so a seeded run gives
//! the same answer with or without `parallel`.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use tracing::{debug, trace};

use super::GaConfig;
use super::chromosome::{aggressive, conservative, exploratory};
use super::operators::GeneticOperators;
use crate::error::ConfigError;
use crate::heuristic::{DemandForecast, greedy_decision};
use crate::models::{Decision, ServiceClass};
use crate::planner::{KitPlanner, TickContext};
use crate::problem::PlanningProblem;
use crate::timeline::CostBreakdown;

/// Improvements smaller than this do not reset stagnation.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Why a GA run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Generation budget used up.
    MaxGenerations,
    /// No improvement for `stagnation_limit` generations.
    Stagnation,
    /// Deadline reached.
    TimeBudget,
    /// Nothing to optimise.
    Empty,
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Best repaired decision found.
    pub best: Decision,
    /// Cost breakdown of `best`.
    pub cost: CostBreakdown,
    /// Generations completed.
    pub generations: usize,
    /// Decisions repaired and scored.
    pub evaluations: usize,
    /// Best cost after initialisation and after each generation.
    pub history: Vec<f64>,
    /// Why the run ended.
    pub stop_reason: StopReason,
}

/// Genetic optimizer strategy.
#[derive(Debug, Clone)]
pub struct GeneticOptimizer {
    config: GaConfig,
    operators: GeneticOperators,
}

impl GeneticOptimizer {
    /// Creates an optimizer after checking `config`.
    pub fn new(config: GaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let operators = GeneticOperators::from_config(&config);
        Ok(Self { config, operators })
    }

    /// The active configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the GA on one tick's problem.
    #[tracing::instrument(
        level = "debug",
        skip(self, problem, demand),
        fields(flights = problem.flight_count())
    )]
    pub fn run(
        &self,
        problem: &PlanningProblem,
        demand: &DemandForecast,
        deadline: Option<Instant>,
    ) -> GaResult {
        if problem.is_empty() {
            let mut best = problem.empty_decision();
            let cost = problem.evaluate(&best);
            best.fitness = cost.total();
            return GaResult {
                best,
                cost,
                generations: 0,
                evaluations: 0,
                history: Vec::new(),
                stop_reason: StopReason::Empty,
            };
        }

        let own = self
            .config
            .time_budget
            .and_then(|budget| Instant::now().checked_add(budget));
        let deadline = match (deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let expired = || deadline.is_some_and(|d| Instant::now() >= d);

        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => rand::make_rng(),
        };

        let anchor = greedy_decision(problem, demand);
        let mut population = self.initial_population(problem, &anchor, &mut rng);
        let mut evaluations = population.len();
        sort_by_fitness(&mut population);

        let mut best = population[0].clone();
        let mut history = vec![best.fitness];
        let mut generation = 0;
        let mut stagnation = 0;
        let size = self.config.population_size;

        let stop_reason = loop {
            if generation >= self.config.max_generations {
                break StopReason::MaxGenerations;
            }
            if self.config.stagnation_limit > 0 && stagnation >= self.config.stagnation_limit {
                break StopReason::Stagnation;
            }
            if expired() {
                break StopReason::TimeBudget;
            }

            let rate = self.operators.mutation_rate_at(
                generation,
                self.config.max_generations,
                stagnation,
                self.config.stagnation_limit,
            );

            let mut next: Vec<Decision> = population
                .iter()
                .take(self.config.elite_count)
                .cloned()
                .collect();
            next.push(anchor.clone());

            let mut offspring = Vec::with_capacity(size.saturating_sub(next.len()));
            while next.len() + offspring.len() < size {
                let p1 = self.operators.select(&population, &mut rng);
                let p2 = self.operators.select(&population, &mut rng);
                let (mut c1, mut c2) = self.operators.recombine(p1, p2, &mut rng);
                self.operators.mutate(&mut c1, rate, &mut rng);
                offspring.push(c1);
                if next.len() + offspring.len() < size {
                    self.operators.mutate(&mut c2, rate, &mut rng);
                    offspring.push(c2);
                }
            }
            score_all(problem, &mut offspring, self.config.parallel);
            evaluations += offspring.len();

            next.extend(offspring);
            sort_by_fitness(&mut next);
            next.truncate(size.max(1));
            population = next;
            generation += 1;

            if population[0].fitness < best.fitness - IMPROVEMENT_EPSILON {
                best = population[0].clone();
                stagnation = 0;
            } else {
                stagnation += 1;
            }
            history.push(best.fitness);
            debug!(generation, best = best.fitness, stagnation, rate, "generation done");
        };

        if self.config.local_search_passes > 0 && !expired() {
            let (polished, used) =
                local_search(problem, best, self.config.local_search_passes, deadline);
            best = polished;
            evaluations += used;
        }

        let cost = problem.evaluate(&best);
        debug!(
            generations = generation,
            evaluations,
            cost = cost.total(),
            ?stop_reason,
            "GA finished"
        );

        GaResult {
            best,
            cost,
            generations: generation,
            evaluations,
            history,
            stop_reason,
        }
    }

    fn initial_population(
        &self,
        problem: &PlanningProblem,
        anchor: &Decision,
        rng: &mut SmallRng,
    ) -> Vec<Decision> {
        let size = self.config.population_size.max(1);
        let mut population = Vec::with_capacity(size);
        population.push(anchor.clone());
        for i in 0..size - 1 {
            let individual = match i % 3 {
                0 => conservative(problem),
                1 => aggressive(problem, &anchor.purchases, self.config.aggressive_buffer),
                _ => exploratory(problem, &anchor.purchases, rng),
            };
            population.push(individual);
        }
        score_all(problem, &mut population[1..], self.config.parallel);
        population
    }
}

impl KitPlanner for GeneticOptimizer {
    fn plan(&self, ctx: &TickContext) -> Decision {
        self.run(&ctx.problem, &ctx.demand, ctx.deadline).best
    }
}

fn sort_by_fitness(population: &mut [Decision]) {
    population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
}

fn score_all(problem: &PlanningProblem, individuals: &mut [Decision], parallel: bool) {
    if parallel {
        individuals.par_iter_mut().for_each(|d| {
            problem.repair_and_score(d);
        });
    } else {
        for d in individuals.iter_mut() {
            problem.repair_and_score(d);
        }
    }
}

/// ±1 hill climbing over every gene; accepts strict improvements only.
///
/// Returns the polished decision and the number of candidates scored.
pub(crate) fn local_search(
    problem: &PlanningProblem,
    mut best: Decision,
    passes: usize,
    deadline: Option<Instant>,
) -> (Decision, usize) {
    let mut evaluations = 0;
    let load_genes = best.gene_count();
    let genes = load_genes + ServiceClass::COUNT;

    'passes: for pass in 0..passes {
        let mut improved = false;
        for gene in 0..genes {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break 'passes;
            }
            let current = if gene < load_genes {
                best.gene(gene)
            } else {
                best.purchases[ServiceClass::ALL[gene - load_genes]]
            };
            for delta in [1i64, -1] {
                let value = i64::from(current) + delta;
                if value < 0 || value > i64::from(u32::MAX) {
                    continue;
                }
                let mut candidate = best.clone();
                if gene < load_genes {
                    candidate.set_gene(gene, value as u32);
                } else {
                    candidate.purchases[ServiceClass::ALL[gene - load_genes]] = value as u32;
                }
                let cost = problem.repair_and_score(&mut candidate);
                evaluations += 1;
                if cost < best.fitness - IMPROVEMENT_EPSILON {
                    trace!(pass, gene, delta, cost, "local search step");
                    best = candidate;
                    improved = true;
                    break;
                }
            }
        }
        if !improved {
            break;
        }
    }

    (best, evaluations)
}
