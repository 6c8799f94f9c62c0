//! Integer-vector encoding for kit plans.
//!
//! # Encoding
//!
//! A [`Decision`] is the chromosome: one gene per (flight slot, class)
//! load, flattened as `slot * 4 + class.index()`, plus one purchase gene
//! per class. Fitness is the total timeline cost (lower is better).
//!
//! # Initial population
//!
//! | Heuristic | Loads | Purchases |
//! |-----------|-------|-----------|
//! | Conservative | passengers | none |
//! | Aggressive | passengers × (1 + buffer) | anchor × (1 + buffer) |
//! | Exploratory | passengers × U[1.0, 1.1] | anchor × U[0, 1.5] |
//!
//! Every constructed individual is repaired before it is scored.

use rand::{Rng, RngExt};
use u_metaheur::ga::Individual;

use crate::models::{ClassMap, Decision, ServiceClass};
use crate::problem::PlanningProblem;

/// Products within this distance of an integer are not rounded up.
const CEIL_TOLERANCE: f64 = 1e-9;

impl Individual for Decision {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

fn scaled(value: u32, factor: f64) -> u32 {
    (f64::from(value) * factor - CEIL_TOLERANCE)
        .ceil()
        .clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Loads exactly the passenger demand; buys nothing.
pub fn conservative(problem: &PlanningProblem) -> Decision {
    Decision::new(
        problem.flights.iter().map(|f| f.passengers).collect(),
        ClassMap::default(),
    )
}

/// Over-provisions loads and the anchor's purchases by `buffer`.
pub fn aggressive(problem: &PlanningProblem, anchor: &ClassMap<u32>, buffer: f64) -> Decision {
    let factor = 1.0 + buffer.max(0.0);
    Decision::new(
        problem
            .flights
            .iter()
            .map(|f| f.passengers.map(|_, &pax| scaled(pax, factor)))
            .collect(),
        anchor.map(|_, &qty| scaled(qty, factor)),
    )
}

/// Randomly perturbed demand loads and anchor purchases.
pub fn exploratory<R: Rng>(
    problem: &PlanningProblem,
    anchor: &ClassMap<u32>,
    rng: &mut R,
) -> Decision {
    let loads = problem
        .flights
        .iter()
        .map(|f| {
            f.passengers
                .map(|_, &pax| (f64::from(pax) * rng.random_range(1.0..=1.1)).round() as u32)
        })
        .collect();
    let purchases =
        anchor.map(|_, &qty| (f64::from(qty) * rng.random_range(0.0..=1.5)).round() as u32);
    Decision::new(loads, purchases)
}

// ======================== Crossover ========================

/// Two-point crossover on the flattened load genes, blend on purchases.
///
/// Purchases are recombined per class: copy parent A, copy parent B, or a
/// random weighted average, each with equal probability.
pub fn two_point_crossover<R: Rng>(
    p1: &Decision,
    p2: &Decision,
    rng: &mut R,
) -> (Decision, Decision) {
    let mut c1 = p1.clone();
    let mut c2 = p2.clone();
    c1.invalidate();
    c2.invalidate();

    let genes = p1.gene_count().min(p2.gene_count());
    if genes >= 2 {
        let mut a = rng.random_range(0..=genes);
        let mut b = rng.random_range(0..=genes);
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        for gene in a..b {
            c1.set_gene(gene, p2.gene(gene));
            c2.set_gene(gene, p1.gene(gene));
        }
    }

    for class in ServiceClass::ALL {
        let (x, y) = (p1.purchases[class], p2.purchases[class]);
        let (first, second) = match rng.random_range(0..3) {
            0 => (x, y),
            1 => (y, x),
            _ => {
                let w: f64 = rng.random();
                let blend = |a: u32, b: u32, w: f64| {
                    (w * f64::from(a) + (1.0 - w) * f64::from(b)).round() as u32
                };
                (blend(x, y, w), blend(y, x, w))
            }
        };
        c1.purchases[class] = first;
        c2.purchases[class] = second;
    }

    (c1, c2)
}

// ======================== Mutation ========================

/// Mutation weight per class: scarcer, costlier kits are explored harder.
pub fn criticality(class: ServiceClass) -> f64 {
    match class {
        ServiceClass::First => 1.5,
        ServiceClass::Business => 1.3,
        ServiceClass::PremiumEconomy => 1.1,
        ServiceClass::Economy => 1.0,
    }
}

fn signed<R: Rng>(magnitude: u32, rng: &mut R) -> i64 {
    if rng.random_bool(0.5) {
        i64::from(magnitude)
    } else {
        -i64::from(magnitude)
    }
}

/// Tiered step for a load gene: 60% ±1, 30% ±2..5, 10% ±10..15.
pub fn load_step<R: Rng>(rng: &mut R) -> i64 {
    let tier: f64 = rng.random();
    let magnitude = if tier < 0.6 {
        1
    } else if tier < 0.9 {
        rng.random_range(2..=5)
    } else {
        rng.random_range(10..=15)
    };
    signed(magnitude, rng)
}

/// Tiered step for a purchase gene: 60% ±1..5, 30% ±6..20, 10% ±25..50.
pub fn purchase_step<R: Rng>(rng: &mut R) -> i64 {
    let tier: f64 = rng.random();
    let magnitude = if tier < 0.6 {
        rng.random_range(1..=5)
    } else if tier < 0.9 {
        rng.random_range(6..=20)
    } else {
        rng.random_range(25..=50)
    };
    signed(magnitude, rng)
}

fn shifted(value: u32, step: i64) -> u32 {
    (i64::from(value) + step).clamp(0, i64::from(u32::MAX)) as u32
}

/// Mutates each gene with probability `rate × criticality(class)`.
///
/// Values never go below zero; upper bounds are left to repair.
pub fn tiered_mutation<R: Rng>(decision: &mut Decision, rate: f64, rng: &mut R) {
    for loads in decision.loads.iter_mut() {
        for class in ServiceClass::ALL {
            let p = (rate * criticality(class)).clamp(0.0, 1.0);
            if rng.random_bool(p) {
                loads[class] = shifted(loads[class], load_step(rng));
            }
        }
    }
    for class in ServiceClass::ALL {
        let p = (rate * criticality(class)).clamp(0.0, 1.0);
        if rng.random_bool(p) {
            decision.purchases[class] = shifted(decision.purchases[class], purchase_step(rng));
        }
    }
    decision.invalidate();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceClass::*;
    use crate::testutil::single_flight_problem;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn parents() -> (Decision, Decision) {
        let a = Decision::new(vec![ClassMap::splat(1); 3], ClassMap::splat(10));
        let b = Decision::new(vec![ClassMap::splat(2); 3], ClassMap::splat(20));
        (a, b)
    }

    #[test]
    fn test_conservative_matches_demand() {
        let p = single_flight_problem(200, 100, 150);
        let d = conservative(&p);
        assert_eq!(d.loads[0][Economy], 100);
        assert!(d.purchases.is_zero());
    }

    #[test]
    fn test_aggressive_buffer() {
        let p = single_flight_problem(200, 100, 150);
        let d = aggressive(&p, &ClassMap::splat(0).with(Economy, 40), 0.1);
        assert_eq!(d.loads[0][Economy], 110);
        assert_eq!(d.purchases[Economy], 44);
    }

    #[test]
    fn test_aggressive_buffer_exact_products() {
        // 100 × 1.1 and 40 × 1.1 land just above an integer in binary floating point.
        assert_eq!(scaled(100, 1.1), 110);
        assert_eq!(scaled(40, 1.1), 44);
        assert_eq!(scaled(101, 1.1), 112);
        assert_eq!(scaled(0, 1.1), 0);
    }

    #[test]
    fn test_decision_fitness_through_individual() {
        let mut d = Decision::empty(2);
        assert_eq!(Individual::fitness(&d), f64::INFINITY);
        d.set_fitness(12.5);
        assert_eq!(d.fitness, 12.5);
    }

    #[test]
    fn test_exploratory_range() {
        let p = single_flight_problem(200, 100, 150);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let d = exploratory(&p, &ClassMap::splat(10), &mut rng);
            let load = d.loads[0][Economy];
            assert!((100..=110).contains(&load));
            assert!(d.purchases[First] <= 15);
        }
    }

    #[test]
    fn test_crossover_conserves_genes() {
        let (a, b) = parents();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let (c1, c2) = two_point_crossover(&a, &b, &mut rng);
            assert_eq!(c1.gene_count(), a.gene_count());
            for gene in 0..a.gene_count() {
                // Each position holds one parent's value; children are complementary.
                assert_eq!(c1.gene(gene) + c2.gene(gene), 3);
            }
            for class in ServiceClass::ALL {
                for child in [&c1, &c2] {
                    assert!((10..=20).contains(&child.purchases[class]));
                }
            }
            assert_eq!(c1.fitness, f64::INFINITY);
        }
    }

    #[test]
    fn test_load_step_tiers() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ones = 0;
        for _ in 0..2000 {
            let step = load_step(&mut rng).abs();
            assert!(step == 1 || (2..=5).contains(&step) || (10..=15).contains(&step));
            if step == 1 {
                ones += 1;
            }
        }
        // ~60% of steps are ±1.
        assert!((1000..1400).contains(&ones), "got {ones}");
    }

    #[test]
    fn test_purchase_step_bounds() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            let step = purchase_step(&mut rng).abs();
            assert!((1..=50).contains(&step));
            assert!(!(21..25).contains(&step));
        }
    }

    #[test]
    fn test_mutation_never_negative() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut d = Decision::new(vec![ClassMap::splat(0); 4], ClassMap::splat(0));
        for _ in 0..100 {
            tiered_mutation(&mut d, 0.5, &mut rng);
        }
        assert_eq!(d.flight_count(), 4);
        assert!(d.total_loaded() > 0);
    }

    #[test]
    fn test_zero_rate_is_noop() {
        let mut rng = SmallRng::seed_from_u64(42);
        let (mut a, _) = parents();
        let before = a.clone();
        tiered_mutation(&mut a, 0.0, &mut rng);
        assert_eq!(a.loads, before.loads);
        assert_eq!(a.purchases, before.purchases);
    }
}
