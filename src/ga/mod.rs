//! Genetic optimizer for kit plans.
//!
//! Searches directly over integer load and purchase quantities. Every
//! individual is repaired before scoring, so the population only ever
//! holds feasible plans; the greedy heuristic's plan is kept in every
//! generation as an anchor.
//!
//! # Submodules
//!
//! - [`operators`]: tournament selection, recombination, adaptive mutation
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Eiben & Smith (2015), "Introduction to Evolutionary Computing", ch. 8 (parameter control)

mod chromosome;
mod config;
pub mod operators;
mod optimizer;

pub use chromosome::{
    aggressive, conservative, criticality, exploratory, load_step, purchase_step,
    tiered_mutation, two_point_crossover,
};
pub use config::GaConfig;
pub use optimizer::{GaResult, GeneticOptimizer, StopReason};
