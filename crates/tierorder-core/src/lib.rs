//! # tierorder-core
//!
//! **How many comparisons does it take to order two tiered collections?**
//!
//! Two disjoint collections of scalar values (attackers and defenders) are
//! described by tier distributions: `count` entities share each `value`. An
//! adaptive strategy compares attacker/defender pairs one at a time and skips
//! every pair whose order already follows transitively from earlier results.
//! This crate estimates how many comparisons that strategy needs.
//!
//! ## Quick Start
//!
//! ```
//! use tierorder_core::{Distribution, MonteCarlo, MonteCarloConfig, Scenario};
//!
//! let attackers: Distribution = "0:5,31:8,61:10".parse().unwrap();
//! let defenders: Distribution = "30:15,60:20,90:20".parse().unwrap();
//! let scenario = Scenario::pair(attackers, defenders);
//!
//! let config = MonteCarloConfig { trials: 20, seed: Some(7), ..Default::default() };
//! let estimate = MonteCarlo::new(scenario, config).unwrap().run();
//! assert!(estimate.mean() < estimate.naive as f64);
//! ```
//!
//! ## Architecture
//!
//! Tiers → Realizer → Relation store ⇄ Scheduler → comparison count → Monte Carlo
//!
//! Two engines:
//! - **Monte Carlo** ([`MonteCarlo`]): realize concrete values, run the
//!   adaptive schedule against a fresh [`RelationMatrix`], repeat.
//! - **Exact** ([`ExactCalculator`]): enumerate every weighted ordering of a
//!   small tier list and compute the expectation per defender-value bucket.
//!
//! Nothing here does I/O; summary statistics live in `tierorder-stats`.

pub mod error;
pub mod estimator;
pub mod exact;
pub mod realize;
pub mod relation;
pub mod schedule;
pub mod tier;

pub use error::{ConfigError, Result};
pub use estimator::{Estimate, MonteCarlo, MonteCarloConfig, Scenario};
pub use exact::{
    Bucket, BucketExpectation, Direction, ExactCalculator, ExactEstimate, MAX_EXACT_TIERS,
    PermutationTable,
};
pub use realize::{NodeLayout, Realization, realize_mixed, realize_pair, weighted_order};
pub use relation::{Relation, RelationMatrix};
pub use schedule::{ClassificationScope, Comparison, Trial, TrialOutcome, compare};
pub use tier::{Distribution, Tier};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
