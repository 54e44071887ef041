//! Monte Carlo estimator: many independent trials, one comparison count each.
//!
//! Every trial owns its realization and relation store and gets its own
//! `ChaCha8Rng` seeded from `base_seed + trial_index`, so a seeded run gives
//! the same counts whether trials execute serially or on the rayon pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::realize::{Realization, realize_mixed, realize_pair};
use crate::schedule::{Trial, TrialOutcome};
use crate::tier::Distribution;

/// The two randomized shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Scenario {
    /// Attackers against defenders.
    Pair {
        attackers: Distribution,
        defenders: Distribution,
    },
    /// Every attacker under every poise tier against defenders.
    Mixed {
        poise: Distribution,
        attackers: Distribution,
        defenders: Distribution,
    },
}

impl Scenario {
    pub fn pair(attackers: Distribution, defenders: Distribution) -> Self {
        Scenario::Pair {
            attackers,
            defenders,
        }
    }

    pub fn mixed(poise: Distribution, attackers: Distribution, defenders: Distribution) -> Self {
        Scenario::Mixed {
            poise,
            attackers,
            defenders,
        }
    }

    /// Comparisons needed with no closure-based skipping.
    pub fn naive_complexity(&self) -> usize {
        match self {
            Scenario::Pair {
                attackers,
                defenders,
            } => attackers.total() * defenders.total(),
            Scenario::Mixed {
                poise,
                attackers,
                defenders,
            } => poise.len() * attackers.total() * defenders.total(),
        }
    }

    /// Draw a fresh realization for one trial.
    pub fn realize<R: Rng + ?Sized>(&self, rng: &mut R) -> Realization {
        match self {
            Scenario::Pair {
                attackers,
                defenders,
            } => realize_pair(attackers, defenders, rng),
            Scenario::Mixed {
                poise,
                attackers,
                defenders,
            } => realize_mixed(poise, attackers, defenders, rng),
        }
    }

    /// Realize and schedule one complete trial.
    pub fn run_trial<R: Rng + ?Sized>(&self, rng: &mut R) -> TrialOutcome {
        let mut trial = Trial::new(self.realize(rng));
        trial.run(rng)
    }
}

/// How a batch of trials is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub trials: usize,
    /// Base seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Spread trials across the rayon thread pool.
    pub parallel: bool,
    /// Log progress every this many completed trials (0 disables).
    pub progress_every: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 2000,
            seed: None,
            parallel: false,
            progress_every: 100,
        }
    }
}

/// Raw results of a batch, ready for the statistics reducer.
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    /// Comparisons per trial, in trial order.
    pub counts: Vec<usize>,
    /// Total tie comparisons across all trials.
    pub ties: usize,
    pub naive: usize,
    /// Base seed actually used.
    pub seed: u64,
    pub elapsed: Duration,
}

impl Estimate {
    pub fn mean(&self) -> f64 {
        self.counts.iter().sum::<usize>() as f64 / self.counts.len() as f64
    }
}

/// Runs a scenario many times.
#[derive(Debug, Clone)]
pub struct MonteCarlo {
    scenario: Scenario,
    config: MonteCarloConfig,
}

impl MonteCarlo {
    /// Validate the configuration before any trial runs.
    pub fn new(scenario: Scenario, config: MonteCarloConfig) -> Result<Self> {
        if config.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        Ok(Self { scenario, config })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Run trial `index` of a batch seeded with `base_seed`.
    pub fn run_seeded_trial(&self, base_seed: u64, index: usize) -> TrialOutcome {
        let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(index as u64));
        self.scenario.run_trial(&mut rng)
    }

    pub fn run(&self) -> Estimate {
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let trials = self.config.trials;
        let naive = self.scenario.naive_complexity();
        log::info!(
            "running {trials} trials (naive complexity {naive}, seed {seed}, {})",
            if self.config.parallel { "parallel" } else { "serial" }
        );

        let t0 = Instant::now();
        let completed = AtomicUsize::new(0);
        let one = |index: usize| {
            let outcome = self.run_seeded_trial(seed, index);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if self.config.progress_every > 0 && done % self.config.progress_every == 0 {
                log::info!(
                    "completed {done}/{trials} trials (elapsed {:.1}s)",
                    t0.elapsed().as_secs_f64()
                );
            }
            outcome
        };
        let outcomes: Vec<TrialOutcome> = if self.config.parallel {
            (0..trials).into_par_iter().map(one).collect()
        } else {
            (0..trials).map(one).collect()
        };

        let ties: usize = outcomes.iter().map(|o| o.ties).sum();
        if ties > 0 {
            log::debug!("{ties} comparisons across the batch were exact ties");
        }
        let estimate = Estimate {
            counts: outcomes.iter().map(|o| o.comparisons).collect(),
            ties,
            naive,
            seed,
            elapsed: t0.elapsed(),
        };
        log::info!(
            "finished {trials} trials in {:.1}s, mean {:.3}",
            estimate.elapsed.as_secs_f64(),
            estimate.mean()
        );
        estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pair() -> Scenario {
        Scenario::pair(
            Distribution::from_pairs(&[(0.0, 3), (31.0, 4), (61.0, 5)]).unwrap(),
            Distribution::from_pairs(&[(30.0, 6), (60.0, 8), (90.0, 2)]).unwrap(),
        )
    }

    #[test]
    fn test_zero_trials_rejected() {
        let config = MonteCarloConfig {
            trials: 0,
            ..MonteCarloConfig::default()
        };
        assert_eq!(
            MonteCarlo::new(small_pair(), config).unwrap_err(),
            ConfigError::ZeroTrials
        );
    }

    #[test]
    fn test_naive_complexity() {
        assert_eq!(small_pair().naive_complexity(), 12 * 16);
        let mixed = Scenario::mixed(
            Distribution::from_pairs(&[(0.0, 6), (10.0, 7)]).unwrap(),
            Distribution::from_pairs(&[(20.0, 3)]).unwrap(),
            Distribution::from_pairs(&[(30.0, 5)]).unwrap(),
        );
        assert_eq!(mixed.naive_complexity(), 2 * 3 * 5);
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let base = MonteCarloConfig {
            trials: 40,
            seed: Some(1234),
            parallel: false,
            progress_every: 0,
        };
        let serial = MonteCarlo::new(small_pair(), base).unwrap().run();
        let parallel = MonteCarlo::new(
            small_pair(),
            MonteCarloConfig {
                parallel: true,
                ..base
            },
        )
        .unwrap()
        .run();
        assert_eq!(serial.counts, parallel.counts);
        assert_eq!(serial.seed, 1234);
        assert_eq!(serial.counts.len(), 40);
    }

    #[test]
    fn test_counts_bounded_by_naive() {
        let config = MonteCarloConfig {
            trials: 25,
            seed: Some(8),
            ..MonteCarloConfig::default()
        };
        let estimate = MonteCarlo::new(small_pair(), config).unwrap().run();
        assert!(estimate.counts.iter().all(|&c| c <= estimate.naive));
        assert!(estimate.mean() < estimate.naive as f64);
    }
}
