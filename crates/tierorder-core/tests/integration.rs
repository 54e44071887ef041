//! Integration tests for tierorder-core.
//!
//! These tests drive the full pipeline:
//! tiers → realization → relation store + scheduler → estimate, plus the
//! exact engine on the same inputs.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tierorder_core::{
    Distribution, ExactCalculator, MonteCarlo, MonteCarloConfig, PermutationTable,
    RelationMatrix, Scenario, Tier, Trial,
};

fn dist(pairs: &[(f64, u32)]) -> Distribution {
    Distribution::from_pairs(pairs).unwrap()
}

fn hyperarmours() -> Distribution {
    dist(&[(0.0, 50), (31.0, 80), (61.0, 100), (91.0, 60), (121.0, 10)])
}

fn damages() -> Distribution {
    dist(&[(30.0, 150), (60.0, 200), (90.0, 200), (120.0, 50)])
}

fn config(trials: usize, seed: u64) -> MonteCarloConfig {
    MonteCarloConfig {
        trials,
        seed: Some(seed),
        parallel: false,
        progress_every: 0,
    }
}

// ---------------------------------------------------------------------------
// Worked two-by-two example
// ---------------------------------------------------------------------------

#[test]
fn two_by_two_needs_every_comparison() {
    let scenario = Scenario::pair(dist(&[(10.0, 1), (20.0, 1)]), dist(&[(5.0, 1), (25.0, 1)]));
    for seed in 0..5 {
        let estimate = MonteCarlo::new(scenario.clone(), config(50, seed)).unwrap().run();
        assert!(estimate.counts.iter().all(|&c| c == 4));
        assert_eq!(estimate.mean(), 4.0);
        assert_eq!(estimate.naive, 4);
    }
}

#[test]
fn two_by_two_exact() {
    let calc = ExactCalculator::new(&dist(&[(10.0, 1), (20.0, 1)])).unwrap();
    let estimate = calc.expected_comparisons(&dist(&[(5.0, 1), (25.0, 1)]));
    assert_eq!(estimate.expected, 3.0);
    assert_eq!(estimate.naive, 4);
}

// ---------------------------------------------------------------------------
// Operational distributions
// ---------------------------------------------------------------------------

#[test]
fn pair_trials_beat_naive() {
    let scenario = Scenario::pair(hyperarmours(), damages());
    let estimate = MonteCarlo::new(scenario, config(3, 99)).unwrap().run();
    assert_eq!(estimate.naive, 300 * 600);
    assert!(estimate.counts.iter().all(|&c| c < estimate.naive));
}

#[test]
fn mixed_trials_beat_naive() {
    let scenario = Scenario::mixed(
        dist(&[(0.0, 6), (10.0, 7), (20.0, 10), (30.0, 13)]),
        dist(&[(20.0, 5), (30.0, 10), (40.0, 12), (50.0, 20)]),
        dist(&[(30.0, 40), (60.0, 50), (90.0, 50), (120.0, 10)]),
    );
    let estimate = MonteCarlo::new(scenario, config(3, 5)).unwrap().run();
    assert_eq!(estimate.naive, 4 * 47 * 150);
    assert!(estimate.counts.iter().all(|&c| c < estimate.naive));
    // 30 vs 30 style ties occur with a zero-poise tier
    assert!(estimate.ties > 0);
}

#[test]
fn exact_poise_beats_naive() {
    let poise = dist(&[(31.0, 7), (46.0, 6), (61.0, 12), (76.0, 9), (91.0, 5), (106.0, 3)]);
    let estimate = ExactCalculator::new(&poise)
        .unwrap()
        .expected_comparisons(&damages());
    assert_eq!(estimate.naive, 6 * 600);
    assert!(estimate.expected < estimate.naive as f64);
    assert!(estimate.expected >= 600.0);
    let mass: f64 = estimate.buckets.iter().map(|b| b.mass).sum();
    assert!((mass - 1.0).abs() < 1e-12);
}

#[test]
fn exact_calculator_reused_across_queries() {
    let calc = ExactCalculator::new(&dist(&[(31.0, 80), (61.0, 100), (91.0, 60), (121.0, 10)])).unwrap();
    let a = calc.expected_comparisons(&damages());
    let b = calc.expected_comparisons(&dist(&[(10.0, 5)]));
    assert!(a.reduction() < 1.0);
    // every defender sits below the lowest tier
    assert!((b.expected - 5.0 * calc.expected_extremal_tests(tierorder_core::Direction::Below)).abs() < 1e-9);
}

#[test]
fn seeded_runs_are_reproducible() {
    let scenario = Scenario::pair(dist(&[(0.0, 4), (31.0, 6), (61.0, 3)]), dist(&[(30.0, 10), (60.0, 8)]));
    let a = MonteCarlo::new(scenario.clone(), config(30, 2024)).unwrap().run();
    let b = MonteCarlo::new(scenario, config(30, 2024)).unwrap().run();
    assert_eq!(a.counts, b.counts);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn tiers_strategy(max_tiers: usize, max_count: u32) -> impl Strategy<Value = Distribution> {
    prop::collection::vec((0u32..12, 1..=max_count), 1..=max_tiers).prop_map(|raw| {
        Distribution::new(
            raw.into_iter()
                .map(|(v, c)| Tier::new(f64::from(v) * 10.0, c))
                .collect(),
        )
        .unwrap()
    })
}

fn distinct_tiers_strategy(max_tiers: usize) -> impl Strategy<Value = Distribution> {
    prop::collection::btree_map(0u32..40, 1u32..20, 1..=max_tiers).prop_map(|raw| {
        Distribution::new(
            raw.into_iter()
                .map(|(v, c)| Tier::new(f64::from(v), c))
                .collect(),
        )
        .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Random consistent facts keep the matrix closed and strict.
    #[test]
    fn prop_record_keeps_closure(
        keys in prop::collection::vec(0u32..1000, 2..24),
        picks in prop::collection::vec((0usize..24, 0usize..24), 0..60),
    ) {
        let n = keys.len();
        let mut m = RelationMatrix::new(n);
        for (a, b) in picks {
            let (a, b) = (a % n, b % n);
            let (ka, kb) = ((keys[a], a), (keys[b], b));
            if ka < kb {
                m.record(a, b);
            } else if kb < ka {
                m.record(b, a);
            }
        }
        prop_assert!(m.is_transitively_closed());
        prop_assert!(m.is_strict());
    }

    /// Every trial ends fully classified, sound, and within the naive bound.
    #[test]
    fn prop_pair_trial_postconditions(
        attackers in tiers_strategy(4, 6),
        defenders in tiers_strategy(4, 6),
        seed in any::<u64>(),
    ) {
        let scenario = Scenario::pair(attackers, defenders);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let realization = scenario.realize(&mut rng);
        let layout = realization.layout;
        let mut trial = Trial::new(realization);
        let outcome = trial.run(&mut rng);

        prop_assert!(trial.is_fully_classified());
        prop_assert!(outcome.comparisons <= scenario.naive_complexity());
        prop_assert!(trial.relations().is_strict());
        prop_assert!(trial.relations().is_transitively_closed());

        // recorded order agrees with the attacker-first tie-break
        let values = &trial.realization().values;
        for a in layout.attacker_range() {
            for d in layout.defender_range() {
                let attacker_first = values[a] <= values[d];
                prop_assert_eq!(trial.relations().less(a, d), attacker_first);
            }
        }
    }

    #[test]
    fn prop_mixed_trial_postconditions(
        poise in distinct_tiers_strategy(3),
        attackers in tiers_strategy(3, 4),
        defenders in tiers_strategy(3, 5),
        seed in any::<u64>(),
    ) {
        let scenario = Scenario::mixed(poise, attackers, defenders);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut trial = Trial::new(scenario.realize(&mut rng));
        let outcome = trial.run(&mut rng);
        prop_assert!(trial.is_fully_classified());
        prop_assert!(outcome.comparisons <= scenario.naive_complexity());
        prop_assert!(trial.relations().is_strict());
    }

    #[test]
    fn prop_permutation_probabilities_sum_to_one(tiers in distinct_tiers_strategy(6)) {
        let table = PermutationTable::new(&tiers).unwrap();
        let sum: f64 = table.iter().map(|(_, p)| p).sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
    }

    /// With three or more tiers every bucket has an ordering that stops
    /// before testing every tier.
    #[test]
    fn prop_exact_never_exceeds_naive(
        tiers in distinct_tiers_strategy(5),
        defenders in tiers_strategy(4, 10),
    ) {
        let estimate = ExactCalculator::new(&tiers).unwrap().expected_comparisons(&defenders);
        prop_assert!(estimate.expected <= estimate.naive as f64 + 1e-9);
        if tiers.len() > 2 {
            prop_assert!(estimate.expected < estimate.naive as f64);
        }
    }
}
