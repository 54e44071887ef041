//! Exact expected comparison count for small tier lists.
//!
//! Instead of sampling, every ordering of the tiers is enumerated once and
//! given its probability under weighted sampling without replacement (weight =
//! tier count). For a defender value, tiers are tested in permutation order;
//! a tier is skipped when the bounds seen so far already decide it. The
//! defender-value domain splits into buckets (below the lowest tier, between
//! adjacent tiers, at or above the highest), and within a bucket the number of
//! tests depends only on the permutation.
//!
//! ```text
//! E[comparisons] = defenders * Σ_bucket P(bucket) * Σ_perm P(perm) * tests(perm, bucket)
//! ```
//!
//! The permutation table is factorial in the tier count, so it is built once
//! per tier list by [`ExactCalculator::new`] and reused for every query.

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::tier::Distribution;

/// Largest tier list the exact engine accepts (9! = 362 880 orderings).
pub const MAX_EXACT_TIERS: usize = 9;

// ---------------------------------------------------------------------------
// Permutation table
// ---------------------------------------------------------------------------

/// Every ordering of a tier list, stored flat, with a parallel probability
/// array addressed by the same index.
#[derive(Debug, Clone)]
pub struct PermutationTable {
    tiers: usize,
    /// `orders[p * tiers..(p + 1) * tiers]` holds the tier indices of ordering `p`.
    orders: Vec<u8>,
    probabilities: Vec<f64>,
}

impl PermutationTable {
    /// Enumerate all orderings of `dist`'s tiers and weigh each one.
    pub fn new(dist: &Distribution) -> Result<Self> {
        let tiers = dist.len();
        if tiers > MAX_EXACT_TIERS {
            return Err(ConfigError::TooManyTiers {
                tiers,
                max: MAX_EXACT_TIERS,
            });
        }
        let counts: Vec<u32> = dist.tiers().iter().map(|t| t.count).collect();

        let mut scratch: Vec<u8> = (0..tiers as u8).collect();
        let mut orders = Vec::with_capacity(factorial(tiers) * tiers);
        permute(&mut scratch, 0, &mut orders);

        let probabilities = orders
            .chunks_exact(tiers)
            .map(|order| ordering_probability(order, &counts))
            .collect();
        Ok(Self {
            tiers,
            orders,
            probabilities,
        })
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn order(&self, index: usize) -> &[u8] {
        &self.orders[index * self.tiers..(index + 1) * self.tiers]
    }

    pub fn probability(&self, index: usize) -> f64 {
        self.probabilities[index]
    }

    /// `(ordering, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], f64)> {
        self.orders
            .chunks_exact(self.tiers)
            .zip(self.probabilities.iter().copied())
    }

    /// Expected value of `tests(order)` over all orderings.
    fn expectation(&self, tests: impl Fn(&[u8]) -> usize) -> f64 {
        self.iter()
            .map(|(order, probability)| tests(order) as f64 * probability)
            .sum()
    }
}

fn factorial(n: usize) -> usize {
    (1..=n).product()
}

/// Swap-based enumeration; appends each complete ordering to `out`.
fn permute(items: &mut [u8], start: usize, out: &mut Vec<u8>) {
    if start + 1 >= items.len() {
        out.extend_from_slice(items);
        return;
    }
    for i in start..items.len() {
        items.swap(start, i);
        permute(items, start + 1, out);
        items.swap(start, i);
    }
}

/// Probability of drawing tiers in exactly `order` when each draw picks a
/// remaining tier with probability proportional to its count.
///
/// Walks positions from last to first; the denominator at position `i` is the
/// total count minus the counts of every tier placed before `i`.
pub fn ordering_probability(order: &[u8], counts: &[u32]) -> f64 {
    let total: u64 = order.iter().map(|&t| counts[t as usize] as u64).sum();
    let mut placed_before: u64 = total;
    let mut probability = 1.0;
    for i in (0..order.len()).rev() {
        let count = counts[order[i] as usize] as u64;
        placed_before -= count;
        let remaining = total - placed_before;
        assert!(
            remaining > 0,
            "empty weight pool at position {i} of {}",
            order.len()
        );
        probability *= count as f64 / remaining as f64;
    }
    probability
}

// ---------------------------------------------------------------------------
// Bound tracking
// ---------------------------------------------------------------------------

/// Which extremal bucket a scan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Defender below the lowest tier: track the lowest tier seen so far and
    /// skip anything above it.
    Below,
    /// Defender at or above the highest tier: track the highest tier seen and
    /// skip anything below it.
    Above,
}

impl Direction {
    /// True when `value` is already decided by `bound`.
    fn excludes(self, bound: f64, value: f64) -> bool {
        match self {
            Direction::Below => value > bound,
            Direction::Above => value < bound,
        }
    }
}

/// Tests performed in one ordering until the extremal tier `target` confirms
/// the answer. `values[t]` is the value of tier index `t`.
pub fn extremal_tests(order: &[u8], values: &[f64], target: u8, direction: Direction) -> usize {
    let mut bound: Option<f64> = None;
    let mut tests = 0;
    for &tier in order {
        let value = values[tier as usize];
        if bound.is_some_and(|b| direction.excludes(b, value)) {
            continue;
        }
        bound = Some(value);
        tests += 1;
        if tier == target {
            break;
        }
    }
    tests
}

/// Tests performed in one ordering until both tiers bracketing the defender,
/// `lower` and `upper`, have been tested.
///
/// The floor is the highest tier seen at or below `lower`, the ceiling the
/// lowest tier seen at or above `upper`; a tier strictly outside
/// `[floor, ceiling]` is skipped.
pub fn bracket_tests(order: &[u8], values: &[f64], lower: u8, upper: u8) -> usize {
    let low = values[lower as usize];
    let high = values[upper as usize];
    let mut floor: Option<f64> = None;
    let mut ceiling: Option<f64> = None;
    let mut lower_seen = false;
    let mut upper_seen = false;
    let mut tests = 0;

    for &tier in order {
        let value = values[tier as usize];
        if value <= low {
            if floor.is_some_and(|f| value < f) {
                continue;
            }
            floor = Some(value);
            lower_seen |= tier == lower;
        } else if value >= high {
            if ceiling.is_some_and(|c| value > c) {
                continue;
            }
            ceiling = Some(value);
            upper_seen |= tier == upper;
        }
        tests += 1;
        if lower_seen && upper_seen {
            break;
        }
    }
    tests
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Part of the defender-value domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bucket {
    /// `d < lowest`
    Below { lowest: f64 },
    /// `lower <= d < upper`
    Between { lower: f64, upper: f64 },
    /// `d >= highest`
    Above { highest: f64 },
}

impl Bucket {
    pub fn contains(&self, d: f64) -> bool {
        match *self {
            Bucket::Below { lowest } => d < lowest,
            Bucket::Between { lower, upper } => lower <= d && d < upper,
            Bucket::Above { highest } => d >= highest,
        }
    }
}

/// Conditional expectation for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketExpectation {
    pub bucket: Bucket,
    /// Fraction of defenders whose value falls in the bucket.
    pub mass: f64,
    /// Expected tier tests given a defender in the bucket.
    pub expected_tests: f64,
}

/// Result of one exact query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExactEstimate {
    /// Expected total comparisons across all defenders.
    pub expected: f64,
    /// Tiers times defenders.
    pub naive: usize,
    pub defenders: usize,
    /// Defenders whose value equals a tier value. They fall in the bucket
    /// starting at that tier (attacker-first tie-break).
    pub ties: usize,
    pub buckets: Vec<BucketExpectation>,
}

impl ExactEstimate {
    /// Expected comparisons as a fraction of the naive count.
    pub fn reduction(&self) -> f64 {
        self.expected / self.naive as f64
    }
}

/// Exact engine bound to one tier list; holds its permutation table.
#[derive(Debug, Clone)]
pub struct ExactCalculator {
    tiers: Distribution,
    /// Tier values by tier index, in ascending order.
    values: Vec<f64>,
    table: PermutationTable,
    /// Conditional expectation per bucket, ascending; independent of defenders.
    conditional: Vec<(Bucket, f64)>,
}

impl ExactCalculator {
    /// Validate the tier list, enumerate its orderings and precompute the
    /// per-bucket expectations.
    pub fn new(tiers: &Distribution) -> Result<Self> {
        let tiers = tiers.sorted();
        for pair in tiers.tiers().windows(2) {
            if pair[0].value == pair[1].value {
                return Err(ConfigError::DuplicateTierValue {
                    value: pair[0].value,
                });
            }
        }
        let table = PermutationTable::new(&tiers)?;
        let values: Vec<f64> = tiers.tiers().iter().map(|t| t.value).collect();
        log::debug!(
            "exact engine: {} tiers, {} orderings",
            values.len(),
            table.len()
        );

        let last = (values.len() - 1) as u8;
        let mut conditional = Vec::with_capacity(values.len() + 1);
        conditional.push((
            Bucket::Below { lowest: values[0] },
            table.expectation(|order| extremal_tests(order, &values, 0, Direction::Below)),
        ));
        for i in 0..last {
            conditional.push((
                Bucket::Between {
                    lower: values[i as usize],
                    upper: values[i as usize + 1],
                },
                table.expectation(|order| bracket_tests(order, &values, i, i + 1)),
            ));
        }
        conditional.push((
            Bucket::Above {
                highest: values[last as usize],
            },
            table.expectation(|order| extremal_tests(order, &values, last, Direction::Above)),
        ));

        Ok(Self {
            tiers,
            values,
            table,
            conditional,
        })
    }

    /// The tier list, sorted ascending.
    pub fn tiers(&self) -> &Distribution {
        &self.tiers
    }

    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Expected tier tests given a defender in `direction`'s extremal bucket.
    pub fn expected_extremal_tests(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Below => self.conditional[0].1,
            Direction::Above => self.conditional[self.conditional.len() - 1].1,
        }
    }

    /// Expected tier tests given a defender between tier `i` and tier `i + 1`
    /// (ascending order).
    pub fn expected_bracket_tests(&self, i: usize) -> f64 {
        assert!(
            i + 1 < self.values.len(),
            "no tier above index {i} of {}",
            self.values.len()
        );
        self.conditional[i + 1].1
    }

    /// Expected total comparisons to classify every defender against the
    /// tier list.
    pub fn expected_comparisons(&self, defenders: &Distribution) -> ExactEstimate {
        let n = defenders.total();
        let buckets: Vec<BucketExpectation> = self
            .conditional
            .iter()
            .map(|&(bucket, expected_tests)| BucketExpectation {
                bucket,
                mass: defenders.count_where(|d| bucket.contains(d)) as f64 / n as f64,
                expected_tests,
            })
            .collect();
        let per_defender: f64 = buckets.iter().map(|b| b.mass * b.expected_tests).sum();
        let ties = defenders.count_where(|d| self.values.contains(&d));
        if ties > 0 {
            log::debug!("{ties} of {n} defenders share a value with a tier");
        }
        ExactEstimate {
            expected: per_defender * n as f64,
            naive: self.values.len() * n,
            defenders: n,
            ties,
            buckets,
        }
    }
}
