//! Entity realizer: expands tier distributions into one concrete trial.
//!
//! Node ids are laid out in contiguous ranges: attacker-side nodes first,
//! grouped by poise tier (tier-major, then attacker), then defender nodes.
//! The two-distribution shape is the single-group case of the same layout.

use std::ops::Range;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::tier::Distribution;

/// Node-id partitioning for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayout {
    /// Number of attacker groups (poise tiers); 1 in the two-distribution shape.
    pub groups: usize,
    /// Attackers per group.
    pub attackers: usize,
    pub defenders: usize,
}

impl NodeLayout {
    pub fn pair(attackers: usize, defenders: usize) -> Self {
        Self {
            groups: 1,
            attackers,
            defenders,
        }
    }

    pub fn mixed(groups: usize, attackers: usize, defenders: usize) -> Self {
        Self {
            groups,
            attackers,
            defenders,
        }
    }

    /// Number of attacker-side nodes across all groups.
    pub fn attacker_nodes(&self) -> usize {
        self.groups * self.attackers
    }

    pub fn total_nodes(&self) -> usize {
        self.attacker_nodes() + self.defenders
    }

    /// Node id of attacker `attacker` inside group `group`.
    pub fn attacker_node(&self, group: usize, attacker: usize) -> usize {
        debug_assert!(group < self.groups && attacker < self.attackers);
        group * self.attackers + attacker
    }

    pub fn defender_node(&self, defender: usize) -> usize {
        debug_assert!(defender < self.defenders);
        self.attacker_nodes() + defender
    }

    pub fn group_range(&self, group: usize) -> Range<usize> {
        let start = group * self.attackers;
        start..start + self.attackers
    }

    pub fn attacker_range(&self) -> Range<usize> {
        0..self.attacker_nodes()
    }

    pub fn defender_range(&self) -> Range<usize> {
        self.attacker_nodes()..self.total_nodes()
    }

    /// Size of the full cross product of attacker-side and defender nodes.
    pub fn naive_complexity(&self) -> usize {
        self.attacker_nodes() * self.defenders
    }
}

/// Concrete values for every node of one trial.
#[derive(Debug, Clone)]
pub struct Realization {
    pub layout: NodeLayout,
    /// Realized value per node id.
    pub values: Vec<f64>,
    /// Poise values in the drawn order, one per group. Empty for the
    /// two-distribution shape.
    pub group_order: Vec<f64>,
}

impl Realization {
    pub fn value(&self, node: usize) -> f64 {
        self.values[node]
    }
}

/// Effective value of an attacker under a poise bonus given in percent.
pub fn poise_modified(base: f64, poise: f64) -> f64 {
    base * (1.0 + poise / 100.0)
}

/// Uniform Fisher-Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// Draw every tier once by weighted sampling without replacement, weight =
/// tier count. Returns tier indices in draw order.
pub fn weighted_order<R: Rng + ?Sized>(dist: &Distribution, rng: &mut R) -> Vec<usize> {
    let mut weights: Vec<usize> = dist.tiers().iter().map(|t| t.count as usize).collect();
    let mut remaining = dist.total();
    let mut order = Vec::with_capacity(weights.len());

    for _ in 0..weights.len() {
        assert!(
            remaining > 0,
            "weighted draw exhausted its pool after {} of {} tiers",
            order.len(),
            weights.len()
        );
        let draw = rng.random_range(0..remaining);
        let mut cumulative = 0;
        for (index, weight) in weights.iter_mut().enumerate() {
            cumulative += *weight;
            if draw < cumulative {
                order.push(index);
                remaining -= *weight;
                *weight = 0;
                break;
            }
        }
    }
    order
}

/// Realize the two-distribution shape: attackers then defenders, each side
/// shuffled independently.
pub fn realize_pair<R: Rng + ?Sized>(
    attackers: &Distribution,
    defenders: &Distribution,
    rng: &mut R,
) -> Realization {
    let mut attacker_values = attackers.expand();
    let mut defender_values = defenders.expand();
    shuffle(&mut attacker_values, rng);
    shuffle(&mut defender_values, rng);

    let layout = NodeLayout::pair(attacker_values.len(), defender_values.len());
    let mut values = attacker_values;
    values.extend(defender_values);
    Realization {
        layout,
        values,
        group_order: Vec::new(),
    }
}

/// Realize the poise-mixed shape: poise tiers in one weighted order, crossed
/// with every shuffled attacker value, followed by the shuffled defenders.
pub fn realize_mixed<R: Rng + ?Sized>(
    poise: &Distribution,
    attackers: &Distribution,
    defenders: &Distribution,
    rng: &mut R,
) -> Realization {
    let group_order: Vec<f64> = weighted_order(poise, rng)
        .into_iter()
        .map(|i| poise.tiers()[i].value)
        .collect();
    let mut attacker_values = attackers.expand();
    let mut defender_values = defenders.expand();
    shuffle(&mut attacker_values, rng);
    shuffle(&mut defender_values, rng);

    let layout = NodeLayout::mixed(
        group_order.len(),
        attacker_values.len(),
        defender_values.len(),
    );
    let mut values = Vec::with_capacity(layout.total_nodes());
    for &p in &group_order {
        values.extend(attacker_values.iter().map(|&a| poise_modified(a, p)));
    }
    values.extend(defender_values);
    Realization {
        layout,
        values,
        group_order,
    }
}
