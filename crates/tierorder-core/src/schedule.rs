//! Adaptive scheduler: decides which attacker/defender pairs to compare.
//!
//! A trial walks attacker groups (poise tiers), then attackers within the
//! group, then a reshuffled sequence of defenders. Pairs the relation store
//! already orders are skipped for free. Each loop level has a
//! [`ClassificationScope`] checkpoint; when its scope is fully ordered against
//! every defender the loop ends early.
//!
//! The two-distribution shape is the single-group case: its group checkpoint
//! and its global checkpoint are the same predicate.

use std::ops::Range;

use rand::Rng;

use crate::realize::{Realization, shuffle};
use crate::relation::RelationMatrix;

/// Counts collected while running one trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialOutcome {
    /// Comparisons actually performed.
    pub comparisons: usize,
    /// Pairs visited but already ordered by closure.
    pub skipped: usize,
    /// Comparisons whose two values were exactly equal.
    pub ties: usize,
}

/// Outcome of comparing an attacker with a defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The defender's value is strictly below the attacker's.
    Withstands,
    /// The defender's value is at or above the attacker's.
    Yields,
}

/// Compare an attacker value with a defender value.
///
/// An exact tie yields, which orders the attacker before the defender. That
/// is the tie-break `(value, side)` with attacker-side first, so recorded
/// facts always stay consistent with one strict order.
pub fn compare(attacker: f64, defender: f64) -> Comparison {
    if defender < attacker {
        Comparison::Withstands
    } else {
        Comparison::Yields
    }
}

/// A block of attacker nodes whose ordering against a block of defender nodes
/// is checked incrementally.
///
/// Facts only accumulate during a trial, so once a pair is seen ordered it
/// stays ordered; the cursor never moves backwards and each pair is examined
/// at most once per scope.
#[derive(Debug, Clone)]
pub struct ClassificationScope {
    attackers: Range<usize>,
    defenders: Range<usize>,
    cursor: usize,
}

impl ClassificationScope {
    pub fn new(attackers: Range<usize>, defenders: Range<usize>) -> Self {
        Self {
            attackers,
            defenders,
            cursor: 0,
        }
    }

    /// True once every attacker in scope is ordered against every defender.
    pub fn is_classified(&mut self, relations: &RelationMatrix) -> bool {
        let width = self.defenders.len();
        let total = self.attackers.len() * width;
        while self.cursor < total {
            let a = self.attackers.start + self.cursor / width;
            let d = self.defenders.start + self.cursor % width;
            if !relations.is_known(a, d) {
                return false;
            }
            self.cursor += 1;
        }
        true
    }
}

/// One trial: a realization plus the relation store being filled in.
#[derive(Debug, Clone)]
pub struct Trial {
    realization: Realization,
    relations: RelationMatrix,
}

impl Trial {
    pub fn new(realization: Realization) -> Self {
        let relations = RelationMatrix::new(realization.layout.total_nodes());
        Self {
            realization,
            relations,
        }
    }

    pub fn realization(&self) -> &Realization {
        &self.realization
    }

    pub fn relations(&self) -> &RelationMatrix {
        &self.relations
    }

    /// Compare one attacker/defender pair unless closure already orders it.
    /// Returns `None` when the pair was skipped.
    fn test_pair(&mut self, attacker: usize, defender: usize) -> Option<Comparison> {
        if self.relations.is_known(attacker, defender) {
            return None;
        }
        let outcome = compare(
            self.realization.value(attacker),
            self.realization.value(defender),
        );
        match outcome {
            Comparison::Withstands => self.relations.record(defender, attacker),
            Comparison::Yields => self.relations.record(attacker, defender),
        };
        Some(outcome)
    }

    /// Run the adaptive schedule to completion and return its counts.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TrialOutcome {
        let layout = self.realization.layout;
        let defender_nodes = layout.defender_range();
        let mut order: Vec<usize> = defender_nodes.clone().collect();
        let mut outcome = TrialOutcome::default();
        let mut first_pass = true;

        let mut everything =
            ClassificationScope::new(layout.attacker_range(), defender_nodes.clone());
        for group in 0..layout.groups {
            let mut tier =
                ClassificationScope::new(layout.group_range(group), defender_nodes.clone());
            for attacker in 0..layout.attackers {
                let node = layout.attacker_node(group, attacker);
                if !first_pass {
                    shuffle(&mut order, rng);
                }
                first_pass = false;

                let mut this_node =
                    ClassificationScope::new(node..node + 1, defender_nodes.clone());
                for &defender in &order {
                    match self.test_pair(node, defender) {
                        None => outcome.skipped += 1,
                        Some(_) => {
                            outcome.comparisons += 1;
                            if self.realization.value(node) == self.realization.value(defender) {
                                outcome.ties += 1;
                            }
                            if this_node.is_classified(&self.relations) {
                                break;
                            }
                        }
                    }
                }
                if tier.is_classified(&self.relations) {
                    break;
                }
            }
            if everything.is_classified(&self.relations) {
                break;
            }
        }

        log::trace!(
            "trial done: {} comparisons, {} skipped, {} ties, {} facts",
            outcome.comparisons,
            outcome.skipped,
            outcome.ties,
            self.relations.fact_count()
        );
        outcome
    }

    /// True when every attacker-side node is ordered against every defender,
    /// checked from scratch without the scheduler's checkpoints.
    pub fn is_fully_classified(&self) -> bool {
        let layout = self.realization.layout;
        layout.attacker_range().all(|a| {
            layout
                .defender_range()
                .all(|d| self.relations.is_known(a, d))
        })
    }
}
