//! Tier distributions: how many entities share each value.
//!
//! A [`Distribution`] is immutable once built and is validated on every
//! construction path (direct, `FromStr`, serde), so engines never see an empty
//! list or a zero count.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// `count` entities share exactly `value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub value: f64,
    pub count: u32,
}

impl Tier {
    pub fn new(value: f64, count: u32) -> Self {
        Self { value, count }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.value, self.count)
    }
}

impl FromStr for Tier {
    type Err = ConfigError;

    /// Parse `value:count` (also accepts `valuexcount`).
    fn from_str(s: &str) -> Result<Self> {
        let err = || ConfigError::ParseTier {
            input: s.to_string(),
        };
        let (value, count) = s
            .trim()
            .split_once(|c| c == ':' || c == 'x')
            .ok_or_else(err)?;
        let value: f64 = value.trim().parse().map_err(|_| err())?;
        let count: u32 = count.trim().parse().map_err(|_| err())?;
        Ok(Self { value, count })
    }
}

/// Ordered, validated list of tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct Distribution {
    tiers: Vec<Tier>,
    total: usize,
}

impl Distribution {
    /// Build a distribution, rejecting empty lists, zero counts and
    /// non-finite values.
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(ConfigError::EmptyDistribution);
        }
        for (index, tier) in tiers.iter().enumerate() {
            if !tier.value.is_finite() {
                return Err(ConfigError::NonFiniteValue { index });
            }
            if tier.count == 0 {
                return Err(ConfigError::ZeroCount {
                    index,
                    value: tier.value,
                });
            }
        }
        let total = tiers.iter().map(|t| t.count as usize).sum();
        Ok(Self { tiers, total })
    }

    /// Convenience constructor from `(value, count)` pairs.
    pub fn from_pairs(pairs: &[(f64, u32)]) -> Result<Self> {
        Self::new(pairs.iter().map(|&(v, c)| Tier::new(v, c)).collect())
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always false for a validated distribution.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Total entity count (sum of tier counts).
    pub fn total(&self) -> usize {
        self.total
    }

    /// One value per entity, tier by tier in declaration order.
    pub fn expand(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.total);
        for tier in &self.tiers {
            values.extend(std::iter::repeat_n(tier.value, tier.count as usize));
        }
        values
    }

    /// Copy with tiers sorted by ascending value.
    pub fn sorted(&self) -> Self {
        let mut tiers = self.tiers.clone();
        tiers.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self {
            tiers,
            total: self.total,
        }
    }

    /// Number of entities whose value satisfies `pred`.
    pub fn count_where(&self, pred: impl Fn(f64) -> bool) -> usize {
        self.tiers
            .iter()
            .filter(|t| pred(t.value))
            .map(|t| t.count as usize)
            .sum()
    }
}

impl TryFrom<Vec<Tier>> for Distribution {
    type Error = ConfigError;

    fn try_from(tiers: Vec<Tier>) -> Result<Self> {
        Self::new(tiers)
    }
}

impl From<Distribution> for Vec<Tier> {
    fn from(dist: Distribution) -> Self {
        dist.tiers
    }
}

impl FromStr for Distribution {
    type Err = ConfigError;

    /// Parse a comma-separated list such as `0:50,31:80,61:100`.
    fn from_str(s: &str) -> Result<Self> {
        let tiers = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Tier::from_str)
            .collect::<Result<Vec<_>>>()?;
        Self::new(tiers)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tier) in self.tiers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{tier}")?;
        }
        Ok(())
    }
}
