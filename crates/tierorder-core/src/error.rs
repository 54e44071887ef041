//! Configuration errors.
//!
//! Every way a tier list, scenario or engine setup can be rejected. These are
//! raised while building configuration, before any trial runs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("distribution has no tiers")]
    EmptyDistribution,

    #[error("tier {index} (value {value}) has a zero count")]
    ZeroCount { index: usize, value: f64 },

    #[error("tier {index} has a non-finite value")]
    NonFiniteValue { index: usize },

    #[error("value {value} appears in more than one tier")]
    DuplicateTierValue { value: f64 },

    #[error("{tiers} tiers exceed the exact-engine limit of {max}")]
    TooManyTiers { tiers: usize, max: usize },

    #[error("trial count must be positive")]
    ZeroTrials,

    #[error("cannot parse tier `{input}`: expected `value:count`")]
    ParseTier { input: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
