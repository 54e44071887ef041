pub mod exact;
pub mod simulate;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tierorder_core::Distribution;
use tierorder_stats::{DEFAULT_Z, z_for_confidence};

/// Run settings shared by `simulate` and `mixed`, straight from the flags.
pub struct RunOptions {
    pub config: Option<String>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub z: Option<f64>,
    pub confidence: Option<f64>,
    pub parallel: bool,
    pub progress_every: usize,
    pub output: Option<String>,
}

/// JSON config file. Tier lists are arrays of `{"value": .., "count": ..}`.
///
/// ```json
/// {
///   "attackers": [{"value": 0, "count": 50}, {"value": 31, "count": 80}],
///   "defenders": [{"value": 30, "count": 150}],
///   "trials": 500,
///   "seed": 42
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub poise: Option<Distribution>,
    pub attackers: Option<Distribution>,
    pub defenders: Option<Distribution>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub z: Option<f64>,
    pub confidence: Option<f64>,
}

/// Print to stderr and exit with status 1.
pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

pub fn parse_config(text: &str) -> Result<FileConfig, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

pub fn load_config(path: Option<&str>) -> FileConfig {
    let Some(path) = path else {
        return FileConfig::default();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => fail(format!("cannot read config {path}: {e}")),
    };
    match parse_config(&text) {
        Ok(c) => {
            log::debug!("loaded config from {path}");
            c
        }
        Err(e) => fail(format!("invalid config {path}: {e}")),
    }
}

/// A tier list from its flag, falling back to the config file.
pub fn resolve_distribution(
    name: &str,
    flag: Option<&str>,
    file: Option<&Distribution>,
) -> Result<Distribution, String> {
    match (flag, file) {
        (Some(text), _) => text
            .parse::<Distribution>()
            .map_err(|e| format!("--{name}: {e}")),
        (None, Some(d)) => Ok(d.clone()),
        (None, None) => Err(format!("missing {name} tiers (use --{name} or --config)")),
    }
}

/// z-score from `--z`, else from a confidence level, else the default.
pub fn resolve_z(z: Option<f64>, confidence: Option<f64>) -> Result<f64, String> {
    if let Some(z) = z {
        if !(z.is_finite() && z > 0.0) {
            return Err(format!("z-score must be positive, got {z}"));
        }
        return Ok(z);
    }
    match confidence {
        Some(level) => z_for_confidence(level)
            .ok_or_else(|| format!("confidence must be in (0, 1), got {level}")),
        None => Ok(DEFAULT_Z),
    }
}

pub fn write_json(path: &str, value: &impl Serialize) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(j) => j,
        Err(e) => fail(format!("cannot serialize results: {e}")),
    };
    if let Err(e) = std::fs::write(Path::new(path), json) {
        eprintln!("Failed to write results to {path}: {e}");
    } else {
        println!("\nResults saved to {path}");
    }
}

pub fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0} ms", secs * 1000.0)
    } else {
        format!("{secs:.2} s")
    }
}
