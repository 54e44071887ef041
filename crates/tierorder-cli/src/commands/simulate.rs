use serde::Serialize;
use tierorder_core::{MonteCarlo, MonteCarloConfig, Scenario};
use tierorder_stats::Summary;

use super::{
    RunOptions, fail, format_duration, load_config, resolve_distribution, resolve_z, write_json,
};

pub struct SimulateCommandConfig<'a> {
    pub poise: Option<&'a str>,
    pub attackers: Option<&'a str>,
    pub defenders: Option<&'a str>,
    /// Build the poise-by-attacker shape instead of a plain pair.
    pub mixed: bool,
    pub run: RunOptions,
}

#[derive(Serialize)]
struct SimulateReport<'a> {
    scenario: &'a Scenario,
    trials: usize,
    seed: u64,
    ties: usize,
    elapsed_secs: f64,
    summary: &'a Summary,
    counts: &'a [usize],
}

pub fn run(cfg: SimulateCommandConfig<'_>) {
    let file = load_config(cfg.run.config.as_deref());

    let attackers = resolve_distribution("attackers", cfg.attackers, file.attackers.as_ref())
        .unwrap_or_else(|e| fail(e));
    let defenders = resolve_distribution("defenders", cfg.defenders, file.defenders.as_ref())
        .unwrap_or_else(|e| fail(e));
    let scenario = if cfg.mixed {
        let poise = resolve_distribution("poise", cfg.poise, file.poise.as_ref())
            .unwrap_or_else(|e| fail(e));
        Scenario::mixed(poise, attackers, defenders)
    } else {
        Scenario::pair(attackers, defenders)
    };

    let z = resolve_z(cfg.run.z.or(file.z), cfg.run.confidence.or(file.confidence))
        .unwrap_or_else(|e| fail(e));
    let config = MonteCarloConfig {
        trials: cfg.run.trials.or(file.trials).unwrap_or(2000),
        seed: cfg.run.seed.or(file.seed),
        parallel: cfg.run.parallel,
        progress_every: cfg.run.progress_every,
    };

    let engine = MonteCarlo::new(scenario, config).unwrap_or_else(|e| fail(e));
    print_scenario(engine.scenario());

    let estimate = engine.run();
    let Some(summary) = Summary::from_counts(&estimate.counts, z, estimate.naive) else {
        fail("no trials were run");
    };

    println!("\n{}", "=".repeat(60));
    println!("  Results over {} trials (seed {})", summary.n, estimate.seed);
    println!("{}", "=".repeat(60));
    println!("  Mean comparisons:   {:.3}", summary.mean);
    println!("  Std deviation:      {:.3}", summary.std_dev);
    println!(
        "  {:.1}% interval:     [{:.3}, {:.3}]  (z = {:.3})",
        100.0 * summary.confidence_level(),
        summary.ci_lower,
        summary.ci_upper,
        summary.z
    );
    println!("  Naive comparisons:  {}", summary.naive);
    println!("  Percent of naive:   {:.2}%", summary.percent_of_naive());
    if estimate.ties > 0 {
        println!("  Tied comparisons:   {}", estimate.ties);
    }
    println!("  Runtime:            {}", format_duration(estimate.elapsed));

    if let Some(path) = cfg.run.output.as_deref() {
        let report = SimulateReport {
            scenario: engine.scenario(),
            trials: summary.n,
            seed: estimate.seed,
            ties: estimate.ties,
            elapsed_secs: estimate.elapsed.as_secs_f64(),
            summary: &summary,
            counts: &estimate.counts,
        };
        write_json(path, &report);
    }
}

fn print_scenario(scenario: &Scenario) {
    match scenario {
        Scenario::Pair {
            attackers,
            defenders,
        } => {
            println!("Attackers ({}): {attackers}", attackers.total());
            println!("Defenders ({}): {defenders}", defenders.total());
        }
        Scenario::Mixed {
            poise,
            attackers,
            defenders,
        } => {
            println!("Poise tiers ({}): {poise}", poise.len());
            println!("Attackers ({}): {attackers}", attackers.total());
            println!("Defenders ({}): {defenders}", defenders.total());
        }
    }
}
