//! CLI for tierorder: how many comparisons does transitive closure save?

mod commands;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tierorder")]
#[command(about = "tierorder: estimate comparisons needed to order two tiered collections")]
#[command(version = tierorder_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the Monte Carlo commands.
#[derive(Args)]
struct TrialArgs {
    /// JSON config file with tier lists and run settings; flags override it
    #[arg(long)]
    config: Option<String>,

    /// Number of independent trials [default: 2000]
    #[arg(long)]
    trials: Option<usize>,

    /// Base seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// z-score for the confidence interval [default: 2.58]
    #[arg(long, conflicts_with = "confidence")]
    z: Option<f64>,

    /// Two-sided confidence level, converted to a z-score (e.g. 0.95)
    #[arg(long)]
    confidence: Option<f64>,

    /// Run trials in parallel on all cores
    #[arg(long)]
    parallel: bool,

    /// Log progress every N trials (0 disables)
    #[arg(long, default_value = "100")]
    progress_every: usize,

    /// Write the summary as JSON
    #[arg(long)]
    output: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monte Carlo estimate for attackers against defenders
    Simulate {
        /// Attacker tiers as value:count pairs, e.g. "0:50,31:80,61:100"
        #[arg(long)]
        attackers: Option<String>,

        /// Defender tiers as value:count pairs, e.g. "30:150,60:200"
        #[arg(long)]
        defenders: Option<String>,

        #[command(flatten)]
        run: TrialArgs,
    },

    /// Monte Carlo estimate with every attacker under every poise tier
    Mixed {
        /// Poise tiers (percent bonus:count), e.g. "0:6,10:7,20:10"
        #[arg(long)]
        poise: Option<String>,

        /// Attacker tiers as value:count pairs
        #[arg(long)]
        attackers: Option<String>,

        /// Defender tiers as value:count pairs
        #[arg(long)]
        defenders: Option<String>,

        #[command(flatten)]
        run: TrialArgs,
    },

    /// Exact expectation by enumerating every tier ordering (up to 9 tiers)
    Exact {
        /// Tier list to order against the defenders. Without it, the config
        /// file's `poise` and `attackers` lists are each reported.
        #[arg(long)]
        tiers: Option<String>,

        /// Defender tiers as value:count pairs
        #[arg(long)]
        defenders: Option<String>,

        /// JSON config file with tier lists
        #[arg(long)]
        config: Option<String>,

        /// Write the results as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            attackers,
            defenders,
            run,
        } => commands::simulate::run(commands::simulate::SimulateCommandConfig {
            poise: None,
            attackers: attackers.as_deref(),
            defenders: defenders.as_deref(),
            mixed: false,
            run: run.into(),
        }),
        Commands::Mixed {
            poise,
            attackers,
            defenders,
            run,
        } => commands::simulate::run(commands::simulate::SimulateCommandConfig {
            poise: poise.as_deref(),
            attackers: attackers.as_deref(),
            defenders: defenders.as_deref(),
            mixed: true,
            run: run.into(),
        }),
        Commands::Exact {
            tiers,
            defenders,
            config,
            output,
        } => commands::exact::run(
            tiers.as_deref(),
            defenders.as_deref(),
            config.as_deref(),
            output.as_deref(),
        ),
    }
}

impl From<TrialArgs> for commands::RunOptions {
    fn from(args: TrialArgs) -> Self {
        Self {
            config: args.config,
            trials: args.trials,
            seed: args.seed,
            z: args.z,
            confidence: args.confidence,
            parallel: args.parallel,
            progress_every: args.progress_every,
            output: args.output,
        }
    }
}
