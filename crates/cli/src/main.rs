//! granary: run the producer/consumer brokerage simulation from the shell
//!
//! ```text
//! granary [-v] [-r | --seed N] [--producers N] [--sourcing NAME]
//!         [--drain-ms N] [--json] <consumers> <iterations>
//! ```

use std::process::ExitCode;

use clap::Parser;
use granary_runner::{Simulation, SimulationConfig};

/// Producers deliver grain, consumers buy bundles, brokers trade between
/// themselves to fill them.
#[derive(Parser, Debug)]
#[command(name = "granary")]
#[command(about = "Concurrent commodity brokerage simulation")]
struct Args {
    /// Number of consumers
    consumers: usize,

    /// Deliveries each producer makes
    iterations: u64,

    /// Log every delivery, request and swap
    #[arg(short, long)]
    verbose: bool,

    /// Reproducible run (same as --seed 0)
    #[arg(short = 'r', long, conflicts_with = "seed")]
    reproducible: bool,

    /// Seed for every random choice in the run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of producers, assigned commodities round-robin
    #[arg(long, default_value_t = 4)]
    producers: usize,

    /// How brokers cover shortfalls: "swap" or "borrow"
    #[arg(long, default_value = "swap")]
    sourcing: String,

    /// Grace period for consumers after production ends (ms)
    #[arg(long = "drain-ms", default_value_t = 3000)]
    drain_ms: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            producers: self.producers,
            consumers: self.consumers,
            iterations: self.iterations,
            seed: if self.reproducible { Some(0) } else { self.seed },
            sourcing: self.sourcing.clone(),
            drain_grace_ms: self.drain_ms,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let simulation = match Simulation::new(args.config()) {
        Ok(simulation) => simulation,
        Err(e) => {
            eprintln!("granary: {}", e);
            return ExitCode::from(2);
        }
    };

    match simulation.run().await {
        Ok(report) if args.json => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("granary: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Simulation failed: {}", e);
            eprintln!("granary: {}", e);
            ExitCode::FAILURE
        }
    }
}
