use clap::Parser;

use flight_surety_oracle::{NodeConfig, Simulation};

#[derive(Parser, Debug)]
#[command(name = "flight-surety-oracle")]
#[command(about = "Oracle watcher and end-to-end simulation for the flight surety ledger")]
struct Args {
    /// Path to node configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Number of oracles to register
    #[arg(short, long)]
    oracles: Option<u32>,

    /// Poll interval in milliseconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Seed for index assignment and status proposals
    #[arg(long)]
    seed: Option<u64>,

    /// Resolution rounds before stopping
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    let mut config = match &args.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };

    if let Some(oracles) = args.oracles {
        config.oracle_count = oracles;
    }
    if let Some(interval) = args.interval {
        config.poll_interval_ms = interval;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(rounds) = args.rounds {
        config.simulation.rounds = rounds;
    }
    config.validate()?;

    log::info!("Starting flight surety oracle simulation");
    log::info!(
        "{} oracles, poll interval {}ms, {} rounds",
        config.oracle_count,
        config.poll_interval_ms,
        config.simulation.rounds
    );

    let report = Simulation::new(config).run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.log_summary();
    }

    Ok(())
}
