use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod utils;

/// Intelligent-routing controller CLI
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Sets the level of verbosity
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

/// Where the topology comes from. Precedence: file, grid, GEANT2.
#[derive(Args, Clone)]
struct TopologyArgs {
    /// JSON topology file: {"edges": [[i, j, w], ...]}
    #[clap(short, long)]
    topology: Option<PathBuf>,

    /// Build a grid with this many nodes per row instead
    #[clap(long, value_name = "WIDTH")]
    grid: Option<usize>,

    /// Node count for --grid
    #[clap(long, default_value = "9")]
    nodes: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the closed control loop against the external decision peer
    Run {
        #[clap(flatten)]
        topology: TopologyArgs,

        /// Poll interval while awaiting the peer, in milliseconds
        #[clap(long, default_value = "50")]
        poll_interval: u64,

        /// Cooldown between rounds, in milliseconds
        #[clap(long, default_value = "2000")]
        cooldown: u64,

        /// Delay before the first telemetry collection, in milliseconds
        #[clap(long, default_value = "500")]
        start_delay: u64,
    },

    /// Compute shortest-path routes once and print every routing table
    Routes {
        #[clap(flatten)]
        topology: TopologyArgs,

        /// Also print the next-hop vector for this source node
        #[clap(short, long)]
        source: Option<usize>,
    },

    /// Print the telemetry payload the controller would send
    Telemetry {
        #[clap(flatten)]
        topology: TopologyArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .init();

    // Execute the specified command
    match cli.command {
        Commands::Run {
            topology,
            poll_interval,
            cooldown,
            start_delay,
        } => {
            commands::run::run_loop(topology, poll_interval, cooldown, start_delay).await?;
        }
        Commands::Routes { topology, source } => {
            commands::routes::show_routes(topology, source)?;
        }
        Commands::Telemetry { topology } => {
            commands::telemetry::show_telemetry(topology)?;
        }
    }

    Ok(())
}
