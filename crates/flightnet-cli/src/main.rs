use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flightnet_cli::commands::{
    self,
    network::{AnalyzeArgs, DensityArgs, SpanningTreeArgs},
    route::{PairArgs, PathsArgs},
    simulate::{SampleArgs, SimulateArgs},
};
use flightnet_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flight network connectivity queries")]
struct Cli {
    /// Directory holding network.json or airports.dat + routes.dat
    /// (defaults to FLIGHTNET_DATA_DIR, then the platform data directory).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Minimum number of flights between two airports.
    Hops(PairArgs),
    /// Compare the fewest-flights route with the shortest-distance route.
    Route(PairArgs),
    /// List every route within a flight budget, shortest first.
    Paths(PathsArgs),
    /// Direct flights leaving an airport.
    Flights {
        /// Airport code.
        airport: String,
    },
    /// Keep only airports with a minimum number of destinations.
    Density(DensityArgs),
    /// Draw airports weighted by the population they serve.
    Sample(SampleArgs),
    /// Measure randomly drawn airport pairs and aggregate the results.
    Simulate(SimulateArgs),
    /// Hop statistics over every pair of airports.
    Analyze(AnalyzeArgs),
    /// Minimum spanning tree of the largest connected component.
    Mst(SpanningTreeArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let format = cli.format;
    let network = commands::load(cli.data_dir.as_deref())?;

    match &cli.command {
        Command::Hops(args) => commands::route::handle_hops(&network, args, format),
        Command::Route(args) => commands::route::handle_route(&network, args, format),
        Command::Paths(args) => commands::route::handle_paths(&network, args, format),
        Command::Flights { airport } => {
            commands::network::handle_flights(&network, airport, format)
        }
        Command::Density(args) => commands::network::handle_density(&network, args, format),
        Command::Sample(args) => commands::simulate::handle_sample(&network, args, format),
        Command::Simulate(args) => commands::simulate::handle_simulate(&network, args, format),
        Command::Analyze(args) => commands::network::handle_analyze(&network, args, format),
        Command::Mst(args) => commands::network::handle_spanning_tree(&network, args, format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
