//! Pairwise connectivity commands: `hops`, `route` and `paths`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use flightnet_lib::{
    all_paths_with, fewest_hops_route, hop_distance, shortest_distance, Error as LibError,
    Network, PathRecord, PathSearch, ShortestRoute, RECOMMENDED_MAX_HOPS,
};

use super::friendly_error;
use crate::output::{format_airlines, format_km, format_path, plural, render_json, OutputFormat};

/// Origin and destination airport codes.
#[derive(Args, Debug, Clone)]
pub struct PairArgs {
    /// Origin airport code (e.g. LHR).
    pub origin: String,
    /// Destination airport code (e.g. JFK).
    pub destination: String,
}

/// Arguments for the `paths` command.
#[derive(Args, Debug, Clone)]
pub struct PathsArgs {
    #[command(flatten)]
    pub pair: PairArgs,
    /// Maximum number of flights per route.
    #[arg(long, default_value_t = RECOMMENDED_MAX_HOPS)]
    pub max_hops: usize,
    /// Only list routes with exactly `--max-hops` flights.
    #[arg(long)]
    pub exact: bool,
    /// Abort the search after this many seconds.
    #[arg(long)]
    pub timeout: Option<f64>,
}

#[derive(Debug, Serialize)]
struct HopsOutput<'a> {
    origin: &'a str,
    destination: &'a str,
    reachable: bool,
    hops: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RouteComparison<'a> {
    origin: &'a str,
    destination: &'a str,
    reachable: bool,
    fewest_hops: Option<ShortestRoute>,
    shortest_distance: Option<ShortestRoute>,
}

#[derive(Debug, Serialize)]
struct PathsOutput<'a> {
    origin: &'a str,
    destination: &'a str,
    max_hops: usize,
    exact: bool,
    paths: &'a [PathRecord],
}

/// `NoPath` becomes `None`; every other error is reported.
fn reachable<T>(result: flightnet_lib::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(LibError::NoPath { .. }) => Ok(None),
        Err(err) => Err(friendly_error(err)),
    }
}

fn print_no_path(origin: &str, destination: &str) {
    println!("No connecting flight path from {origin} to {destination}.");
}

/// Handle the `hops` subcommand.
pub fn handle_hops(network: &Network, args: &PairArgs, format: OutputFormat) -> Result<()> {
    let hops = reachable(hop_distance(network, &args.origin, &args.destination))?;

    if format.is_json() {
        render_json(&HopsOutput {
            origin: &args.origin,
            destination: &args.destination,
            reachable: hops.is_some(),
            hops,
        })?;
        return Ok(());
    }

    match hops {
        Some(hops) => println!(
            "{} -> {}: {}",
            args.origin,
            args.destination,
            plural(hops, "flight")
        ),
        None => print_no_path(&args.origin, &args.destination),
    }
    Ok(())
}

/// Handle the `route` subcommand: fewest flights next to shortest distance.
pub fn handle_route(network: &Network, args: &PairArgs, format: OutputFormat) -> Result<()> {
    let fewest = reachable(fewest_hops_route(network, &args.origin, &args.destination))?;
    let shortest = reachable(shortest_distance(network, &args.origin, &args.destination))?;

    if format.is_json() {
        render_json(&RouteComparison {
            origin: &args.origin,
            destination: &args.destination,
            reachable: shortest.is_some(),
            fewest_hops: fewest,
            shortest_distance: shortest,
        })?;
        return Ok(());
    }

    let (Some(fewest), Some(shortest)) = (fewest, shortest) else {
        print_no_path(&args.origin, &args.destination);
        return Ok(());
    };

    println!("Route from {} to {}:", args.origin, args.destination);
    print_route_line("Fewest flights", &fewest);
    print_route_line("Shortest distance", &shortest);
    Ok(())
}

fn print_route_line(label: &str, route: &ShortestRoute) {
    println!(
        "  {label:<18} {} ({}, {})",
        format_path(&route.path),
        plural(route.hop_count(), "flight"),
        format_km(route.total_km)
    );
}

/// Handle the `paths` subcommand.
pub fn handle_paths(network: &Network, args: &PathsArgs, format: OutputFormat) -> Result<()> {
    let cancel = AtomicBool::new(false);
    let search = if args.exact {
        PathSearch::exactly(args.max_hops)
    } else {
        PathSearch::within(args.max_hops)
    }
    .with_cancel(&cancel);

    let (origin, destination) = (args.pair.origin.as_str(), args.pair.destination.as_str());
    let run = || all_paths_with(network, origin, destination, &search);
    let result = match args.timeout {
        Some(seconds) => {
            let timeout = Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("invalid --timeout value {seconds}"))?;
            with_deadline(&cancel, timeout, run)
        }
        None => run(),
    };

    let paths = match result {
        Ok(paths) => paths,
        Err(LibError::SearchCancelled) => anyhow::bail!(
            "Path search between {origin} and {destination} timed out. Try a lower --max-hops."
        ),
        Err(err) => return Err(friendly_error(err)),
    };

    if format.is_json() {
        render_json(&PathsOutput {
            origin,
            destination,
            max_hops: args.max_hops,
            exact: args.exact,
            paths: &paths,
        })?;
        return Ok(());
    }

    let budget = if args.exact {
        format!("exactly {}", plural(args.max_hops, "flight"))
    } else {
        format!("at most {}", plural(args.max_hops, "flight"))
    };
    if paths.is_empty() {
        println!("No routes from {origin} to {destination} with {budget}.");
        return Ok(());
    }

    println!(
        "{} from {origin} to {destination} with {budget}:",
        plural(paths.len(), "route")
    );
    for (i, record) in paths.iter().enumerate() {
        println!(
            "{:>4}. {} ({}) [{}]",
            i + 1,
            format_path(&record.path),
            format_km(record.total_km),
            format_airlines(&record.airlines_per_leg)
        );
    }
    Ok(())
}

/// Run `search` while a watchdog thread raises `cancel` once `timeout` elapses.
fn with_deadline<T>(cancel: &AtomicBool, timeout: Duration, search: impl FnOnce() -> T) -> T {
    let (done, finished) = mpsc::channel::<()>();
    thread::scope(|scope| {
        scope.spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = finished.recv_timeout(timeout) {
                cancel.store(true, Ordering::Relaxed);
            }
        });
        let result = search();
        drop(done);
        result
    })
}
