//! Whole-network commands: `flights`, `density`, `analyze` and `mst`.

use std::collections::BTreeSet;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use flightnet_lib::{hop_summary_with_threshold, minimum_spanning_tree, Network, LONG_ROUTE_HOPS};

use super::friendly_error;
use crate::output::{
    format_km, format_path, format_with_separators, plural, render_json, OutputFormat,
};

/// Arguments for the `density` command.
#[derive(Args, Debug, Clone)]
pub struct DensityArgs {
    /// Keep only airports with at least this many distinct destinations.
    #[arg(long, default_value_t = 1)]
    pub min_degree: usize,
    /// List the surviving airports.
    #[arg(long)]
    pub list: bool,
}

/// Arguments for the `analyze` command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// List every pair whose fewest-flights route needs at least this many flights.
    #[arg(long, default_value_t = LONG_ROUTE_HOPS)]
    pub long_hops: usize,
}

/// Arguments for the `mst` command.
#[derive(Args, Debug, Clone)]
pub struct SpanningTreeArgs {
    /// Print every tree edge, not just the totals.
    #[arg(long)]
    pub edges: bool,
}

#[derive(Debug, Serialize)]
struct Flight<'a> {
    destination: &'a str,
    name: &'a str,
    distance_km: f64,
    airlines: &'a BTreeSet<String>,
}

#[derive(Debug, Serialize)]
struct FlightsOutput<'a> {
    airport: &'a str,
    name: &'a str,
    flights: Vec<Flight<'a>>,
}

#[derive(Debug, Serialize)]
struct DensityAirport<'a> {
    code: &'a str,
    degree: usize,
}

#[derive(Debug, Serialize)]
struct DensityOutput<'a> {
    min_degree: usize,
    airports_before: usize,
    routes_before: usize,
    airports: usize,
    routes: usize,
    kept: Vec<DensityAirport<'a>>,
}

/// Handle the `flights` subcommand: direct flights leaving one airport.
pub fn handle_flights(network: &Network, code: &str, format: OutputFormat) -> Result<()> {
    let airport = network.airport(code).map_err(friendly_error)?;
    let connections = network.neighbors(code).map_err(friendly_error)?;

    let mut flights = Vec::with_capacity(connections.len());
    for connection in connections {
        let target = network
            .airport(&connection.destination)
            .map_err(friendly_error)?;
        flights.push(Flight {
            destination: &connection.destination,
            name: &target.name,
            distance_km: connection.distance_km,
            airlines: &connection.airlines,
        });
    }

    if format.is_json() {
        render_json(&FlightsOutput {
            airport: &airport.code,
            name: &airport.name,
            flights,
        })?;
        return Ok(());
    }

    if flights.is_empty() {
        println!("No direct flights from {}.", airport.label());
        return Ok(());
    }

    println!(
        "{} from {}:",
        plural(flights.len(), "direct destination"),
        airport.label()
    );
    for flight in &flights {
        let airlines: Vec<&str> = flight.airlines.iter().map(String::as_str).collect();
        println!(
            "  {:<4} {:>10}  {}",
            flight.destination,
            format_km(flight.distance_km),
            airlines.join(", ")
        );
    }
    Ok(())
}

/// Handle the `density` subcommand: filter by minimum out-degree.
pub fn handle_density(network: &Network, args: &DensityArgs, format: OutputFormat) -> Result<()> {
    let filtered = network.subgraph_by_min_degree(args.min_degree);
    let kept: Vec<DensityAirport<'_>> = filtered
        .airports()
        .iter()
        .map(|airport| DensityAirport {
            code: &airport.code,
            // degree in the source network, which is what the filter tested
            degree: network.degree(&airport.code).unwrap_or_default(),
        })
        .collect();

    if format.is_json() {
        render_json(&DensityOutput {
            min_degree: args.min_degree,
            airports_before: network.len(),
            routes_before: network.route_count(),
            airports: filtered.len(),
            routes: filtered.route_count(),
            kept,
        })?;
        return Ok(());
    }

    println!(
        "Minimum degree {}: {} and {} remain (from {} and {}).",
        args.min_degree,
        plural(filtered.len(), "airport"),
        plural(filtered.route_count(), "route"),
        plural(network.len(), "airport"),
        plural(network.route_count(), "route"),
    );
    if args.list {
        for airport in &kept {
            println!("  {:<4} degree {}", airport.code, airport.degree);
        }
    }
    Ok(())
}

/// Handle the `analyze` subcommand: all-pairs hop statistics.
pub fn handle_analyze(network: &Network, args: &AnalyzeArgs, format: OutputFormat) -> Result<()> {
    let summary = hop_summary_with_threshold(network, args.long_hops);

    if format.is_json() {
        render_json(&summary)?;
        return Ok(());
    }

    println!(
        "{} and {} analysed.",
        plural(network.len(), "airport"),
        plural(network.route_count(), "route")
    );
    println!(
        "Reachable ordered pairs: {} of {} ({} unreachable)",
        format_with_separators(summary.reachable_pairs as u64),
        format_with_separators(summary.ordered_pairs as u64),
        format_with_separators(summary.unreachable_pairs as u64)
    );
    match summary.average_hops {
        Some(average) => println!("Average flights between reachable pairs: {average:.2}"),
        None => println!("No pair of airports is connected."),
    }
    for (hops, count) in &summary.histogram {
        println!(
            "  {:>2} {:<8} {}",
            hops,
            if *hops == 1 { "flight" } else { "flights" },
            format_with_separators(*count as u64)
        );
    }
    if let Some(longest) = &summary.longest {
        println!(
            "Longest fewest-flights route: {} ({})",
            format_path(&longest.path),
            plural(longest.hops, "flight")
        );
    }
    for (hops, pairs) in &summary.long_routes {
        println!("Pairs needing {}:", plural(*hops, "flight"));
        for (origin, destination) in pairs {
            println!("  {origin} -> {destination}");
        }
    }
    Ok(())
}

/// Handle the `mst` subcommand.
pub fn handle_spanning_tree(
    network: &Network,
    args: &SpanningTreeArgs,
    format: OutputFormat,
) -> Result<()> {
    let tree = minimum_spanning_tree(network);

    if format.is_json() {
        render_json(&tree)?;
        return Ok(());
    }

    println!(
        "Minimum spanning tree over the largest component: {}, {}, {} in total.",
        plural(tree.airports, "airport"),
        plural(tree.edges.len(), "edge"),
        format_km(tree.total_km)
    );
    if args.edges {
        for edge in &tree.edges {
            println!("  {} - {}  {}", edge.a, edge.b, format_km(edge.distance_km));
        }
    }
    Ok(())
}
