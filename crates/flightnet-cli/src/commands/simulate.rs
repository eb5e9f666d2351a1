//! Sampling commands: `sample` and `simulate`.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

use flightnet_lib::{
    simulate, Network, PairSampling, PopulationSampler, SimulationConfig, SimulationMetric,
    DISTANCE_BUCKET_KM,
};

use crate::output::{format_km, format_with_separators, plural, render_json, OutputFormat};

/// Arguments for the `sample` command.
#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Number of airports (or pairs) to draw.
    #[arg(long, default_value_t = 10)]
    pub count: usize,
    /// Seed for reproducible draws; omitted means a fresh random seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Draw origin/destination pairs instead of single airports.
    #[arg(long)]
    pub pairs: bool,
}

/// Quantity measured by `simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MetricArg {
    #[default]
    Hops,
    Distance,
}

/// Pair selection used by `simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    /// Population-weighted independent draws.
    #[default]
    Weighted,
    /// Two distinct airports chosen uniformly.
    Uniform,
}

/// Arguments for the `simulate` command.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Number of random pairs to measure.
    #[arg(long, default_value_t = 1000)]
    pub samples: usize,
    /// Seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = MetricArg::Hops)]
    pub metric: MetricArg,
    #[arg(long, value_enum, default_value_t = ModeArg::Weighted)]
    pub mode: ModeArg,
}

impl SimulateArgs {
    /// Convert CLI args to a library simulation config.
    pub fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            samples: self.samples,
            metric: match self.metric {
                MetricArg::Hops => SimulationMetric::Hops,
                MetricArg::Distance => SimulationMetric::Distance,
            },
            sampling: match self.mode {
                ModeArg::Weighted => PairSampling::PopulationWeighted,
                ModeArg::Uniform => PairSampling::Uniform,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Draw<'a> {
    Airport(&'a str),
    Pair { origin: &'a str, destination: &'a str },
}

#[derive(Debug, Serialize)]
struct SampleOutput<'a> {
    seed: u64,
    uniform_fallback: bool,
    draws: Vec<Draw<'a>>,
}

fn seeded_rng(seed: Option<u64>) -> (u64, StdRng) {
    let seed = seed.unwrap_or_else(rand::random);
    debug!(seed, "seeding random generator");
    (seed, StdRng::seed_from_u64(seed))
}

/// Handle the `sample` subcommand.
pub fn handle_sample(network: &Network, args: &SampleArgs, format: OutputFormat) -> Result<()> {
    let sampler = PopulationSampler::new(network).context("cannot sample airports")?;
    let (seed, mut rng) = seeded_rng(args.seed);

    let mut draws = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        let draw = if args.pairs {
            let (origin, destination) = sampler
                .weighted_random_pair(&mut rng)
                .context("cannot draw an airport pair")?;
            Draw::Pair {
                origin,
                destination,
            }
        } else {
            Draw::Airport(sampler.weighted_random_airport(&mut rng))
        };
        draws.push(draw);
    }

    if format.is_json() {
        render_json(&SampleOutput {
            seed,
            uniform_fallback: sampler.is_uniform_fallback(),
            draws,
        })?;
        return Ok(());
    }

    if sampler.is_uniform_fallback() {
        println!("No airport has a population; sampling uniformly.");
    }
    println!("Seed {seed}:");
    for draw in &draws {
        match draw {
            Draw::Airport(code) => println!("  {code}"),
            Draw::Pair {
                origin,
                destination,
            } => println!("  {origin} -> {destination}"),
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SimulateOutput<'a> {
    seed: u64,
    #[serde(flatten)]
    summary: &'a flightnet_lib::SimulationSummary,
}

/// Handle the `simulate` subcommand: "degrees of separation" statistics.
pub fn handle_simulate(network: &Network, args: &SimulateArgs, format: OutputFormat) -> Result<()> {
    let sampler = PopulationSampler::new(network).context("cannot sample airports")?;
    let (seed, mut rng) = seeded_rng(args.seed);
    let config = args.to_config();

    let summary =
        simulate(network, &sampler, &mut rng, &config).context("simulation could not run")?;

    if format.is_json() {
        render_json(&SimulateOutput {
            seed,
            summary: &summary,
        })?;
        return Ok(());
    }

    println!(
        "{} drawn ({}, seed {seed}): {} reachable, {} unreachable.",
        plural(summary.samples, "pair"),
        summary.sampling,
        format_with_separators(summary.reachable as u64),
        format_with_separators(summary.unreachable as u64)
    );

    let Some(average) = summary.average else {
        println!("No sampled pair was connected.");
        return Ok(());
    };
    match summary.metric {
        SimulationMetric::Hops => {
            println!("Average flights: {average:.2}");
            for (hops, count) in &summary.histogram {
                println!("  {:<10} {}", plural(*hops, "flight"), count);
            }
        }
        SimulationMetric::Distance => {
            println!("Average distance: {}", format_km(average));
            for (bucket, count) in &summary.histogram {
                let low = *bucket as f64 * DISTANCE_BUCKET_KM;
                println!(
                    "  {:>10} - {:<10} {}",
                    format_km(low),
                    format_km(low + DISTANCE_BUCKET_KM),
                    count
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arguments_map_to_library_config() {
        let args = SimulateArgs {
            samples: 25,
            seed: Some(1),
            metric: MetricArg::Distance,
            mode: ModeArg::Uniform,
        };
        assert_eq!(
            args.to_config(),
            SimulationConfig {
                samples: 25,
                metric: SimulationMetric::Distance,
                sampling: PairSampling::Uniform,
            }
        );
    }

    #[test]
    fn explicit_seed_is_kept() {
        let (seed, _) = seeded_rng(Some(99));
        assert_eq!(seed, 99);
    }
}
