//! Repeated random-pair queries aggregated into "degrees of separation"
//! statistics.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::path::{hop_distance, shortest_distance};
use crate::sampler::PopulationSampler;

/// Width of the distance histogram buckets in kilometres.
pub const DISTANCE_BUCKET_KM: f64 = 1000.0;

/// Quantity measured for each sampled pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMetric {
    /// Fewest flights between the pair.
    #[default]
    Hops,
    /// Shortest total flight distance between the pair.
    Distance,
}

impl fmt::Display for SimulationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SimulationMetric::Hops => "hops",
            SimulationMetric::Distance => "distance",
        };
        f.write_str(value)
    }
}

/// How origin/destination pairs are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PairSampling {
    /// Independent draws biased by served population.
    #[default]
    PopulationWeighted,
    /// Two distinct airports chosen uniformly.
    Uniform,
}

impl fmt::Display for PairSampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PairSampling::PopulationWeighted => "population-weighted",
            PairSampling::Uniform => "uniform",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationConfig {
    pub samples: usize,
    pub metric: SimulationMetric,
    pub sampling: PairSampling,
}

/// Aggregate result of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub metric: SimulationMetric,
    pub sampling: PairSampling,
    pub samples: usize,
    pub reachable: usize,
    pub unreachable: usize,
    /// Mean hops or kilometres over reachable pairs.
    pub average: Option<f64>,
    /// Reachable pairs per hop count, or per [`DISTANCE_BUCKET_KM`] bucket.
    pub histogram: BTreeMap<usize, usize>,
}

/// Draw `config.samples` pairs and measure each one.
///
/// Unreachable pairs are counted rather than reported as errors. Sampling
/// failures such as [`Error::DegenerateNetwork`] abort the run.
pub fn simulate<R: Rng + ?Sized>(
    network: &Network,
    sampler: &PopulationSampler<'_>,
    rng: &mut R,
    config: &SimulationConfig,
) -> Result<SimulationSummary> {
    let mut reachable = 0usize;
    let mut unreachable = 0usize;
    let mut total = 0.0;
    let mut histogram = BTreeMap::new();

    for _ in 0..config.samples {
        let (origin, destination) = match config.sampling {
            PairSampling::PopulationWeighted => sampler.weighted_random_pair(rng)?,
            PairSampling::Uniform => sampler.uniform_random_pair(rng)?,
        };

        let measured = match config.metric {
            SimulationMetric::Hops => hop_distance(network, origin, destination)
                .map(|hops| (hops as f64, hops)),
            SimulationMetric::Distance => shortest_distance(network, origin, destination)
                .map(|route| (route.total_km, (route.total_km / DISTANCE_BUCKET_KM) as usize)),
        };

        match measured {
            Ok((value, bucket)) => {
                reachable += 1;
                total += value;
                *histogram.entry(bucket).or_insert(0) += 1;
            }
            Err(Error::NoPath { .. }) => unreachable += 1,
            Err(err) => return Err(err),
        }
    }

    let average = (reachable > 0).then(|| total / reachable as f64);
    info!(
        metric = %config.metric,
        sampling = %config.sampling,
        samples = config.samples,
        reachable,
        unreachable,
        "simulation complete"
    );

    Ok(SimulationSummary {
        metric: config.metric,
        sampling: config.sampling,
        samples: config.samples,
        reachable,
        unreachable,
        average,
        histogram,
    })
}
