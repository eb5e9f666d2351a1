//! Population-biased random airport sampling.
//!
//! The random source is always supplied by the caller, so a seeded generator
//! reproduces the same draws for the same network. Airports are indexed in
//! code order, which keeps the mapping from draws to airports stable.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::network::{AirportIndex, Network};

/// Destination redraws allowed before a pair draw is declared degenerate.
pub const MAX_PAIR_ATTEMPTS: usize = 100;

/// Draws airports with probability proportional to the population they serve.
#[derive(Debug, Clone)]
pub struct PopulationSampler<'a> {
    network: &'a Network,
    /// `None` when every airport has zero population.
    weights: Option<WeightedIndex<u64>>,
    candidates: usize,
}

impl<'a> PopulationSampler<'a> {
    /// Prepare a sampler over `network`.
    ///
    /// Airports with a missing population weigh zero. When no airport has a
    /// positive population the sampler falls back to uniform selection.
    pub fn new(network: &'a Network) -> Result<Self> {
        if network.is_empty() {
            return Err(Error::DegenerateNetwork {
                reason: "network has no airports".to_string(),
            });
        }

        let populations: Vec<u64> = network
            .airports()
            .iter()
            .map(|airport| airport.population.unwrap_or(0))
            .collect();
        let positive = populations.iter().filter(|p| **p > 0).count();

        let (weights, candidates) = match WeightedIndex::new(&populations) {
            Ok(index) => (Some(index), positive),
            Err(err) => {
                debug!(%err, "population weights unusable, sampling airports uniformly");
                (None, network.len())
            }
        };

        Ok(Self {
            network,
            weights,
            candidates,
        })
    }

    /// Whether draws ignore population because no airport carries any.
    pub fn is_uniform_fallback(&self) -> bool {
        self.weights.is_none()
    }

    /// Number of airports that can be drawn at all.
    pub fn candidate_count(&self) -> usize {
        self.candidates
    }

    /// Draw one airport code, biased by population.
    pub fn weighted_random_airport<R: Rng + ?Sized>(&self, rng: &mut R) -> &'a str {
        let network = self.network;
        network.code(self.sample_index(rng))
    }

    /// Draw an origin and a distinct destination independently.
    ///
    /// The destination is redrawn while it equals the origin, at most
    /// [`MAX_PAIR_ATTEMPTS`] times.
    pub fn weighted_random_pair<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(&'a str, &'a str)> {
        if self.candidates < 2 {
            return Err(Error::DegenerateNetwork {
                reason: format!(
                    "{} airport(s) can be sampled, at least two are required",
                    self.candidates
                ),
            });
        }

        let origin = self.sample_index(rng);
        for attempt in 1..=MAX_PAIR_ATTEMPTS {
            let destination = self.sample_index(rng);
            if destination != origin {
                let network = self.network;
                return Ok((network.code(origin), network.code(destination)));
            }
            debug!(
                attempt,
                origin = self.network.code(origin),
                "destination matched origin, redrawing"
            );
        }

        Err(Error::DegenerateNetwork {
            reason: format!(
                "no distinct destination drawn for {} after {MAX_PAIR_ATTEMPTS} attempts",
                self.network.code(origin)
            ),
        })
    }

    /// Draw two distinct airports uniformly, ignoring population.
    pub fn uniform_random_pair<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(&'a str, &'a str)> {
        let network = self.network;
        if network.len() < 2 {
            return Err(Error::DegenerateNetwork {
                reason: "at least two airports are required".to_string(),
            });
        }
        let picked = rand::seq::index::sample(rng, network.len(), 2);
        Ok((network.code(picked.index(0)), network.code(picked.index(1))))
    }

    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> AirportIndex {
        match &self.weights {
            Some(weights) => weights.sample(rng),
            None => rng.gen_range(0..self.network.len()),
        }
    }
}
