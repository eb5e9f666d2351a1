//! In-memory flight network: airports, routes and the adjacency built from them.
//!
//! A [`Network`] is validated once at construction and is immutable
//! afterwards. All graph storage sits behind [`Arc`] so clones are cheap and
//! a single instance can be queried from any number of threads.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{distance_km, Coordinate};

/// Position of an airport inside a [`Network`]. Indices follow airport code order.
pub type AirportIndex = usize;

/// Minimum similarity score for an airport to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Airport record as supplied by the data loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Population of the served city; `None` samples with zero weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

impl Airport {
    /// Create an airport with empty descriptive fields and no population.
    pub fn new(code: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            city: String::new(),
            country: String::new(),
            coordinate: Coordinate::new(latitude, longitude),
            population: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_location(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.city = city.into();
        self.country = country.into();
        self
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }

    /// Human-readable label, e.g. `London Heathrow (LHR)`.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.code.clone()
        } else {
            format!("{} ({})", self.name, self.code)
        }
    }
}

/// Directed airline route as supplied by the data loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteRecord {
    pub source: String,
    pub destination: String,
    pub airline: String,
}

impl RouteRecord {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        airline: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            airline: airline.into(),
        }
    }
}

/// Validated route with its derived great-circle distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub source: String,
    pub destination: String,
    pub airline: String,
    pub distance_km: f64,
}

/// Collapsed view of every route from one airport to one destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub target: AirportIndex,
    pub destination: String,
    pub distance_km: f64,
    /// Airlines operating this leg, in code order.
    pub airlines: BTreeSet<String>,
}

/// Immutable directed multigraph of airports and routes.
#[derive(Debug, Clone, Default)]
pub struct Network {
    airports: Arc<Vec<Airport>>,
    index: Arc<HashMap<String, AirportIndex>>,
    adjacency: Arc<Vec<Vec<Connection>>>,
    routes: Arc<Vec<Route>>,
}

impl Network {
    /// Build a network from finalized loader output.
    ///
    /// Construction fails fast on duplicate airport codes, duplicate
    /// (source, destination, airline) routes, routes with unknown endpoints
    /// and self loops. Route distances are always recomputed from the airport
    /// coordinates.
    pub fn new(mut airports: Vec<Airport>, routes: Vec<RouteRecord>) -> Result<Self> {
        airports.sort_by(|a, b| a.code.cmp(&b.code));
        if let Some(pair) = airports.windows(2).find(|pair| pair[0].code == pair[1].code) {
            return Err(Error::DuplicateAirport {
                code: pair[0].code.clone(),
            });
        }

        let index: HashMap<String, AirportIndex> = airports
            .iter()
            .enumerate()
            .map(|(idx, airport)| (airport.code.clone(), idx))
            .collect();

        let mut pending: Vec<BTreeMap<AirportIndex, Connection>> =
            vec![BTreeMap::new(); airports.len()];
        let mut validated = Vec::with_capacity(routes.len());

        for record in routes {
            let lookup = |code: &str| {
                index
                    .get(code)
                    .copied()
                    .ok_or_else(|| Error::UnknownRouteEndpoint {
                        origin: record.source.clone(),
                        destination: record.destination.clone(),
                        missing: code.to_string(),
                    })
            };
            let from = lookup(&record.source)?;
            let to = lookup(&record.destination)?;
            if from == to {
                return Err(Error::SelfLoopRoute {
                    code: record.source,
                    airline: record.airline,
                });
            }

            let connection = pending[from].entry(to).or_insert_with(|| Connection {
                target: to,
                destination: airports[to].code.clone(),
                distance_km: distance_km(airports[from].coordinate, airports[to].coordinate),
                airlines: BTreeSet::new(),
            });
            if !connection.airlines.insert(record.airline.clone()) {
                return Err(Error::DuplicateRoute {
                    origin: record.source,
                    destination: record.destination,
                    airline: record.airline,
                });
            }

            validated.push(Route {
                distance_km: connection.distance_km,
                source: record.source,
                destination: record.destination,
                airline: record.airline,
            });
        }

        let adjacency: Vec<Vec<Connection>> = pending
            .into_iter()
            .map(|targets| targets.into_values().collect())
            .collect();

        debug!(
            airports = airports.len(),
            routes = validated.len(),
            "built flight network"
        );

        Ok(Self {
            airports: Arc::new(airports),
            index: Arc::new(index),
            adjacency: Arc::new(adjacency),
            routes: Arc::new(validated),
        })
    }

    /// Number of airports in the network.
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Number of individual airline routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Number of distinct directed airport pairs with at least one route.
    pub fn connection_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// All airports, ordered by code.
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// All routes in the order they were supplied.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Resolve an airport code to its index.
    pub fn index_of(&self, code: &str) -> Result<AirportIndex> {
        self.index
            .get(code)
            .copied()
            .ok_or_else(|| Error::UnknownAirport {
                code: code.to_string(),
                suggestions: self.fuzzy_airport_matches(code, 3),
            })
    }

    /// Airport code stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn code(&self, index: AirportIndex) -> &str {
        &self.airports[index].code
    }

    pub fn airport(&self, code: &str) -> Result<&Airport> {
        let idx = self.index_of(code)?;
        Ok(&self.airports[idx])
    }

    /// Distinct outgoing destinations of an airport with the airlines serving each.
    pub fn neighbors(&self, code: &str) -> Result<&[Connection]> {
        let idx = self.index_of(code)?;
        Ok(self.connections(idx))
    }

    /// Count of distinct outgoing destinations.
    pub fn degree(&self, code: &str) -> Result<usize> {
        let idx = self.index_of(code)?;
        Ok(self.adjacency[idx].len())
    }

    /// Collapsed connection between two airports, if any route exists.
    pub fn connection(&self, from: &str, to: &str) -> Option<&Connection> {
        let from = self.index.get(from)?;
        let to = self.index.get(to)?;
        self.adjacency[*from].iter().find(|c| c.target == *to)
    }

    pub(crate) fn connections(&self, index: AirportIndex) -> &[Connection] {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// New network holding only airports whose degree is at least `threshold`.
    ///
    /// Degrees are measured on this network. Routes survive only when both
    /// endpoints survive, so the result is a valid network in its own right.
    pub fn subgraph_by_min_degree(&self, threshold: usize) -> Network {
        let keep: Vec<bool> = self
            .adjacency
            .iter()
            .map(|targets| targets.len() >= threshold)
            .collect();

        let mut remap: Vec<Option<AirportIndex>> = vec![None; self.len()];
        let mut airports = Vec::new();
        for (old, airport) in self.airports.iter().enumerate() {
            if keep[old] {
                remap[old] = Some(airports.len());
                airports.push(airport.clone());
            }
        }

        let adjacency: Vec<Vec<Connection>> = self
            .adjacency
            .iter()
            .enumerate()
            .filter(|(old, _)| keep[*old])
            .map(|(_, targets)| {
                targets
                    .iter()
                    .filter_map(|connection| {
                        remap[connection.target].map(|target| Connection {
                            target,
                            ..connection.clone()
                        })
                    })
                    .collect()
            })
            .collect();

        let survives = |code: &str| self.index.get(code).is_some_and(|idx| keep[*idx]);
        let routes: Vec<Route> = self
            .routes
            .iter()
            .filter(|route| survives(&route.source) && survives(&route.destination))
            .cloned()
            .collect();

        let index = airports
            .iter()
            .enumerate()
            .map(|(idx, airport)| (airport.code.clone(), idx))
            .collect();

        debug!(
            threshold,
            airports = airports.len(),
            routes = routes.len(),
            "filtered network by minimum degree"
        );

        Network {
            airports: Arc::new(airports),
            index: Arc::new(index),
            adjacency: Arc::new(adjacency),
            routes: Arc::new(routes),
        }
    }

    /// Airport codes resembling `query`, best match first.
    ///
    /// Both the code and the airport name are compared, so `"heathrow"` and
    /// `"LHX"` both suggest `LHR`.
    pub fn fuzzy_airport_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let code_query = query.to_ascii_uppercase();
        let name_query = query.to_lowercase();

        let mut scored: Vec<(f64, &str)> = self
            .airports
            .iter()
            .filter_map(|airport| {
                let by_code = strsim::jaro_winkler(&code_query, &airport.code);
                let by_name = if airport.name.is_empty() {
                    0.0
                } else {
                    strsim::jaro_winkler(&name_query, &airport.name.to_lowercase())
                };
                let score = by_code.max(by_name);
                (score >= SUGGESTION_THRESHOLD).then_some((score, airport.code.as_str()))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, code)| code.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Network {
        Network::new(
            vec![
                Airport::new("CCC", 0.0, 2.0),
                Airport::new("AAA", 0.0, 0.0),
                Airport::new("BBB", 0.0, 1.0),
            ],
            vec![
                RouteRecord::new("AAA", "BBB", "XX"),
                RouteRecord::new("AAA", "BBB", "YY"),
                RouteRecord::new("AAA", "CCC", "XX"),
                RouteRecord::new("BBB", "CCC", "ZZ"),
            ],
        )
        .expect("valid network")
    }

    #[test]
    fn airports_are_ordered_by_code() {
        let network = triangle();
        let codes: Vec<_> = network.airports().iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(network.index_of("BBB").unwrap(), 1);
        assert_eq!(network.code(2), "CCC");
    }

    #[test]
    fn parallel_routes_collapse_into_one_connection() {
        let network = triangle();
        let neighbours = network.neighbors("AAA").unwrap();
        assert_eq!(neighbours.len(), 2);
        assert_eq!(neighbours[0].destination, "BBB");
        assert_eq!(
            neighbours[0].airlines.iter().cloned().collect::<Vec<_>>(),
            vec!["XX".to_string(), "YY".to_string()]
        );
        assert_eq!(network.degree("AAA").unwrap(), 2);
        assert_eq!(network.route_count(), 4);
        assert_eq!(network.connection_count(), 3);
    }

    #[test]
    fn route_distances_are_derived_from_coordinates() {
        let network = triangle();
        let expected = distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        for route in network.routes().iter().filter(|r| r.destination == "BBB") {
            assert_eq!(route.distance_km, expected);
        }
        let connection = network.connection("AAA", "BBB").unwrap();
        assert_eq!(connection.distance_km, expected);
        assert!(network.connection("BBB", "AAA").is_none());
    }

    #[test]
    fn construction_rejects_invalid_input() {
        let err = Network::new(
            vec![Airport::new("AAA", 0.0, 0.0), Airport::new("AAA", 1.0, 1.0)],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateAirport { code } if code == "AAA"));

        let err = Network::new(
            vec![Airport::new("AAA", 0.0, 0.0)],
            vec![RouteRecord::new("AAA", "QQQ", "XX")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownRouteEndpoint { missing, .. } if missing == "QQQ"));

        let err = Network::new(
            vec![Airport::new("AAA", 0.0, 0.0)],
            vec![RouteRecord::new("AAA", "AAA", "XX")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::SelfLoopRoute { .. }));

        let err = Network::new(
            vec![Airport::new("AAA", 0.0, 0.0), Airport::new("BBB", 0.0, 1.0)],
            vec![
                RouteRecord::new("AAA", "BBB", "XX"),
                RouteRecord::new("AAA", "BBB", "XX"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { .. }));
    }

    #[test]
    fn unknown_airport_queries_fail() {
        let network = triangle();
        assert!(matches!(
            network.neighbors("ZZZ"),
            Err(Error::UnknownAirport { .. })
        ));
        assert!(matches!(
            network.degree("ZZZ"),
            Err(Error::UnknownAirport { .. })
        ));
    }

    #[test]
    fn min_degree_subgraph_drops_spokes_and_their_routes() {
        let network = triangle();
        let filtered = network.subgraph_by_min_degree(1);
        let codes: Vec<_> = filtered.airports().iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["AAA", "BBB"]);
        assert_eq!(filtered.route_count(), 2);
        assert_eq!(filtered.neighbors("AAA").unwrap().len(), 1);
        assert_eq!(filtered.neighbors("AAA").unwrap()[0].target, 1);

        // original is untouched
        assert_eq!(network.len(), 3);
        assert_eq!(network.route_count(), 4);
    }

    #[test]
    fn fuzzy_matches_suggest_close_codes() {
        let network = Network::new(
            vec![
                Airport::new("LHR", 51.47, -0.46).with_name("London Heathrow"),
                Airport::new("JFK", 40.64, -73.78).with_name("John F Kennedy"),
            ],
            Vec::new(),
        )
        .unwrap();

        let by_code = network.fuzzy_airport_matches("LHX", 3);
        assert_eq!(by_code.first().map(String::as_str), Some("LHR"));
        let by_name = network.fuzzy_airport_matches("london heathrow", 3);
        assert_eq!(by_name.first().map(String::as_str), Some("LHR"));
        assert!(network.fuzzy_airport_matches("QQQQQQQQ", 3).is_empty());
    }
}
