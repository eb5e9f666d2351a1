//! Flight network library entry points.
//!
//! This crate loads airport and route data into an immutable directed
//! network, answers pathfinding queries over it (fewest flights, shortest
//! distance, bounded enumeration of every route), samples airports by the
//! population they serve and computes whole-network statistics. The CLI only
//! depends on the functions exported here.

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod geo;
pub mod network;
pub mod path;
pub mod sampler;
pub mod simulation;

pub use analysis::{
    hop_summary, hop_summary_with_threshold, minimum_spanning_tree, HopSummary, LongestRoute,
    SpanningEdge, SpanningTree, LONG_ROUTE_HOPS,
};
pub use dataset::{load_network, resolve_data_dir, NetworkData, DATA_DIR_ENV};
pub use error::{Error, Result};
pub use geo::{distance_km, Coordinate, EARTH_RADIUS_KM};
pub use network::{Airport, AirportIndex, Connection, Network, Route, RouteRecord};
pub use path::{
    all_paths, all_paths_with, estimated_expansions, fewest_hops_route, hop_distance,
    path_distance_km, shortest_distance, PathRecord, PathSearch, ShortestRoute,
    RECOMMENDED_MAX_HOPS,
};
pub use sampler::PopulationSampler;
pub use simulation::{
    simulate, PairSampling, SimulationConfig, SimulationMetric, SimulationSummary,
    DISTANCE_BUCKET_KM,
};
