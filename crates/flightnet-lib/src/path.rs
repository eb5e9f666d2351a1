//! Pathfinding over a [`Network`]: fewest flights, shortest distance and
//! bounded enumeration of every simple route.
//!
//! All functions are read-only over the network and keep no state between
//! calls, so they can run concurrently against a shared instance.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::network::{AirportIndex, Connection, Network};

/// Practical hop budget for [`all_paths`]. The number of simple paths grows
/// combinatorially with hub fan-out beyond this.
pub const RECOMMENDED_MAX_HOPS: usize = 3;

/// Route through the network with its total great-circle length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestRoute {
    pub total_km: f64,
    pub path: Vec<String>,
}

impl ShortestRoute {
    /// Number of flights in the route.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// One simple path returned by [`all_paths`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRecord {
    pub path: Vec<String>,
    pub total_km: f64,
    /// Airlines serving each consecutive leg of `path`.
    pub airlines_per_leg: Vec<BTreeSet<String>>,
}

impl PathRecord {
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Options for bounded path enumeration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSearch<'c> {
    /// Maximum number of flights in a returned path.
    pub max_hops: usize,
    /// Only return paths with exactly `max_hops` flights.
    pub exact_hops: bool,
    /// Checked before every branch expansion; setting it aborts the search.
    pub cancel: Option<&'c AtomicBool>,
}

impl<'c> PathSearch<'c> {
    /// Paths using at most `max_hops` flights.
    pub fn within(max_hops: usize) -> Self {
        Self {
            max_hops,
            exact_hops: false,
            cancel: None,
        }
    }

    /// Paths using exactly `hops` flights.
    pub fn exactly(hops: usize) -> Self {
        Self {
            max_hops: hops,
            exact_hops: true,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, flag: &'c AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .map(|flag| flag.load(AtomicOrdering::Relaxed))
            .unwrap_or(false)
    }
}

/// Minimum number of flights from `origin` to `destination`.
///
/// Fails with [`Error::NoPath`] when the destination is unreachable and with
/// [`Error::UnknownAirport`] when either code is missing.
pub fn hop_distance(network: &Network, origin: &str, destination: &str) -> Result<usize> {
    let start = network.index_of(origin)?;
    let goal = network.index_of(destination)?;
    find_route_bfs(network, start, goal)
        .map(|steps| steps.len() - 1)
        .ok_or_else(|| no_path(origin, destination))
}

/// Route with the fewest flights, reporting its geographic length as well.
pub fn fewest_hops_route(
    network: &Network,
    origin: &str,
    destination: &str,
) -> Result<ShortestRoute> {
    let start = network.index_of(origin)?;
    let goal = network.index_of(destination)?;
    let steps = find_route_bfs(network, start, goal).ok_or_else(|| no_path(origin, destination))?;

    let total_km = steps
        .windows(2)
        .filter_map(|pair| leg(network, pair[0], pair[1]))
        .map(|connection| connection.distance_km)
        .sum();

    Ok(ShortestRoute {
        total_km,
        path: to_codes(network, &steps),
    })
}

/// Minimum total distance from `origin` to `destination` and the route achieving it.
///
/// Equal-cost routes are resolved deterministically: the queue settles
/// airports by (distance, airport index) and a predecessor is only replaced
/// by a strictly shorter one.
pub fn shortest_distance(
    network: &Network,
    origin: &str,
    destination: &str,
) -> Result<ShortestRoute> {
    let start = network.index_of(origin)?;
    let goal = network.index_of(destination)?;
    let (total_km, steps) =
        find_route_dijkstra(network, start, goal).ok_or_else(|| no_path(origin, destination))?;

    Ok(ShortestRoute {
        total_km,
        path: to_codes(network, &steps),
    })
}

/// Every simple path from `origin` to `destination` using at most `max_hops`
/// flights, sorted by ascending total distance.
///
/// An empty result means no path fits the budget. Callers should keep
/// `max_hops` at or below [`RECOMMENDED_MAX_HOPS`].
pub fn all_paths(
    network: &Network,
    origin: &str,
    destination: &str,
    max_hops: usize,
) -> Result<Vec<PathRecord>> {
    all_paths_with(network, origin, destination, &PathSearch::within(max_hops))
}

/// [`all_paths`] with exact-hop filtering and cooperative cancellation.
pub fn all_paths_with(
    network: &Network,
    origin: &str,
    destination: &str,
    search: &PathSearch<'_>,
) -> Result<Vec<PathRecord>> {
    let start = network.index_of(origin)?;
    let goal = network.index_of(destination)?;

    if search.max_hops > RECOMMENDED_MAX_HOPS {
        let expansions = estimated_expansions(network, origin, search.max_hops)?;
        warn!(
            max_hops = search.max_hops,
            expansions,
            "path enumeration beyond {RECOMMENDED_MAX_HOPS} hops may be very slow"
        );
    }

    if start == goal {
        let trivial = !search.exact_hops || search.max_hops == 0;
        return Ok(trivial
            .then(|| PathRecord {
                path: vec![origin.to_string()],
                total_km: 0.0,
                airlines_per_leg: Vec::new(),
            })
            .into_iter()
            .collect());
    }

    let mut walker = PathWalker {
        network,
        goal,
        search,
        on_path: vec![false; network.len()],
        nodes: vec![start],
        legs: Vec::new(),
        found: Vec::new(),
    };
    walker.on_path[start] = true;
    walker.extend(start)?;

    let mut found = walker.found;
    found.sort_by(|a, b| a.total_km.total_cmp(&b.total_km));
    debug!(
        origin,
        destination,
        max_hops = search.max_hops,
        paths = found.len(),
        "enumerated simple paths"
    );
    Ok(found)
}

/// Upper bound on the branch expansions [`all_paths`] may perform from
/// `origin`, assuming every deeper airport has the network's largest degree.
pub fn estimated_expansions(network: &Network, origin: &str, max_hops: usize) -> Result<u128> {
    let first = network.connections(network.index_of(origin)?).len() as u128;
    let widest = (0..network.len())
        .map(|idx| network.connections(idx).len())
        .max()
        .unwrap_or(0) as u128;

    let mut level = first;
    let mut total = 0u128;
    for _ in 0..max_hops {
        total = total.saturating_add(level);
        level = level.saturating_mul(widest);
    }
    Ok(total)
}

/// Sum of leg distances along `path`.
///
/// Fails with [`Error::NoPath`] when consecutive airports are not connected.
pub fn path_distance_km<S: AsRef<str>>(network: &Network, path: &[S]) -> Result<f64> {
    let mut total = 0.0;
    for pair in path.windows(2) {
        let (from, to) = (pair[0].as_ref(), pair[1].as_ref());
        network.index_of(from)?;
        network.index_of(to)?;
        let connection = network
            .connection(from, to)
            .ok_or_else(|| no_path(from, to))?;
        total += connection.distance_km;
    }
    Ok(total)
}

/// Bounded depth-first enumeration. `on_path` is set on entry and cleared on
/// exit, so sibling branches may revisit airports used by other branches.
struct PathWalker<'n, 's> {
    network: &'n Network,
    goal: AirportIndex,
    search: &'s PathSearch<'s>,
    on_path: Vec<bool>,
    nodes: Vec<AirportIndex>,
    legs: Vec<&'n Connection>,
    found: Vec<PathRecord>,
}

impl<'n> PathWalker<'n, '_> {
    fn extend(&mut self, node: AirportIndex) -> Result<()> {
        // edges used once one more leg is appended
        let hops = self.legs.len() + 1;
        if hops > self.search.max_hops {
            return Ok(());
        }

        let network = self.network;
        for connection in network.connections(node) {
            if self.search.is_cancelled() {
                return Err(Error::SearchCancelled);
            }

            if connection.target == self.goal {
                if !self.search.exact_hops || hops == self.search.max_hops {
                    self.record(connection);
                }
                continue;
            }
            if self.on_path[connection.target] || hops == self.search.max_hops {
                continue;
            }

            self.on_path[connection.target] = true;
            self.nodes.push(connection.target);
            self.legs.push(connection);

            let result = self.extend(connection.target);

            self.legs.pop();
            self.nodes.pop();
            self.on_path[connection.target] = false;
            result?;
        }
        Ok(())
    }

    fn record(&mut self, last: &'n Connection) {
        let legs = self.legs.iter().copied().chain(std::iter::once(last));
        let mut total_km = 0.0;
        let mut airlines_per_leg = Vec::with_capacity(self.legs.len() + 1);
        for connection in legs {
            total_km += connection.distance_km;
            airlines_per_leg.push(connection.airlines.clone());
        }

        let mut path = to_codes(self.network, &self.nodes);
        path.push(last.destination.clone());

        self.found.push(PathRecord {
            path,
            total_km,
            airlines_per_leg,
        });
    }
}

pub(crate) fn find_route_bfs(
    network: &Network,
    start: AirportIndex,
    goal: AirportIndex,
) -> Option<Vec<AirportIndex>> {
    if start == goal {
        return Some(vec![start]);
    }

    let mut parents: Vec<Option<AirportIndex>> = vec![None; network.len()];
    let mut visited = vec![false; network.len()];
    let mut queue = VecDeque::new();

    visited[start] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for connection in network.connections(current) {
            let next = connection.target;
            if visited[next] {
                continue;
            }

            visited[next] = true;
            parents[next] = Some(current);
            if next == goal {
                return Some(reconstruct_path(&parents, start, goal));
            }
            queue.push_back(next);
        }
    }

    None
}

fn find_route_dijkstra(
    network: &Network,
    start: AirportIndex,
    goal: AirportIndex,
) -> Option<(f64, Vec<AirportIndex>)> {
    if start == goal {
        return Some((0.0, vec![start]));
    }

    let mut distances = vec![f64::INFINITY; network.len()];
    let mut parents: Vec<Option<AirportIndex>> = vec![None; network.len()];
    let mut queue = BinaryHeap::new();

    distances[start] = 0.0;
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = distances[entry.node];
        if entry.cost.0 > current_distance {
            continue;
        }

        if entry.node == goal {
            return Some((current_distance, reconstruct_path(&parents, start, goal)));
        }

        for connection in network.connections(entry.node) {
            let next = connection.target;
            let next_cost = current_distance + connection.distance_km;
            if next_cost < distances[next] {
                distances[next] = next_cost;
                parents[next] = Some(entry.node);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    None
}

fn reconstruct_path(
    parents: &[Option<AirportIndex>],
    start: AirportIndex,
    goal: AirportIndex,
) -> Vec<AirportIndex> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents[node];
    }
    path.reverse();
    path
}

fn leg(network: &Network, from: AirportIndex, to: AirportIndex) -> Option<&Connection> {
    network.connections(from).iter().find(|c| c.target == to)
}

fn to_codes(network: &Network, steps: &[AirportIndex]) -> Vec<String> {
    steps
        .iter()
        .map(|idx| network.code(*idx).to_string())
        .collect()
}

fn no_path(origin: &str, destination: &str) -> Error {
    Error::NoPath {
        origin: origin.to_string(),
        destination: destination.to_string(),
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: AirportIndex,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: AirportIndex, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
