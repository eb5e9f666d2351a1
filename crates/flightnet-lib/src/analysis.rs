//! Whole-network statistics: all-pairs hop counts and the minimum spanning tree.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::network::{AirportIndex, Network};
use crate::path::find_route_bfs;

/// Fewest-flights routes at least this long are listed by [`hop_summary`].
pub const LONG_ROUTE_HOPS: usize = 10;

/// Longest fewest-flights route found among reachable ordered pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongestRoute {
    pub origin: String,
    pub destination: String,
    pub hops: usize,
    pub path: Vec<String>,
}

/// Hop statistics over every ordered pair of distinct airports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopSummary {
    pub ordered_pairs: usize,
    pub reachable_pairs: usize,
    pub unreachable_pairs: usize,
    /// Mean hop count over reachable pairs.
    pub average_hops: Option<f64>,
    /// Number of reachable pairs per hop count.
    pub histogram: BTreeMap<usize, usize>,
    pub longest: Option<LongestRoute>,
    /// Ordered pairs whose fewest-flights route needs at least the long-route
    /// threshold, grouped by hop count and sorted by code.
    pub long_routes: BTreeMap<usize, Vec<(String, String)>>,
}

#[derive(Debug, Default)]
struct SourceStats {
    reachable: usize,
    hop_total: usize,
    histogram: BTreeMap<usize, usize>,
    farthest: Option<(AirportIndex, usize)>,
    long: Vec<(AirportIndex, usize)>,
}

/// Breadth-first search from every airport.
///
/// Sources are processed in parallel and merged in airport order, so the
/// reported longest route is the first one found in code order. Pairs
/// needing [`LONG_ROUTE_HOPS`] flights or more are listed in `long_routes`.
pub fn hop_summary(network: &Network) -> HopSummary {
    hop_summary_with_threshold(network, LONG_ROUTE_HOPS)
}

/// [`hop_summary`] with a caller-chosen long-route threshold.
pub fn hop_summary_with_threshold(network: &Network, long_route_hops: usize) -> HopSummary {
    let per_source: Vec<SourceStats> = (0..network.len())
        .into_par_iter()
        .map(|source| source_stats(network, source, long_route_hops))
        .collect();

    let n = network.len();
    let ordered_pairs = n * n.saturating_sub(1);
    let mut reachable_pairs = 0;
    let mut hop_total = 0;
    let mut histogram = BTreeMap::new();
    let mut longest: Option<(AirportIndex, AirportIndex, usize)> = None;
    let mut long_routes: BTreeMap<usize, Vec<(String, String)>> = BTreeMap::new();

    for (source, stats) in per_source.into_iter().enumerate() {
        reachable_pairs += stats.reachable;
        hop_total += stats.hop_total;
        for (hops, count) in stats.histogram {
            *histogram.entry(hops).or_insert(0) += count;
        }
        if let Some((target, hops)) = stats.farthest {
            if longest.map_or(true, |(_, _, best)| hops > best) {
                longest = Some((source, target, hops));
            }
        }
        for (target, hops) in stats.long {
            long_routes.entry(hops).or_default().push((
                network.code(source).to_string(),
                network.code(target).to_string(),
            ));
        }
    }

    let longest = longest.and_then(|(source, target, hops)| {
        find_route_bfs(network, source, target).map(|steps| LongestRoute {
            origin: network.code(source).to_string(),
            destination: network.code(target).to_string(),
            hops,
            path: steps
                .iter()
                .map(|idx| network.code(*idx).to_string())
                .collect(),
        })
    });

    debug!(ordered_pairs, reachable_pairs, "computed all-pairs hop summary");

    HopSummary {
        ordered_pairs,
        reachable_pairs,
        unreachable_pairs: ordered_pairs - reachable_pairs,
        average_hops: (reachable_pairs > 0).then(|| hop_total as f64 / reachable_pairs as f64),
        histogram,
        longest,
        long_routes,
    }
}

fn source_stats(network: &Network, source: AirportIndex, long_route_hops: usize) -> SourceStats {
    let mut hops: Vec<Option<usize>> = vec![None; network.len()];
    let mut frontier = vec![source];
    hops[source] = Some(0);
    let mut depth = 0;

    while !frontier.is_empty() {
        depth += 1;
        let mut next = Vec::new();
        for node in frontier {
            for connection in network.connections(node) {
                if hops[connection.target].is_none() {
                    hops[connection.target] = Some(depth);
                    next.push(connection.target);
                }
            }
        }
        frontier = next;
    }

    let mut stats = SourceStats::default();
    for (target, value) in hops.into_iter().enumerate() {
        let Some(count) = value else { continue };
        if target == source {
            continue;
        }
        stats.reachable += 1;
        stats.hop_total += count;
        *stats.histogram.entry(count).or_insert(0) += 1;
        if stats.farthest.map_or(true, |(_, best)| count > best) {
            stats.farthest = Some((target, count));
        }
        if count >= long_route_hops {
            stats.long.push((target, count));
        }
    }
    stats
}

/// Undirected edge kept in the spanning tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanningEdge {
    pub a: String,
    pub b: String,
    pub distance_km: f64,
}

/// Minimum spanning tree of the largest connected component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanningTree {
    pub airports: usize,
    pub edges: Vec<SpanningEdge>,
    pub total_km: f64,
}

/// Kruskal's algorithm over the undirected, distance-weighted view of the
/// network, restricted to its largest connected component.
///
/// Route direction is ignored. Component size ties go to the component
/// holding the lowest airport code.
pub fn minimum_spanning_tree(network: &Network) -> SpanningTree {
    let mut undirected: BTreeMap<(AirportIndex, AirportIndex), f64> = BTreeMap::new();
    for from in 0..network.len() {
        for connection in network.connections(from) {
            let key = (from.min(connection.target), from.max(connection.target));
            undirected.entry(key).or_insert(connection.distance_km);
        }
    }

    let mut candidates: Vec<((AirportIndex, AirportIndex), f64)> = undirected.into_iter().collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut sets = DisjointSet::new(network.len());
    let mut forest = Vec::new();
    for ((a, b), distance) in candidates {
        if sets.union(a, b) {
            forest.push((a, b, distance));
        }
    }

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    let mut largest: Option<(usize, usize)> = None;
    for node in 0..network.len() {
        let root = sets.find(node);
        *sizes.entry(root).or_insert(0) += 1;
    }
    for node in 0..network.len() {
        let root = sets.find(node);
        let size = sizes[&root];
        if largest.map_or(true, |(_, best)| size > best) {
            largest = Some((root, size));
        }
    }

    let Some((root, airports)) = largest else {
        return SpanningTree {
            airports: 0,
            edges: Vec::new(),
            total_km: 0.0,
        };
    };

    let edges: Vec<SpanningEdge> = forest
        .into_iter()
        .filter(|(a, _, _)| sets.find(*a) == root)
        .map(|(a, b, distance_km)| SpanningEdge {
            a: network.code(a).to_string(),
            b: network.code(b).to_string(),
            distance_km,
        })
        .collect();
    let total_km = edges.iter().map(|edge| edge.distance_km).sum();

    debug!(airports, edges = edges.len(), "computed minimum spanning tree");

    SpanningTree {
        airports,
        edges,
        total_km,
    }
}

struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return false;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Airport, RouteRecord};

    fn chain() -> Network {
        Network::new(
            vec![
                Airport::new("AAA", 0.0, 0.0),
                Airport::new("BBB", 0.0, 1.0),
                Airport::new("CCC", 0.0, 2.0),
                Airport::new("DDD", 0.0, 3.0),
                Airport::new("EEE", 10.0, 10.0),
            ],
            vec![
                RouteRecord::new("AAA", "BBB", "XX"),
                RouteRecord::new("BBB", "CCC", "XX"),
                RouteRecord::new("CCC", "DDD", "XX"),
                RouteRecord::new("AAA", "CCC", "YY"),
            ],
        )
        .expect("valid network")
    }

    #[test]
    fn hop_summary_counts_directed_pairs() {
        let summary = hop_summary(&chain());
        assert_eq!(summary.ordered_pairs, 20);
        // AAA reaches B, C, D; BBB reaches C, D; CCC reaches D.
        assert_eq!(summary.reachable_pairs, 6);
        assert_eq!(summary.unreachable_pairs, 14);
        assert_eq!(summary.histogram.get(&1), Some(&4));
        assert_eq!(summary.histogram.get(&2), Some(&2));

        let longest = summary.longest.expect("longest route");
        assert_eq!(longest.hops, 2);
        assert_eq!(longest.origin, "AAA");
        assert_eq!(longest.destination, "DDD");
        assert_eq!(longest.path, vec!["AAA", "CCC", "DDD"]);
    }

    #[test]
    fn hop_summary_of_empty_network() {
        let summary = hop_summary(&Network::default());
        assert_eq!(summary.ordered_pairs, 0);
        assert!(summary.average_hops.is_none());
        assert!(summary.longest.is_none());
        assert!(summary.long_routes.is_empty());
    }

    #[test]
    fn long_routes_are_grouped_by_hops() {
        let network = chain();
        assert!(hop_summary(&network).long_routes.is_empty());

        let summary = hop_summary_with_threshold(&network, 2);
        let pair = |origin: &str, destination: &str| (origin.to_string(), destination.to_string());
        assert_eq!(summary.long_routes.len(), 1);
        assert_eq!(
            summary.long_routes.get(&2),
            Some(&vec![pair("AAA", "DDD"), pair("BBB", "DDD")])
        );
    }

    #[test]
    fn spanning_tree_covers_largest_component() {
        let tree = minimum_spanning_tree(&chain());
        assert_eq!(tree.airports, 4);
        assert_eq!(tree.edges.len(), 3);
        // AAA-CCC is longer than AAA-BBB + BBB-CCC legs and is never needed.
        assert!(!tree.edges.iter().any(|e| e.a == "AAA" && e.b == "CCC"));
        let expected: f64 = tree.edges.iter().map(|e| e.distance_km).sum();
        assert_eq!(tree.total_km, expected);
    }

    #[test]
    fn disjoint_set_merges_once() {
        let mut sets = DisjointSet::new(3);
        assert!(sets.union(0, 1));
        assert!(!sets.union(1, 0));
        assert_eq!(sets.find(0), sets.find(1));
        assert_ne!(sets.find(0), sets.find(2));
    }
}
