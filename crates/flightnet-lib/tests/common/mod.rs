//! Shared network fixtures for integration tests.

use std::path::PathBuf;

use flightnet_lib::{load_network, Airport, Network, RouteRecord};

/// Directory holding the small OpenFlights-format dataset.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Fixture dataset: ten airports, every route flown in both directions, KEF isolated.
#[allow(dead_code)]
pub fn fixture_network() -> Network {
    load_network(&fixtures_dir()).expect("fixture dataset loads")
}

/// A(pop 10), B and C with A -> B, B -> C and a direct A -> C, plus an
/// isolated D.
///
/// B sits off the A-C great circle, so the direct flight is both the
/// fewest-hops and the shortest route.
#[allow(dead_code)]
pub fn scenario_network() -> Network {
    Network::new(
        vec![
            Airport::new("A", 0.0, 0.0).with_population(10),
            Airport::new("B", 0.5, 1.0).with_population(0),
            Airport::new("C", 0.0, 2.0).with_population(0),
            Airport::new("D", 10.0, 10.0).with_population(0),
        ],
        vec![
            RouteRecord::new("A", "B", "XX"),
            RouteRecord::new("B", "C", "XX"),
            RouteRecord::new("A", "C", "YY"),
        ],
    )
    .expect("valid scenario network")
}

/// P -> Q -> R -> S along the equator and a two-flight P -> X -> S detour
/// through a far-away hub, so fewest flights and shortest distance disagree.
#[allow(dead_code)]
pub fn detour_network() -> Network {
    Network::new(
        vec![
            Airport::new("P", 0.0, 0.0),
            Airport::new("Q", 0.0, 1.0),
            Airport::new("R", 0.0, 2.0),
            Airport::new("S", 0.0, 3.0),
            Airport::new("X", 20.0, 1.5),
        ],
        vec![
            RouteRecord::new("P", "Q", "EQ"),
            RouteRecord::new("Q", "R", "EQ"),
            RouteRecord::new("R", "S", "EQ"),
            RouteRecord::new("P", "X", "HB"),
            RouteRecord::new("X", "S", "HB"),
        ],
    )
    .expect("valid detour network")
}

/// Grid of airports where every route has a reverse.
#[allow(dead_code)]
pub fn symmetric_network() -> Network {
    let codes = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"];
    let airports = codes
        .iter()
        .enumerate()
        .map(|(i, code)| Airport::new(*code, (i / 3) as f64, (i % 3) as f64))
        .collect();
    let legs = [
        ("AAA", "BBB"),
        ("BBB", "CCC"),
        ("AAA", "DDD"),
        ("BBB", "EEE"),
        ("CCC", "FFF"),
        ("DDD", "EEE"),
    ];
    let routes = legs
        .iter()
        .flat_map(|(a, b)| [RouteRecord::new(*a, *b, "SY"), RouteRecord::new(*b, *a, "SY")])
        .collect();
    Network::new(airports, routes).expect("valid symmetric network")
}
