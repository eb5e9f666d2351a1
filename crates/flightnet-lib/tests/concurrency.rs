mod common;

use std::thread;

use flightnet_lib::{all_paths, hop_distance, shortest_distance, PopulationSampler};
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::fixture_network;

const PAIRS: [(&str, &str); 4] = [
    ("CDG", "SYD"),
    ("LHR", "LAX"),
    ("SIN", "ORD"),
    ("FRA", "KEF"),
];

#[test]
fn concurrent_queries_match_sequential_results() {
    let network = fixture_network();

    let expected: Vec<_> = PAIRS
        .iter()
        .map(|(a, b)| {
            (
                hop_distance(&network, a, b).ok(),
                shortest_distance(&network, a, b).ok(),
                all_paths(&network, a, b, 3).unwrap(),
            )
        })
        .collect();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = network.clone();
                scope.spawn(move || {
                    PAIRS
                        .iter()
                        .map(|(a, b)| {
                            (
                                hop_distance(&shared, a, b).ok(),
                                shortest_distance(&shared, a, b).ok(),
                                all_paths(&shared, a, b, 3).unwrap(),
                            )
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn one_generator_per_thread_keeps_draws_reproducible() {
    let network = fixture_network();
    let sampler = PopulationSampler::new(&network).unwrap();

    let draw = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..100)
            .map(|_| sampler.weighted_random_pair(&mut rng).unwrap())
            .collect::<Vec<_>>()
    };

    let sequential: Vec<_> = (0..4).map(draw).collect();
    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|seed| scope.spawn(move || draw(seed))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(sequential, parallel);
}
