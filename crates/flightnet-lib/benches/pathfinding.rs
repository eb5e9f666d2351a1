use criterion::{criterion_group, criterion_main, Criterion};
use flightnet_lib::{
    all_paths, hop_distance, load_network, shortest_distance, Network, PopulationSampler,
};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

static NETWORK: Lazy<Network> = Lazy::new(|| load_network(&fixture_path()).expect("fixture loads"));

fn benchmark_pathfinding(c: &mut Criterion) {
    let network = &*NETWORK;

    c.bench_function("hops_cdg_syd", |b| {
        b.iter(|| black_box(hop_distance(network, "CDG", "SYD").expect("route exists")));
    });

    c.bench_function("shortest_cdg_syd", |b| {
        b.iter(|| {
            let route = shortest_distance(network, "CDG", "SYD").expect("route exists");
            black_box(route.total_km)
        });
    });

    c.bench_function("all_paths_lhr_lax_3", |b| {
        b.iter(|| {
            let paths = all_paths(network, "LHR", "LAX", 3).expect("airports exist");
            black_box(paths.len())
        });
    });

    c.bench_function("weighted_pair_and_hops", |b| {
        let sampler = PopulationSampler::new(network).expect("sampler");
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let (origin, destination) = sampler.weighted_random_pair(&mut rng).expect("pair");
            black_box(hop_distance(network, origin, destination).ok())
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
