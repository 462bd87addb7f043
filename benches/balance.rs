criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        balancing_small_swarm,
        balancing_large_swarm,
        relativizing_a_vector,
}

use fractal_swarm::table::{Schema, StateTable, WalkerRecord};
use fractal_swarm::walker::WalkerEngine;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn synthetic_table(n: usize) -> StateTable<Vec<f32>, Vec<f32>> {
    let seed = WalkerRecord {
        state: vec![0.0, 0.0],
        observ: vec![0.0, 0.0],
        action: vec![0.0, 0.0],
        dt: 1,
        reward: 0.0,
        cum_reward: 0.0,
        oob: false,
        terminal: false,
        extra: Default::default(),
    };
    let mut table = StateTable::import_walker(&seed, n, Schema::new());
    for i in 0..n {
        let x = (i as f32) * 0.01;
        table.states[i] = vec![x, -x];
        table.observs[i] = vec![x, -x];
        table.cum_rewards[i] = x as f64;
        table.oobs[i] = i % 23 == 0;
    }
    table
}

fn balancing_small_swarm(c: &mut criterion::Criterion) {
    let engine = WalkerEngine {
        reward_scale: 1.0,
        dist_scale: 1.0,
        minimize: false,
    };
    let mut rng = SmallRng::seed_from_u64(7);
    c.bench_function("balance a 32-walker swarm", |b| {
        b.iter(|| {
            let mut table = synthetic_table(32);
            engine.balance(&mut table, None, &mut rng)
        })
    });
}

fn balancing_large_swarm(c: &mut criterion::Criterion) {
    let engine = WalkerEngine {
        reward_scale: 1.0,
        dist_scale: 1.0,
        minimize: false,
    };
    let mut rng = SmallRng::seed_from_u64(7);
    c.bench_function("balance a 4096-walker swarm", |b| {
        b.iter(|| {
            let mut table = synthetic_table(4096);
            engine.balance(&mut table, None, &mut rng)
        })
    });
}

fn relativizing_a_vector(c: &mut criterion::Criterion) {
    let x: Vec<f64> = (0..4096).map(|i| (i as f64 * 0.001).sin() * 10.0).collect();
    c.bench_function("relativize a 4096-element vector", |b| {
        b.iter(|| WalkerEngine::relativize(&x))
    });
}
