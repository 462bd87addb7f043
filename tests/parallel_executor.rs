//! §8.4 scenario 4: chunking across N_w workers must reproduce the serial result.

use fractal_swarm::env::rastrigin::rastrigin_2d;
use fractal_swarm::env::Environment;
use fractal_swarm::executor::ParallelExecutor;

#[test]
fn chunked_execution_matches_serial_for_every_worker_count() {
    let env = rastrigin_2d(0.5);
    let states: Vec<Vec<f32>> = (0..12)
        .map(|i| vec![i as f32 * 0.1, -(i as f32) * 0.1])
        .collect();
    let actions: Vec<Vec<f32>> = (0..12).map(|i| vec![0.05 * i as f32, 0.0]).collect();
    let dt = vec![1u32; 12];

    let serial = env.make_transitions(&states, &actions, &dt);

    for n_workers in [1, 2, 3, 4, 6] {
        let executor = ParallelExecutor::new(rastrigin_2d(0.5), n_workers);
        let parallel = executor.make_transitions(&states, &actions, &dt).unwrap();
        assert_eq!(parallel.states, serial.states, "n_workers={n_workers}");
        assert_eq!(parallel.rewards, serial.rewards, "n_workers={n_workers}");
    }
}
