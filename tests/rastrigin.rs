//! §8.4 scenario 3: 2-D Rastrigin, N=16, 200 epochs, minimize, normal policy.

use fractal_swarm::config::SwarmConfig;
use fractal_swarm::env::rastrigin::rastrigin_2d;
use fractal_swarm::orchestrator::{RunOutcome, SwarmOrchestrator};
use fractal_swarm::policy::ContinuousNormal;

#[test]
fn swarm_converges_near_the_global_minimum() {
    let env = rastrigin_2d(0.5);
    let policy = Box::new(ContinuousNormal::new(0.5, vec![-0.5; 2], vec![0.5; 2]));
    let config = SwarmConfig {
        walkers: 16,
        max_epochs: 200,
        reward_scale: 1.0,
        dist_scale: 1.0,
        minimize: true,
        accumulate_rewards: false,
        n_workers: Some(2),
        seed: Some(1),
        pin_best: false,
    };

    let mut orchestrator = SwarmOrchestrator::new(env, policy, None, config).unwrap();
    orchestrator.reset().unwrap();
    let outcome = orchestrator.run().unwrap();

    let best = match outcome {
        RunOutcome::Completed { best, .. } => best.expect("a best-so-far record must exist"),
        RunOutcome::Cancelled { .. } => panic!("run should not be cancelled"),
    };
    assert!(best.reward <= 5.0, "expected the swarm to approach the origin, got {}", best.reward);
}
