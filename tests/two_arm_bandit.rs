//! §8.4 scenario 2: two-arm discrete bandit, N=8, 50 epochs.

use fractal_swarm::config::SwarmConfig;
use fractal_swarm::env::bandit::TwoArmBanditEnv;
use fractal_swarm::orchestrator::{RunOutcome, SwarmOrchestrator};
use fractal_swarm::policy::DiscreteUniform;

#[test]
fn swarm_discovers_the_better_arm() {
    let env = TwoArmBanditEnv;
    let policy = Box::new(DiscreteUniform::new(2));
    let config = SwarmConfig {
        walkers: 8,
        max_epochs: 50,
        reward_scale: 1.0,
        dist_scale: 1.0,
        minimize: false,
        accumulate_rewards: true,
        n_workers: Some(2),
        seed: Some(42),
        pin_best: false,
    };

    let mut orchestrator = SwarmOrchestrator::new(env, policy, None, config).unwrap();
    orchestrator.reset().unwrap();
    let outcome = orchestrator.run().unwrap();

    let best = match outcome {
        RunOutcome::Completed { best, .. } => best.expect("a best-so-far record must exist"),
        RunOutcome::Cancelled { .. } => panic!("run should not be cancelled"),
    };
    assert!(best.reward >= 40.0, "expected a strongly improving best reward, got {}", best.reward);
}
