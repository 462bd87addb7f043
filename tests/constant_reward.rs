//! §8.4 scenario 1: constant-reward env, N=4 — nothing should clone.

use fractal_swarm::config::SwarmConfig;
use fractal_swarm::env::constant::ConstantRewardEnv;
use fractal_swarm::orchestrator::SwarmOrchestrator;
use fractal_swarm::policy::DiscreteUniform;

#[test]
fn balance_is_a_no_op_when_all_rewards_and_distances_are_equal() {
    let env = ConstantRewardEnv { reward: 1.0 };
    let policy = Box::new(DiscreteUniform::new(1));
    let config = SwarmConfig {
        walkers: 4,
        max_epochs: 1,
        reward_scale: 1.0,
        dist_scale: 1.0,
        minimize: false,
        accumulate_rewards: true,
        n_workers: Some(1),
        seed: Some(7),
        pin_best: false,
    };

    let mut orchestrator = SwarmOrchestrator::new(env, policy, None, config).unwrap();
    orchestrator.reset().unwrap();
    orchestrator.step().unwrap();

    let table = orchestrator.table();
    assert!(table.distances.iter().all(|&d| (d - 1.0).abs() < 1e-9));
    assert!(table.virtual_rewards.iter().all(|&v| (v - 1.0).abs() < 1e-9));
    assert!(table.will_clone.iter().all(|&w| !w));
    assert!(table.states.iter().all(|&s| s == ()));
}
