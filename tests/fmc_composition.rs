//! §8.4 scenario 6: the outer majority vote should favor the optimal arm.

use fractal_swarm::compose::FmcComposer;
use fractal_swarm::config::SwarmConfig;
use fractal_swarm::env::{ActionSpace, Environment, ResetBatch, TransitionBatch};
use fractal_swarm::orchestrator::SwarmOrchestrator;
use fractal_swarm::policy::DiscreteUniform;

#[derive(Clone)]
struct ThreeArmEnv;

impl Environment for ThreeArmEnv {
    type State = ();
    type Action = u8;

    fn reset(&self, _batch_size: usize) -> ResetBatch<()> {
        ResetBatch {
            state: (),
            observ: vec![0.0],
            reward: 0.0,
            oob: false,
            terminal: false,
        }
    }

    fn make_transitions(&self, states: &[()], actions: &[u8], _dt: &[u32]) -> TransitionBatch<()> {
        let rewards = actions.iter().map(|&a| if a == 2 { 1.0 } else { 0.0 }).collect();
        let n = states.len();
        TransitionBatch {
            states: vec![(); n],
            observs: vec![vec![0.0]; n],
            rewards,
            oobs: vec![false; n],
            terminals: vec![false; n],
        }
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 3 }
    }
}

#[test]
fn majority_vote_favors_the_optimal_arm() {
    let inner_config = SwarmConfig {
        walkers: 8,
        max_epochs: 5,
        reward_scale: 1.0,
        dist_scale: 1.0,
        minimize: false,
        accumulate_rewards: true,
        n_workers: Some(1),
        seed: Some(3),
        pin_best: false,
    };
    let composer = FmcComposer::new(ThreeArmEnv, Box::new(DiscreteUniform::new(3)), inner_config).unwrap();

    let outer_config = SwarmConfig {
        walkers: 1,
        max_epochs: 10,
        reward_scale: 1.0,
        dist_scale: 1.0,
        minimize: false,
        accumulate_rewards: true,
        n_workers: Some(1),
        seed: Some(9),
        pin_best: false,
    };
    let mut outer = SwarmOrchestrator::new(
        composer.clone(),
        Box::new(composer),
        None,
        outer_config,
    )
    .unwrap();
    outer.reset().unwrap();

    let mut arm_two_votes = 0;
    for _ in 0..10 {
        outer.step().unwrap();
        if outer.table().actions[0] == 2 {
            arm_two_votes += 1;
        }
    }

    assert!(arm_two_votes >= 7, "expected arm 2 to dominate the vote, got {arm_two_votes}/10");
}
