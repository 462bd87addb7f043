//! A two-armed discrete bandit: action `1` always pays `1`, action `0`
//! always pays `0` (§8.4 scenario 2).

use super::{ActionSpace, Environment, ResetBatch, TransitionBatch};

#[derive(Clone)]
pub struct TwoArmBanditEnv;

impl Environment for TwoArmBanditEnv {
    type State = ();
    type Action = u8;

    fn reset(&self, _batch_size: usize) -> ResetBatch<Self::State> {
        ResetBatch {
            state: (),
            observ: vec![0.0],
            reward: 0.0,
            oob: false,
            terminal: false,
        }
    }

    fn make_transitions(
        &self,
        states: &[Self::State],
        actions: &[Self::Action],
        _dt: &[u32],
    ) -> TransitionBatch<Self::State> {
        let n = states.len();
        let rewards: Vec<f32> = actions.iter().map(|&a| if a == 1 { 1.0 } else { 0.0 }).collect();
        TransitionBatch {
            states: vec![(); n],
            observs: vec![vec![0.0]; n],
            rewards,
            oobs: vec![false; n],
            terminals: vec![false; n],
        }
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 2 }
    }
}
