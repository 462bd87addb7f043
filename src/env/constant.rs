//! A trivial environment that always reports the same reward and
//! observation, used for the "nothing should move" baseline (§8.4 scenario 1).

use super::{ActionSpace, Environment, ResetBatch, TransitionBatch};

#[derive(Clone)]
pub struct ConstantRewardEnv {
    pub reward: f32,
}

impl Environment for ConstantRewardEnv {
    type State = ();
    type Action = u8;

    fn reset(&self, _batch_size: usize) -> ResetBatch<Self::State> {
        ResetBatch {
            state: (),
            observ: vec![0.0],
            reward: self.reward,
            oob: false,
            terminal: false,
        }
    }

    fn make_transitions(
        &self,
        states: &[Self::State],
        _actions: &[Self::Action],
        _dt: &[u32],
    ) -> TransitionBatch<Self::State> {
        let n = states.len();
        TransitionBatch {
            states: vec![(); n],
            observs: vec![vec![0.0]; n],
            rewards: vec![self.reward; n],
            oobs: vec![false; n],
            terminals: vec![false; n],
        }
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 1 }
    }
}
