//! The environment contract: applies actions to states and reports the
//! resulting observation, reward, and out-of-bounds/terminal flags.

pub mod bandit;
pub mod bounded;
pub mod constant;
pub mod rastrigin;

use crate::table::{IdHash, Schema};

/// shape of the action a [`crate::Policy`] must produce for this environment
#[derive(Debug, Clone)]
pub enum ActionSpace {
    Discrete { n: usize },
    Continuous { low: Vec<f32>, high: Vec<f32> },
}

/// the record an environment emits from `reset`, broadcast to all N walkers
pub struct ResetBatch<S> {
    pub state: S,
    pub observ: Vec<f32>,
    pub reward: f32,
    pub oob: bool,
    pub terminal: bool,
}

/// the batch an environment emits from `make_transitions`, one entry per walker
pub struct TransitionBatch<S> {
    pub states: Vec<S>,
    pub observs: Vec<Vec<f32>>,
    pub rewards: Vec<f32>,
    pub oobs: Vec<bool>,
    pub terminals: Vec<bool>,
}

/// pure state-transition contract (§4.4): no side effects outside the
/// returned batch, so a [`crate::executor::ParallelExecutor`] can freely
/// shard calls across worker threads holding independent clones
pub trait Environment: Send + Sync {
    type State: Clone + Send + Sync + IdHash;
    type Action: Clone + Send + Sync;

    fn reset(&self, batch_size: usize) -> ResetBatch<Self::State>;

    fn make_transitions(
        &self,
        states: &[Self::State],
        actions: &[Self::Action],
        dt: &[u32],
    ) -> TransitionBatch<Self::State>;

    fn action_space(&self) -> ActionSpace;

    /// dynamic columns this environment contributes beyond the standard
    /// schema; empty for environments that only use `states`/`observs`
    fn schema(&self) -> Schema {
        Schema::new()
    }
}
