//! Generic continuous-parameter environment: clips a flat `Vec<f32>` state
//! to a bounding box and scores it with a user-supplied function.
//!
//! Grounded on the original `fragile` package's `encoder.py`, which maps a
//! flat parameter vector to/from an environment's native representation;
//! here the "native representation" and the flat vector coincide, since the
//! box itself is the whole state space.

use super::{ActionSpace, Environment, ResetBatch, TransitionBatch};

#[derive(Clone)]
pub struct BoundedContinuousEnv<F> {
    pub low: Vec<f32>,
    pub high: Vec<f32>,
    pub step: f32,
    pub score: F,
}

impl<F> BoundedContinuousEnv<F>
where
    F: Fn(&[f32]) -> f32 + Send + Sync,
{
    pub fn new(low: Vec<f32>, high: Vec<f32>, step: f32, score: F) -> Self {
        assert_eq!(low.len(), high.len(), "bounds must share dimensionality");
        Self {
            low,
            high,
            step,
            score,
        }
    }

    fn dim(&self) -> usize {
        self.low.len()
    }
}

impl<F> Environment for BoundedContinuousEnv<F>
where
    F: Fn(&[f32]) -> f32 + Send + Sync,
{
    type State = Vec<f32>;
    type Action = Vec<f32>;

    fn reset(&self, _batch_size: usize) -> ResetBatch<Self::State> {
        let mid: Vec<f32> = self
            .low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| (l + h) / 2.0)
            .collect();
        let reward = (self.score)(&mid);
        ResetBatch {
            observ: mid.clone(),
            state: mid,
            reward,
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
        let mut out = TransitionBatch {
            states: Vec::with_capacity(n),
            observs: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
            oobs: Vec::with_capacity(n),
            terminals: vec![false; n],
        };
        for (state, action) in states.iter().zip(actions.iter()) {
            let mut oob = false;
            let next: Vec<f32> = state
                .iter()
                .zip(action.iter())
                .zip(self.low.iter().zip(self.high.iter()))
                .map(|((s, a), (lo, hi))| {
                    let raw = s + a;
                    if raw < *lo || raw > *hi {
                        oob = true;
                    }
                    raw.clamp(*lo, *hi)
                })
                .collect();
            out.rewards.push((self.score)(&next));
            out.observs.push(next.clone());
            out.states.push(next);
            out.oobs.push(oob);
        }
        out
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Continuous {
            low: vec![-self.step; self.dim()],
            high: vec![self.step; self.dim()],
        }
    }
}
