use std::marker::PhantomData;

use rand::rngs::SmallRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::env::Environment;
use crate::table::StateTable;

use super::{ActionBatch, Policy};

/// samples each action dimension from `Normal(0, sigma)`, clipped to
/// `[low[k], high[k]]`
pub struct ContinuousNormal<E> {
    pub sigma: f32,
    pub low: Vec<f32>,
    pub high: Vec<f32>,
    _env: PhantomData<E>,
}

impl<E> ContinuousNormal<E> {
    pub fn new(sigma: f32, low: Vec<f32>, high: Vec<f32>) -> Self {
        assert!(!low.is_empty(), "bounds must not be empty");
        assert_eq!(low.len(), high.len(), "bounds must share dimensionality");
        Self {
            sigma,
            low,
            high,
            _env: PhantomData,
        }
    }
}

impl<E> Policy<E> for ContinuousNormal<E>
where
    E: Environment<Action = Vec<f32>>,
{
    fn sample(&self, table: &StateTable<E::State, E::Action>, rng: &mut SmallRng) -> ActionBatch<E::Action> {
        let normal = Normal::new(0.0f32, self.sigma).expect("sigma must be finite and non-negative");
        let actions = (0..table.len())
            .map(|_| {
                self.low
                    .iter()
                    .zip(self.high.iter())
                    .map(|(lo, hi)| normal.sample(rng).clamp(*lo, *hi))
                    .collect()
            })
            .collect();
        ActionBatch { actions, dt: None }
    }
}

/// samples each action dimension uniformly in `[low[k], high[k]]`
pub struct ContinuousUniform<E> {
    pub low: Vec<f32>,
    pub high: Vec<f32>,
    _env: PhantomData<E>,
}

impl<E> ContinuousUniform<E> {
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        assert!(!low.is_empty(), "bounds must not be empty");
        assert_eq!(low.len(), high.len(), "bounds must share dimensionality");
        Self {
            low,
            high,
            _env: PhantomData,
        }
    }
}

impl<E> Policy<E> for ContinuousUniform<E>
where
    E: Environment<Action = Vec<f32>>,
{
    fn sample(&self, table: &StateTable<E::State, E::Action>, rng: &mut SmallRng) -> ActionBatch<E::Action> {
        let actions = (0..table.len())
            .map(|_| {
                self.low
                    .iter()
                    .zip(self.high.iter())
                    .map(|(lo, hi)| rng.random_range(*lo..=*hi))
                    .collect()
            })
            .collect();
        ActionBatch { actions, dt: None }
    }
}
