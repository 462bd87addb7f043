use std::marker::PhantomData;

use rand::rngs::SmallRng;
use rand::Rng;

use crate::env::Environment;
use crate::table::StateTable;

use super::{ActionBatch, Policy};

/// samples integers in `[0, n_actions)` with equal probability
pub struct DiscreteUniform<E> {
    pub n_actions: u8,
    _env: PhantomData<E>,
}

impl<E> DiscreteUniform<E> {
    pub fn new(n_actions: u8) -> Self {
        Self {
            n_actions,
            _env: PhantomData,
        }
    }
}

impl<E> Policy<E> for DiscreteUniform<E>
where
    E: Environment<Action = u8>,
{
    fn sample(&self, table: &StateTable<E::State, E::Action>, rng: &mut SmallRng) -> ActionBatch<E::Action> {
        let actions = (0..table.len())
            .map(|_| rng.random_range(0..self.n_actions))
            .collect();
        ActionBatch { actions, dt: None }
    }
}
