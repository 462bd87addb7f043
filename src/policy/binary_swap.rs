use std::marker::PhantomData;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::env::Environment;
use crate::table::StateTable;

use super::{ActionBatch, Policy};

/// interprets each walker's observation as a bit vector and flips
/// `n_swaps` randomly chosen coordinates to produce the next action
pub struct BinarySwap<E> {
    pub n_swaps: usize,
    _env: PhantomData<E>,
}

impl<E> BinarySwap<E> {
    pub fn new(n_swaps: usize) -> Self {
        assert!(n_swaps > 0, "n_swaps must be at least 1");
        Self {
            n_swaps,
            _env: PhantomData,
        }
    }
}

impl<E> Policy<E> for BinarySwap<E>
where
    E: Environment<Action = Vec<bool>>,
{
    fn sample(&self, table: &StateTable<E::State, E::Action>, rng: &mut SmallRng) -> ActionBatch<E::Action> {
        let actions = table
            .observs
            .iter()
            .map(|obs| {
                let mut bits: Vec<bool> = obs.iter().map(|&v| v > 0.5).collect();
                let mut positions: Vec<usize> = (0..bits.len()).collect();
                positions.shuffle(rng);
                for &i in positions.iter().take(self.n_swaps.min(bits.len())) {
                    bits[i] = !bits[i];
                }
                bits
            })
            .collect();
        ActionBatch { actions, dt: None }
    }
}
