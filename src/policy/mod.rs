//! Samples the next batch of candidate actions from the current walker
//! state (§4.3).

mod binary_swap;
mod continuous;
mod discrete;

pub use binary_swap::BinarySwap;
pub use continuous::{ContinuousNormal, ContinuousUniform};
pub use discrete::DiscreteUniform;

use rand::rngs::SmallRng;

use crate::env::Environment;
use crate::table::StateTable;

/// actions sampled for a whole walker batch, plus an optional per-walker
/// `dt` ("apply this action `dt` times") used by a Critic-aware policy
pub struct ActionBatch<A> {
    pub actions: Vec<A>,
    pub dt: Option<Vec<u32>>,
}

pub trait Policy<E: Environment>: Send + Sync {
    fn sample(&self, table: &StateTable<E::State, E::Action>, rng: &mut SmallRng) -> ActionBatch<E::Action>;
}
