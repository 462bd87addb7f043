//! Optional scorer that contributes a multiplicative modifier to
//! `virtual_rewards`, switching [`crate::walker::WalkerEngine::balance`]
//! into entropy mode (§4.2 step 3).

use crate::env::Environment;
use crate::table::StateTable;
use crate::Score;

/// mirrors the teacher's optional-capability traits (e.g. a `Profile` that
/// may or may not track regret decay): a swarm without a critic simply
/// never constructs one, rather than supplying a no-op default
pub trait Critic<E: Environment>: Send + Sync {
    /// produce a score per walker from the current table snapshot
    fn calculate(&mut self, table: &StateTable<E::State, E::Action>) -> Vec<Score>;

    /// called once after `balance()` completes, so a stateful critic can
    /// update internal counters from the post-clone table
    fn update(&mut self, table: &StateTable<E::State, E::Action>) {
        let _ = table;
    }

    /// initial score vector at reset
    fn reset(&mut self, n: usize) -> Vec<Score> {
        vec![1.0; n]
    }
}
