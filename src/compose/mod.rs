//! Nested FMC composition: an outer swarm of one walker whose transition
//! function is "run an inner swarm to completion and vote on its first
//! action" (§4.7).

mod aggregate;

pub use aggregate::{ActionColumn, AggregateActions};

use std::sync::{Arc, Mutex};

use rand::rngs::SmallRng;

use crate::callback::{Callback, CallbackContext};
use crate::config::SwarmConfig;
use crate::env::{ActionSpace, Environment, ResetBatch, TransitionBatch};
use crate::error::SwarmError;
use crate::orchestrator::{RunOutcome, SwarmOrchestrator};
use crate::policy::{ActionBatch, Policy};
use crate::table::{Schema, StateTable, WalkerRecord};

/// name of the extra column tracking each inner walker's epoch-0 action
/// through cloning, mirroring `fragile`'s `init_actions` table column
const INIT_ACTIONS: &'static str = "init_actions";

/// what a completed inner run contributes to the outer transition: the
/// outer environment is defined to directly emit the inner swarm's
/// best-so-far state and reward (§4.7 step 5)
struct InnerRunResult<S> {
    best_state: S,
    best_observ: Vec<f32>,
    reward: f32,
    terminal: bool,
}

/// writes each inner walker's very first sampled action (epoch 0) into the
/// `init_actions` extra column, so that later cloning carries it along with
/// the rest of the walker's row (§4.7, grounded on `fragile.algorithms.fmc`'s
/// `StoreInitAction` writing a real table column rather than a frozen
/// snapshot taken outside the table)
struct InitActionRecorder;

impl<E> Callback<E> for InitActionRecorder
where
    E: Environment,
    E::Action: ActionColumn,
{
    fn name(&self) -> &str {
        "init_action_recorder"
    }

    fn after_policy(&mut self, ctx: &mut CallbackContext<E>) {
        if ctx.epoch == 0 {
            let column = E::Action::to_column(&ctx.table.actions);
            ctx.table
                .update_extra(INIT_ACTIONS, column)
                .expect("init_actions column declared by FmcComposer::new's schema");
        }
    }
}

/// wraps an inner [`SwarmOrchestrator<E>`] as both the [`Policy`] and the
/// [`Environment`] of an outer, single-walker swarm. `Policy::sample` does
/// the work (reset the inner swarm from the outer walker's state, run it to
/// completion, aggregate first actions) and stashes the result for
/// `Environment::make_transitions`, which runs immediately afterward in the
/// same outer epoch (§5: phases within an epoch are strictly ordered).
///
/// The two roles share state through `Arc<Mutex<_>>` rather than
/// `Rc<RefCell<_>>`, because `Environment`/`Policy` require `Send + Sync` so
/// a [`crate::executor::ParallelExecutor`] can hold an environment clone per
/// worker thread — even though the outer swarm's single walker means only
/// one thread is ever actually used.
pub struct FmcComposer<E>
where
    E: Environment + Clone + 'static,
    E::Action: AggregateActions + ActionColumn + Default,
{
    inner: Arc<Mutex<SwarmOrchestrator<E>>>,
    result: Arc<Mutex<Option<InnerRunResult<E::State>>>>,
}

impl<E> Clone for FmcComposer<E>
where
    E: Environment + Clone + 'static,
    E::Action: AggregateActions + ActionColumn + Default,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            result: self.result.clone(),
        }
    }
}

impl<E> FmcComposer<E>
where
    E: Environment + Clone + 'static,
    E::Action: AggregateActions + ActionColumn + Default,
{
    pub fn new(
        inner_env: E,
        inner_policy: Box<dyn Policy<E>>,
        inner_config: SwarmConfig,
    ) -> Result<Self, SwarmError> {
        let init_actions_schema =
            Schema::new().with(INIT_ACTIONS, E::Action::to_column(&[E::Action::default()]));
        let inner = SwarmOrchestrator::new(inner_env, inner_policy, None, inner_config)?
            .with_schema(init_actions_schema)
            .with_callback(Box::new(InitActionRecorder));
        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
            result: Arc::new(Mutex::new(None)),
        })
    }
}

impl<E> Policy<FmcComposer<E>> for FmcComposer<E>
where
    E: Environment + Clone + 'static,
    E::Action: AggregateActions + ActionColumn + Default,
{
    fn sample(
        &self,
        table: &StateTable<E::State, E::Action>,
        _rng: &mut SmallRng,
    ) -> ActionBatch<E::Action> {
        assert_eq!(table.len(), 1, "FmcComposer's outer swarm must have exactly one walker");
        let seed = table.export_walker(0);

        let mut inner = self.inner.lock().expect("inner swarm mutex poisoned");
        inner
            .reset_from(WalkerRecord {
                state: seed.state.clone(),
                observ: seed.observ.clone(),
                action: E::Action::default(),
                dt: 1,
                reward: 0.0,
                cum_reward: 0.0,
                oob: false,
                terminal: false,
                extra: Default::default(),
            })
            .expect("reset inner swarm from outer walker state");
        let outcome = inner.run().expect("run inner swarm to completion");

        let init_actions_column = inner
            .table()
            .extra(INIT_ACTIONS)
            .expect("init_actions column declared by FmcComposer::new's schema");
        let actions = E::Action::from_column(init_actions_column);
        let aggregated = E::Action::aggregate(&actions);

        let (best_state, best_observ, reward) = match inner.best() {
            Some(best) => (best.state.clone(), best.observ.clone(), best.reward as f32),
            None => (seed.state.clone(), seed.observ.clone(), 0.0),
        };
        let terminal = matches!(outcome, RunOutcome::Completed { .. });

        *self.result.lock().unwrap() = Some(InnerRunResult {
            best_state,
            best_observ,
            reward,
            terminal,
        });

        ActionBatch {
            actions: vec![aggregated],
            dt: None,
        }
    }
}

impl<E> Environment for FmcComposer<E>
where
    E: Environment + Clone + 'static,
    E::Action: AggregateActions + ActionColumn + Default,
{
    type State = E::State;
    type Action = E::Action;

    fn reset(&self, _batch_size: usize) -> ResetBatch<Self::State> {
        let mut inner = self.inner.lock().expect("inner swarm mutex poisoned");
        inner.reset().expect("reset inner swarm to seed outer walker");
        let seed = inner.table().export_walker(0);
        ResetBatch {
            state: seed.state,
            observ: seed.observ,
            reward: seed.reward,
            oob: seed.oob,
            terminal: seed.terminal,
        }
    }

    fn make_transitions(
        &self,
        states: &[Self::State],
        _actions: &[Self::Action],
        _dt: &[u32],
    ) -> TransitionBatch<Self::State> {
        let n = states.len();
        debug_assert_eq!(n, 1, "FmcComposer's outer swarm must have exactly one walker");
        let result = self
            .result
            .lock()
            .unwrap()
            .take()
            .expect("Policy::sample must run before Environment::make_transitions each epoch");
        TransitionBatch {
            states: vec![result.best_state; n],
            observs: vec![result.best_observ; n],
            rewards: vec![result.reward; n],
            oobs: vec![false; n],
            terminals: vec![result.terminal; n],
        }
    }

    fn action_space(&self) -> ActionSpace {
        self.inner.lock().unwrap().env().action_space()
    }
}
