//! The epoch loop that composes an [`Environment`], a [`Policy`], the
//! [`WalkerEngine`], and a [`CallbackSet`] (§4.6).

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::callback::{CallbackContext, CallbackSet};
use crate::config::SwarmConfig;
use crate::critic::Critic;
use crate::env::Environment;
use crate::error::SwarmError;
use crate::executor::ParallelExecutor;
use crate::policy::Policy;
use crate::table::{Schema, StateTable, WalkerRecord};
use crate::walker::WalkerEngine;

/// the single-walker record tracked outside the table (§3.3)
#[derive(Debug, Clone)]
pub struct BestRecord<S> {
    pub state: S,
    pub observ: Vec<f32>,
    pub reward: f64,
}

/// the result of [`SwarmOrchestrator::run`]
#[derive(Debug, Clone)]
pub enum RunOutcome<S> {
    Completed { epochs: usize, best: Option<BestRecord<S>> },
    Cancelled { epochs: usize, best: Option<BestRecord<S>> },
}

/// drives the epoch loop; owns the table, the environment's worker pool,
/// and the best-so-far record for a single run
pub struct SwarmOrchestrator<E>
where
    E: Environment,
{
    env: E,
    executor: ParallelExecutor<E>,
    policy: Box<dyn Policy<E>>,
    critic: Option<Box<dyn Critic<E>>>,
    callbacks: CallbackSet<E>,
    engine: WalkerEngine,
    config: SwarmConfig,
    rng: SmallRng,
    table: Option<StateTable<E::State, E::Action>>,
    best: Option<BestRecord<E::State>>,
    epoch: usize,
    stop: bool,
    /// dynamic columns declared on top of the environment's own [`Schema`],
    /// e.g. by a composing layer
    extra_schema: Schema,
}

impl<E> SwarmOrchestrator<E>
where
    E: Environment + Clone + 'static,
    E::Action: Default,
{
    pub fn new(
        env: E,
        policy: Box<dyn Policy<E>>,
        critic: Option<Box<dyn Critic<E>>>,
        config: SwarmConfig,
    ) -> Result<Self, SwarmError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let executor = ParallelExecutor::new(env.clone(), config.resolved_workers());
        Ok(Self {
            env,
            executor,
            policy,
            critic,
            callbacks: CallbackSet::new(),
            engine: WalkerEngine {
                reward_scale: config.reward_scale,
                dist_scale: config.dist_scale,
                minimize: config.minimize,
            },
            config,
            rng,
            table: None,
            best: None,
            epoch: 0,
            stop: false,
            extra_schema: Schema::new(),
        })
    }

    pub fn with_callback(mut self, callback: Box<dyn crate::callback::Callback<E>>) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// declare additional dynamic columns on top of `env.schema()`, e.g.
    /// [`crate::compose::FmcComposer`]'s `init_actions` tracking column
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.extra_schema = self.extra_schema.clone().merge(schema);
        self
    }

    pub fn table(&self) -> &StateTable<E::State, E::Action> {
        self.table.as_ref().expect("call reset() before table()")
    }

    pub fn best(&self) -> Option<&BestRecord<E::State>> {
        self.best.as_ref()
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// seed the table from `env.reset`, zero the derived columns, and seed
    /// the best-so-far record from the initial walker
    pub fn reset(&mut self) -> Result<(), SwarmError> {
        let seed = self.env.reset(self.config.walkers);
        let record = WalkerRecord {
            state: seed.state,
            observ: seed.observ,
            action: E::Action::default(),
            dt: 1,
            reward: seed.reward,
            cum_reward: seed.reward as f64,
            oob: seed.oob,
            terminal: seed.terminal,
            extra: Default::default(),
        };
        self.reset_from(record)
    }

    /// seed the table from an externally-supplied walker record rather than
    /// `env.reset`; used by [`crate::compose::FmcComposer`] to broadcast the
    /// outer walker's current state to a freshly-reset inner swarm
    pub fn reset_from(&mut self, record: WalkerRecord<E::State, E::Action>) -> Result<(), SwarmError> {
        self.epoch = 0;
        self.stop = false;
        self.best = None;

        let mut stop = false;
        let seed_reward = record.reward;
        let schema = self.env.schema().merge(self.extra_schema.clone());
        let mut table = StateTable::import_walker(&record, self.config.walkers, schema);

        let mut ctx = CallbackContext {
            table: &mut table,
            epoch: 0,
            stop: &mut stop,
        };
        self.callbacks.before_reset(&mut ctx);
        self.callbacks.after_reset(&mut ctx);

        self.table = Some(table);
        self.update_best();
        self.stop = stop;
        log::info!(
            "reset: {} walkers, seed reward {:.4}",
            self.config.walkers,
            seed_reward
        );
        Ok(())
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// run one full epoch: policy → environment → walker balance → best update
    pub fn step(&mut self) -> Result<(), SwarmError> {
        let epoch = self.epoch;
        let mut stop = self.stop;

        let mut ctx = CallbackContext {
            table: self.table.as_mut().expect("call reset() before step()"),
            epoch,
            stop: &mut stop,
        };
        self.callbacks.before_policy(&mut ctx);

        let sample = {
            let table = self.table.as_ref().unwrap();
            self.policy.sample(table, &mut self.rng)
        };
        self.table
            .as_mut()
            .unwrap()
            .update_actions(sample.actions, sample.dt)?;

        let mut ctx = CallbackContext {
            table: self.table.as_mut().unwrap(),
            epoch,
            stop: &mut stop,
        };
        self.callbacks.after_policy(&mut ctx);

        let mut ctx = CallbackContext {
            table: self.table.as_mut().unwrap(),
            epoch,
            stop: &mut stop,
        };
        self.callbacks.before_env(&mut ctx);

        let transition = {
            let table = self.table.as_ref().unwrap();
            self.executor
                .make_transitions(&table.states, &table.actions, &table.dt)?
        };
        self.table.as_mut().unwrap().update_transition(
            transition.states,
            transition.observs,
            transition.rewards,
            transition.oobs,
            transition.terminals,
            self.config.accumulate_rewards,
        )?;

        let mut ctx = CallbackContext {
            table: self.table.as_mut().unwrap(),
            epoch,
            stop: &mut stop,
        };
        self.callbacks.after_env(&mut ctx);

        let mut ctx = CallbackContext {
            table: self.table.as_mut().unwrap(),
            epoch,
            stop: &mut stop,
        };
        self.callbacks.before_walkers(&mut ctx);

        let critic_score = match self.critic.as_mut() {
            Some(critic) => Some(critic.calculate(self.table.as_ref().unwrap())),
            None => None,
        };
        let stats = {
            let table = self.table.as_mut().unwrap();
            self.engine.balance(table, critic_score.as_deref(), &mut self.rng)
        };
        if let Some(critic) = self.critic.as_mut() {
            critic.update(self.table.as_ref().unwrap());
        }
        self.update_best();

        let mut ctx = CallbackContext {
            table: self.table.as_mut().unwrap(),
            epoch,
            stop: &mut stop,
        };
        self.callbacks.after_walkers(&mut ctx);

        let mut ctx = CallbackContext {
            table: self.table.as_mut().unwrap(),
            epoch,
            stop: &mut stop,
        };
        self.callbacks.after_evolve(&mut ctx);

        log::debug!(
            "epoch {epoch} | alive {}/{} | cloned {} | best {:.4?}",
            stats.alive,
            self.config.walkers,
            stats.cloned,
            self.best.as_ref().map(|b| b.reward),
        );

        self.epoch += 1;
        self.stop = stop;
        Ok(())
    }

    fn terminate(&self) -> bool {
        if self.stop {
            return true;
        }
        if self.epoch >= self.config.max_epochs {
            return true;
        }
        let table = self.table.as_ref().unwrap();
        table.oobs.iter().all(|&o| o)
    }

    fn update_best(&mut self) {
        let table = self.table.as_ref().unwrap();
        let mut candidate = None;
        for i in 0..table.len() {
            if table.oobs[i] {
                continue;
            }
            let better = match candidate {
                None => true,
                Some(c) => self.is_better(table.cum_rewards[i], table.cum_rewards[c]),
            };
            if better {
                candidate = Some(i);
            }
        }
        let Some(c) = candidate else { return };
        let reward = table.cum_rewards[c];
        let improves = match &self.best {
            None => true,
            Some(best) => self.is_better(reward, best.reward),
        };
        if improves {
            self.best = Some(BestRecord {
                state: table.states[c].clone(),
                observ: table.observs[c].clone(),
                reward,
            });
            log::info!("epoch {}: best-so-far improved to {:.4}", self.epoch, reward);
        }
    }

    fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        if self.config.minimize {
            candidate < incumbent
        } else {
            candidate > incumbent
        }
    }

    /// drive the full epoch loop to termination, honoring an external
    /// interrupt via [`crate::interrupted`] when the `cli` feature is enabled
    pub fn run(&mut self) -> Result<RunOutcome<E::State>, SwarmError> {
        let mut ctx = CallbackContext {
            table: self.table.as_mut().expect("call reset() before run()"),
            epoch: self.epoch,
            stop: &mut self.stop,
        };
        self.callbacks.run_start(&mut ctx);

        loop {
            #[cfg(feature = "cli")]
            if crate::interrupted() {
                self.stop = true;
            }
            self.step()?;
            if self.terminate() {
                break;
            }
        }

        if self.config.pin_best {
            if let (Some(best), Some(table)) = (self.best.clone(), self.table.as_mut()) {
                let last = table.len() - 1;
                table.states[last] = best.state.clone();
                table.observs[last] = best.observ.clone();
                table.cum_rewards[last] = best.reward;
            }
        }

        let mut ctx = CallbackContext {
            table: self.table.as_mut().unwrap(),
            epoch: self.epoch,
            stop: &mut self.stop,
        };
        self.callbacks.run_end(&mut ctx);

        let outcome = if self.stop && self.epoch < self.config.max_epochs {
            log::warn!("run cancelled after {} epochs", self.epoch);
            RunOutcome::Cancelled {
                epochs: self.epoch,
                best: self.best.clone(),
            }
        } else {
            log::info!("run completed after {} epochs", self.epoch);
            RunOutcome::Completed {
                epochs: self.epoch,
                best: self.best.clone(),
            }
        };
        Ok(outcome)
    }
}
