//! Column-oriented storage for the walker population: every field is a
//! dense `Vec` of length N, indexed consistently by walker id.

pub mod column;

use std::collections::HashMap;
use std::hash::Hasher;

pub use column::Column;

use crate::error::SwarmError;
use crate::{Reward, Score};

/// produces the 64-bit content hash stored in `id_walkers` (§3.2). Kept
/// separate from `std::hash::Hash` because environment states are free to
/// contain floats, which aren't `Hash`.
pub trait IdHash {
    fn id_hash(&self) -> u64;
}

impl IdHash for () {
    fn id_hash(&self) -> u64 {
        0
    }
}

impl IdHash for u8 {
    fn id_hash(&self) -> u64 {
        *self as u64
    }
}

impl IdHash for i32 {
    fn id_hash(&self) -> u64 {
        *self as u64
    }
}

impl IdHash for i64 {
    fn id_hash(&self) -> u64 {
        *self as u64
    }
}

impl IdHash for Vec<f32> {
    fn id_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for v in self {
            v.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl IdHash for Vec<bool> {
    fn id_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for v in self {
            v.hash(&mut hasher);
        }
        hasher.finish()
    }
}

use std::hash::Hash;

/// declares which dynamic (non-standard) columns a table instance carries,
/// frozen at construction time per §3.1/§9: "the schema is frozen before
/// the first epoch". Each declared column carries a single-row default,
/// broadcast when a `WalkerRecord` doesn't already supply that column (as
/// when an environment's own `reset` has nothing to say about a column a
/// composing layer declared on top of it).
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<(&'static str, Column)>,
}

impl Schema {
    pub fn new() -> Self {
        Self { columns: Vec::new() }
    }

    pub fn with(mut self, name: &'static str, default: Column) -> Self {
        self.columns.push((name, default));
        self
    }

    /// combine two schemas, e.g. an environment's own declared columns with
    /// ones a composing layer ([`crate::compose::FmcComposer`]) adds on top
    pub fn merge(mut self, other: Schema) -> Self {
        self.columns.extend(other.columns);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|&(name, _)| name)
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &Column)> {
        self.columns.iter().map(|(name, col)| (*name, col))
    }
}

/// a single walker's full row, used by [`StateTable::export_walker`] and
/// [`StateTable::import_walker`]
#[derive(Debug, Clone)]
pub struct WalkerRecord<S, A> {
    pub state: S,
    pub observ: Vec<f32>,
    pub action: A,
    pub dt: u32,
    pub reward: Reward,
    pub cum_reward: f64,
    pub oob: bool,
    pub terminal: bool,
    pub extra: HashMap<String, Column>,
}

pub struct StateTable<S, A> {
    n: usize,
    pub states: Vec<S>,
    pub observs: Vec<Vec<f32>>,
    pub actions: Vec<A>,
    pub dt: Vec<u32>,
    pub rewards: Vec<Reward>,
    pub cum_rewards: Vec<f64>,
    pub oobs: Vec<bool>,
    pub terminals: Vec<bool>,
    pub id_walkers: Vec<u64>,
    pub distances: Vec<Score>,
    pub virtual_rewards: Vec<Score>,
    pub clone_probs: Vec<Score>,
    pub will_clone: Vec<bool>,
    pub compas_dist: Vec<usize>,
    pub compas_clone: Vec<usize>,
    pub alive_mask: Vec<bool>,
    schema: Schema,
    extra: HashMap<String, Column>,
}

impl<S, A> StateTable<S, A>
where
    S: Clone + IdHash,
    A: Clone,
{
    /// broadcast a single walker record to all `n` rows, as at reset (§4.1
    /// `import_walker`)
    pub fn import_walker(record: &WalkerRecord<S, A>, n: usize, schema: Schema) -> Self {
        let extra = schema
            .entries()
            .map(|(name, default)| {
                let col = record.extra.get(name).unwrap_or(default);
                (name.to_string(), col.broadcast(n))
            })
            .collect();

        let mut table = Self {
            n,
            states: vec![record.state.clone(); n],
            observs: vec![record.observ.clone(); n],
            actions: vec![record.action.clone(); n],
            dt: vec![record.dt; n],
            rewards: vec![record.reward; n],
            cum_rewards: vec![record.cum_reward; n],
            oobs: vec![record.oob; n],
            terminals: vec![record.terminal; n],
            id_walkers: vec![0; n],
            distances: vec![1.0; n],
            virtual_rewards: vec![1.0; n],
            clone_probs: vec![0.0; n],
            will_clone: vec![false; n],
            compas_dist: (0..n).collect(),
            compas_clone: (0..n).collect(),
            alive_mask: vec![!record.oob; n],
            schema,
            extra,
        };
        table.recompute_ids();
        table
    }

    /// copy walker `i`'s full row out, for seeding the best-so-far record
    /// or (in [`crate::compose`]) an inner swarm's reset broadcast
    pub fn export_walker(&self, i: usize) -> WalkerRecord<S, A> {
        WalkerRecord {
            state: self.states[i].clone(),
            observ: self.observs[i].clone(),
            action: self.actions[i].clone(),
            dt: self.dt[i],
            reward: self.rewards[i],
            cum_reward: self.cum_rewards[i],
            oob: self.oobs[i],
            terminal: self.terminals[i],
            extra: self
                .extra
                .iter()
                .map(|(k, v)| (k.clone(), v.single(i)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// recompute `id_walkers` as the content hash of `states`, per §3.2:
    /// "recomputed after every environment transition and after every clone"
    pub fn recompute_ids(&mut self) {
        for i in 0..self.n {
            self.id_walkers[i] = self.states[i].id_hash();
        }
    }

    /// overwrite `actions` (and, if present, `dt`) after [`crate::Policy::sample`]
    pub fn update_actions(&mut self, actions: Vec<A>, dt: Option<Vec<u32>>) -> Result<(), SwarmError> {
        if actions.len() != self.n {
            return Err(SwarmError::SchemaMismatch {
                column: "actions",
                expected: self.n,
                got: actions.len(),
            });
        }
        self.actions = actions;
        if let Some(dt) = dt {
            if dt.len() != self.n {
                return Err(SwarmError::SchemaMismatch {
                    column: "dt",
                    expected: self.n,
                    got: dt.len(),
                });
            }
            self.dt = dt;
        }
        Ok(())
    }

    /// overwrite the post-transition columns after [`crate::Environment::make_transitions`]
    #[allow(clippy::too_many_arguments)]
    pub fn update_transition(
        &mut self,
        states: Vec<S>,
        observs: Vec<Vec<f32>>,
        rewards: Vec<Reward>,
        oobs: Vec<bool>,
        terminals: Vec<bool>,
        accumulate: bool,
    ) -> Result<(), SwarmError> {
        for (name, got) in [
            ("states", states.len()),
            ("observs", observs.len()),
            ("rewards", rewards.len()),
            ("oobs", oobs.len()),
            ("terminals", terminals.len()),
        ] {
            if got != self.n {
                return Err(SwarmError::SchemaMismatch {
                    column: name,
                    expected: self.n,
                    got,
                });
            }
        }
        self.states = states;
        self.observs = observs;
        if accumulate {
            for (c, r) in self.cum_rewards.iter_mut().zip(rewards.iter()) {
                *c += *r as f64;
            }
        } else {
            for (c, r) in self.cum_rewards.iter_mut().zip(rewards.iter()) {
                *c = *r as f64;
            }
        }
        self.rewards = rewards;
        self.oobs = oobs;
        self.terminals = terminals;
        for (alive, oob) in self.alive_mask.iter_mut().zip(self.oobs.iter()) {
            *alive = !oob;
        }
        self.recompute_ids();
        Ok(())
    }

    /// write a dynamic (schema) column, type- and length-checked against
    /// the existing column
    pub fn update_extra(&mut self, name: &'static str, value: Column) -> Result<(), SwarmError> {
        match self.extra.get_mut(name) {
            Some(col) => col.assign(name, value),
            None => Err(SwarmError::SchemaMismatch {
                column: name,
                expected: 0,
                got: value.len(),
            }),
        }
    }

    pub fn extra(&self, name: &str) -> Option<&Column> {
        self.extra.get(name)
    }

    /// for every `i` with `will_clone[i]`, overwrite row `i` with row
    /// `compas[i]`, reading from a pre-update snapshot so a compas chain
    /// never reads an already-overwritten destination (§4.1)
    pub fn gather_clone(&mut self, will_clone: &[bool], compas: &[usize]) {
        debug_assert_eq!(will_clone.len(), self.n);
        debug_assert_eq!(compas.len(), self.n);

        let src_states = self.states.clone();
        let src_actions = self.actions.clone();
        let src_dt = self.dt.clone();
        let src_rewards = self.rewards.clone();
        let src_cum = self.cum_rewards.clone();
        let src_oobs = self.oobs.clone();
        let src_terminals = self.terminals.clone();
        // observs is clone-exempt: recomputed by the next transition anyway
        let src_compas_dist = self.compas_dist.clone();
        let src_compas_clone = self.compas_clone.clone();

        for i in 0..self.n {
            if !will_clone[i] {
                continue;
            }
            let j = compas[i];
            self.states[i] = src_states[j].clone();
            self.actions[i] = src_actions[j].clone();
            self.dt[i] = src_dt[j];
            self.rewards[i] = src_rewards[j];
            self.cum_rewards[i] = src_cum[j];
            self.oobs[i] = src_oobs[j];
            self.terminals[i] = src_terminals[j];
            self.compas_dist[i] = src_compas_dist[j];
            self.compas_clone[i] = src_compas_clone[j];
        }

        for (alive, oob) in self.alive_mask.iter_mut().zip(self.oobs.iter()) {
            *alive = !oob;
        }

        let names: Vec<String> = self.extra.keys().cloned().collect();
        for name in names {
            let snapshot = self.extra.get(&name).unwrap().clone();
            let col = self.extra.get_mut(&name).unwrap();
            for i in 0..self.n {
                if will_clone[i] {
                    col.copy_from(i, &snapshot, compas[i]);
                }
            }
        }

        self.recompute_ids();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: i64) -> WalkerRecord<i64, i64> {
        WalkerRecord {
            state: n,
            observ: vec![0.0],
            action: 0,
            dt: 1,
            reward: 0.0,
            cum_reward: 0.0,
            oob: false,
            terminal: false,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn import_broadcasts_and_gather_identity_noop() {
        let mut table = StateTable::import_walker(&record(7), 4, Schema::new());
        assert_eq!(table.len(), 4);
        assert!(table.states.iter().all(|&s| s == 7));

        let before = table.states.clone();
        table.gather_clone(&[false, false, false, false], &[0, 1, 2, 3]);
        assert_eq!(table.states, before);
    }

    #[test]
    fn gather_clone_reads_pre_update_snapshot() {
        let mut table = StateTable::import_walker(&record(0), 3, Schema::new());
        table.states = vec![10, 20, 30];
        // walker 0 clones from 1, walker 1 clones from 0: a naive in-place
        // copy would corrupt one of these depending on iteration order.
        table.gather_clone(&[true, true, false], &[1, 0, 2]);
        assert_eq!(table.states, vec![20, 10, 30]);
    }

    #[test]
    fn export_import_round_trip() {
        let table = StateTable::import_walker(&record(5), 3, Schema::new());
        let exported = table.export_walker(1);
        let table2 = StateTable::import_walker(&exported, 3, Schema::new());
        assert_eq!(table2.states, table.states);
        assert_eq!(table2.rewards, table.rewards);
    }
}
