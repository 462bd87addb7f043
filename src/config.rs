use serde::{Deserialize, Serialize};

use crate::error::SwarmError;

/// tunables for a single swarm run, serializable so a caller can load one
/// from a config file or construct it from CLI flags (see `src/bin/explore.rs`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmConfig {
    /// number of walkers (N)
    pub walkers: usize,
    /// hard cap on epochs before the orchestrator terminates unconditionally
    pub max_epochs: usize,
    /// exponent applied to the relativized reward in `virtual_rewards`
    pub reward_scale: f32,
    /// exponent applied to the relativized distance in `virtual_rewards`
    pub dist_scale: f32,
    /// if true, lower `cum_rewards` is better (best-so-far becomes an argmin)
    pub minimize: bool,
    /// if true, `cum_rewards += rewards` each epoch; otherwise `cum_rewards = rewards`
    pub accumulate_rewards: bool,
    /// worker count for the parallel executor; `None` defaults to `num_cpus::get()`
    pub n_workers: Option<usize>,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// overwrite walker `N-1` with the best-so-far record at the final epoch
    pub pin_best: bool,
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<(), SwarmError> {
        if self.walkers == 0 {
            return Err(SwarmError::Misconfiguration(
                "walkers must be at least 1".into(),
            ));
        }
        if self.reward_scale < 0.0 || self.dist_scale < 0.0 {
            return Err(SwarmError::Misconfiguration(
                "reward_scale and dist_scale must be non-negative".into(),
            ));
        }
        if let Some(0) = self.n_workers {
            return Err(SwarmError::Misconfiguration(
                "n_workers must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }

    /// worker count after defaulting to the host's logical CPU count, as
    /// the teacher's `Pool::new` does
    pub fn resolved_workers(&self) -> usize {
        self.n_workers.unwrap_or_else(|| {
            #[cfg(feature = "cli")]
            {
                num_cpus::get()
            }
            #[cfg(not(feature = "cli"))]
            {
                1
            }
        })
    }
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            walkers: 64,
            max_epochs: 100,
            reward_scale: 1.0,
            dist_scale: 1.0,
            minimize: false,
            accumulate_rewards: true,
            n_workers: None,
            seed: None,
            pin_best: false,
        }
    }
}
