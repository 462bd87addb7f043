use super::{Callback, CallbackContext};
use crate::env::Environment;

/// logs a one-line summary of `rewards`/`distances`/`virtual_rewards` every
/// `every` epochs; the in-scope shape of the original `report.py` reporter,
/// minus its plotting/HTML output (out of scope per §1)
pub struct LoggingCallback {
    every: usize,
}

impl LoggingCallback {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl<E: Environment> Callback<E> for LoggingCallback {
    fn name(&self) -> &str {
        "logging"
    }

    fn after_walkers(&mut self, ctx: &mut CallbackContext<E>) {
        if ctx.epoch % self.every != 0 {
            return;
        }
        let table = &ctx.table;
        let alive = table.oobs.iter().filter(|&&o| !o).count();
        let best_reward = table
            .cum_rewards
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let mean_distance =
            table.distances.iter().sum::<f64>() / table.distances.len().max(1) as f64;
        let mean_vr =
            table.virtual_rewards.iter().sum::<f64>() / table.virtual_rewards.len().max(1) as f64;
        log::info!(
            "epoch {} | alive {}/{} | best cum_reward {:.4} | mean distance {:.4} | mean virtual_reward {:.4}",
            ctx.epoch,
            alive,
            table.len(),
            best_reward,
            mean_distance,
            mean_vr,
        );
    }
}
