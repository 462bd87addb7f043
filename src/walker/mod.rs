//! The per-epoch walker math: relativization, diversity measurement,
//! virtual reward, and the companion-sampling cloning step.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::table::{IdHash, StateTable};
use crate::{Score, CLONE_PROB_CLIP, SCORE_MIN_POSITIVE};

/// observables recorded from a single `balance()` call, exposed for
/// logging callbacks (see [`crate::callback`])
#[derive(Debug, Clone, Default)]
pub struct BalanceStats {
    pub alive: usize,
    pub cloned: usize,
    /// only populated when a critic is attached and entropy mode runs
    pub efficiency: Option<f64>,
}

/// configuration for the balance pipeline; owned by [`crate::orchestrator::SwarmOrchestrator`]
/// and derived from [`crate::SwarmConfig`]
#[derive(Debug, Clone, Copy)]
pub struct WalkerEngine {
    pub reward_scale: f32,
    pub dist_scale: f32,
    pub minimize: bool,
}

impl WalkerEngine {
    /// a monotone, strictly-positive, scale-normalizing map: `y = log1p(z) + 1`
    /// for `z > 0`, `y = exp(z)` for `z <= 0`, where `z = (x - mean(x)) / std(x)`.
    /// Falls back to the all-ones vector when `std(x) == 0` or any input is
    /// non-finite.
    pub fn relativize(x: &[f64]) -> Vec<f64> {
        let n = x.len();
        if n == 0 {
            return Vec::new();
        }
        if x.iter().any(|v| !v.is_finite()) {
            return vec![1.0; n];
        }
        let mean = x.iter().sum::<f64>() / n as f64;
        let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let std = var.sqrt();
        if std == 0.0 {
            return vec![1.0; n];
        }
        x.iter()
            .map(|v| {
                let z = (v - mean) / std;
                if z > 0.0 {
                    z.ln_1p() + 1.0
                } else {
                    z.exp()
                }
            })
            .collect()
    }

    /// L2 distance between walker `i`'s observation and its `compas_dist`
    /// companion's observation
    #[cfg(feature = "rayon")]
    fn distance(observs: &[Vec<f32>], compas: &[usize]) -> Vec<f64> {
        use rayon::prelude::*;
        observs
            .par_iter()
            .zip(compas.par_iter())
            .map(|(a, &j)| l2(a, &observs[j]))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn distance(observs: &[Vec<f32>], compas: &[usize]) -> Vec<f64> {
        observs
            .iter()
            .zip(compas.iter())
            .map(|(a, &j)| l2(a, &observs[j]))
            .collect()
    }

    /// run the full per-epoch pipeline: companion sampling for distance,
    /// distance, virtual reward (optionally in entropy mode when
    /// `critic_score` is `Some`), companion sampling for cloning, and the
    /// final `gather_clone`
    pub fn balance<S, A>(
        &self,
        table: &mut StateTable<S, A>,
        critic_score: Option<&[Score]>,
        rng: &mut impl Rng,
    ) -> BalanceStats
    where
        S: Clone + IdHash,
        A: Clone,
    {
        let n = table.len();
        let alive = table.oobs.iter().filter(|&&o| !o).count();

        if n <= 1 {
            table.compas_dist = vec![0; n];
            table.compas_clone = (0..n).collect();
            table.distances = vec![1.0; n];
            table.virtual_rewards = vec![1.0; n];
            table.clone_probs = vec![0.0; n];
            table.will_clone = vec![false; n];
            return BalanceStats {
                alive,
                cloned: 0,
                efficiency: None,
            };
        }

        // 1. companion sampling for distance: a random permutation of 0..N-1
        let mut compas_dist: Vec<usize> = (0..n).collect();
        compas_dist.shuffle(rng);
        table.compas_dist = compas_dist.clone();

        // 2. distance
        let d = Self::distance(&table.observs, &compas_dist);
        table.distances = Self::relativize(&d);

        // 3. virtual reward
        let r: Vec<f64> = if self.minimize {
            table.cum_rewards.iter().map(|&c| -c).collect()
        } else {
            table.cum_rewards.clone()
        };
        let pr = Self::relativize(&r);

        let mut efficiency = None;
        let mut vr: Vec<f64> = if critic_score.is_some() {
            let reward_pow: Vec<f64> = pr.iter().map(|v| v.powf(self.reward_scale as f64)).collect();
            let dist_pow: Vec<f64> = table
                .distances
                .iter()
                .map(|v| v.powf(self.dist_scale as f64))
                .collect();
            let reward_sum: f64 = reward_pow.iter().sum();
            let dist_sum: f64 = dist_pow.iter().sum();
            let reward_prob: Vec<f64> = reward_pow.iter().map(|v| v / reward_sum).collect();
            let dist_prob: Vec<f64> = dist_pow.iter().map(|v| v / dist_sum).collect();
            let virtual_rewards: Vec<f64> = dist_prob
                .iter()
                .zip(reward_prob.iter())
                .map(|(d, r)| 2.0 - d.powf(*r))
                .collect();
            let numerator: f64 = reward_prob.iter().map(|r| 2.0 - r.powf(*r)).product();
            let denominator: f64 = virtual_rewards.iter().product();
            efficiency = Some(numerator / denominator);
            virtual_rewards
        } else {
            pr.iter()
                .zip(table.distances.iter())
                .map(|(r, d)| r.powf(self.reward_scale as f64) * d.powf(self.dist_scale as f64))
                .collect()
        };

        // 4. critic multiplicand, floored so virtual_rewards stays strictly positive
        if let Some(scores) = critic_score {
            for (v, s) in vr.iter_mut().zip(scores.iter()) {
                *v *= s.max(SCORE_MIN_POSITIVE);
            }
        }
        table.virtual_rewards = vr.clone();

        // 5. companion sampling for cloning
        let alive_idx: Vec<usize> = (0..n).filter(|&i| !table.oobs[i]).collect();
        let all_equal = vr.windows(2).all(|w| (w[0] - w[1]).abs() < f64::EPSILON);

        let (compas_clone, clone_probs) = if all_equal || alive_idx.is_empty() {
            ((0..n).collect::<Vec<_>>(), vec![0.0; n])
        } else {
            let m = alive_idx.len();
            let mut compas = vec![0usize; n];
            for (i, slot) in compas.iter_mut().enumerate() {
                *slot = if i < m {
                    alive_idx[i]
                } else {
                    *alive_idx.choose(rng).unwrap()
                };
            }
            let probs: Vec<f64> = (0..n)
                .map(|i| {
                    let ratio = (vr[compas[i]] - vr[i]) / vr[i];
                    ratio.clamp(0.0, CLONE_PROB_CLIP).sqrt()
                })
                .collect();
            (compas, probs)
        };
        table.compas_clone = compas_clone.clone();
        table.clone_probs = clone_probs.clone();

        // 6. sample will_clone; dead walkers always clone
        let mut will_clone: Vec<bool> = clone_probs
            .iter()
            .map(|&p| rng.random::<f64>() < p)
            .collect();
        for (wc, &oob) in will_clone.iter_mut().zip(table.oobs.iter()) {
            if oob {
                *wc = true;
            }
        }
        table.will_clone = will_clone.clone();

        // 7. clone
        let cloned = will_clone.iter().filter(|&&w| w).count();
        table.gather_clone(&will_clone, &compas_clone);

        BalanceStats {
            alive,
            cloned,
            efficiency,
        }
    }
}

fn l2(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relativize_constant_vector_is_ones() {
        let v = WalkerEngine::relativize(&[3.0, 3.0, 3.0]);
        assert_eq!(v, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn relativize_is_strictly_positive_and_monotone() {
        let input = [-5.0, -1.0, 0.0, 1.0, 10.0];
        let out = WalkerEngine::relativize(&input);
        assert!(out.iter().all(|&v| v > 0.0 && v.is_finite()));
        for w in out.windows(2) {
            assert!(w[1] >= w[0] - 1e-9);
        }
    }

    #[test]
    fn relativize_coerces_non_finite_inputs() {
        let out = WalkerEngine::relativize(&[1.0, f64::NAN, 3.0]);
        assert_eq!(out, vec![1.0, 1.0, 1.0]);
    }
}
