//! The 2-D Rastrigin function as a minimization benchmark (§8.4 scenario 3).

use super::bounded::BoundedContinuousEnv;

const A: f32 = 10.0;

fn rastrigin(x: &[f32]) -> f32 {
    A * x.len() as f32
        + x.iter()
            .map(|v| v * v - A * (2.0 * std::f32::consts::PI * v).cos())
            .sum::<f32>()
}

/// 2-D Rastrigin over `[-5.12, 5.12]^2`, scored by the function value itself
/// (minimized at the origin, where it is zero)
pub fn rastrigin_2d(step: f32) -> BoundedContinuousEnv<impl Fn(&[f32]) -> f32 + Send + Sync> {
    BoundedContinuousEnv::new(vec![-5.12; 2], vec![5.12; 2], step, rastrigin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_global_minimum() {
        assert_eq!(rastrigin(&[0.0, 0.0]), 0.0);
        assert!(rastrigin(&[1.0, -2.0]) > 0.0);
    }
}
