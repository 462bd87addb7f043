use crate::table::Column;

/// combines the first actions taken by every inner walker into a single
/// outer action (§4.7 step 4)
pub trait AggregateActions: Sized {
    fn aggregate(actions: &[Self]) -> Self;
}

/// stores/retrieves an [`crate::Environment::Action`] in the dynamically
/// typed `init_actions` extra column, so [`super::FmcComposer`] can track
/// each inner walker's epoch-0 action through cloning rather than freezing
/// a pre-cloning snapshot
pub trait ActionColumn: Sized {
    fn to_column(actions: &[Self]) -> Column;
    fn from_column(column: &Column) -> Vec<Self>;
}

impl ActionColumn for u8 {
    fn to_column(actions: &[u8]) -> Column {
        Column::I64(actions.iter().map(|&a| a as i64).collect())
    }

    fn from_column(column: &Column) -> Vec<u8> {
        match column {
            Column::I64(v) => v.iter().map(|&x| x as u8).collect(),
            _ => panic!("init_actions column type mismatch: expected I64"),
        }
    }
}

impl ActionColumn for Vec<f32> {
    fn to_column(actions: &[Vec<f32>]) -> Column {
        Column::VecF32(actions.to_vec())
    }

    fn from_column(column: &Column) -> Vec<Vec<f32>> {
        match column {
            Column::VecF32(v) => v.clone(),
            _ => panic!("init_actions column type mismatch: expected VecF32"),
        }
    }
}

/// discrete action space: majority vote (argmax of a bincount)
impl AggregateActions for u8 {
    fn aggregate(actions: &[u8]) -> u8 {
        if actions.is_empty() {
            return 0;
        }
        let n_actions = *actions.iter().max().unwrap() as usize + 1;
        let mut counts = vec![0usize; n_actions];
        for &a in actions {
            counts[a as usize] += 1;
        }
        counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, count)| *count)
            .map(|(action, _)| action as u8)
            .unwrap_or(0)
    }
}

/// continuous action space: per-dimension mean across walkers
impl AggregateActions for Vec<f32> {
    fn aggregate(actions: &[Vec<f32>]) -> Vec<f32> {
        let Some(dim) = actions.first().map(|a| a.len()) else {
            return Vec::new();
        };
        let mut mean = vec![0.0f32; dim];
        for action in actions {
            for (m, v) in mean.iter_mut().zip(action.iter()) {
                *m += v;
            }
        }
        let n = actions.len().max(1) as f32;
        for m in mean.iter_mut() {
            *m /= n;
        }
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_majority_vote_picks_the_most_common_arm() {
        let votes = vec![0u8, 2, 2, 1, 2];
        assert_eq!(u8::aggregate(&votes), 2);
    }

    #[test]
    fn continuous_mean_is_elementwise() {
        let votes = vec![vec![0.0, 2.0], vec![2.0, 0.0]];
        assert_eq!(Vec::<f32>::aggregate(&votes), vec![1.0, 1.0]);
    }
}
