use crate::error::SwarmError;

/// a dynamically-typed column added by an [`crate::Environment`]'s
/// `param_dict`, a [`crate::Policy`]'s `param_dict`, or a
/// [`crate::Callback`]'s `default_outputs`, beyond the standard schema
/// `StateTable` carries as typed fields
#[derive(Debug, Clone)]
pub enum Column {
    Bool(Vec<bool>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    /// one small float vector per walker, used for continuous-action-typed
    /// extra columns (see [`crate::compose::ActionColumn`])
    VecF32(Vec<Vec<f32>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Bool(v) => v.len(),
            Column::I64(v) => v.len(),
            Column::F64(v) => v.len(),
            Column::VecF32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Column::Bool(_) => "bool",
            Column::I64(_) => "i64",
            Column::F64(_) => "f64",
            Column::VecF32(_) => "vec_f32",
        }
    }

    /// overwrite `self` in place with `other`, failing if the length or
    /// variant (type) doesn't match
    pub fn assign(&mut self, name: &'static str, other: Column) -> Result<(), SwarmError> {
        if self.len() != other.len() {
            return Err(SwarmError::SchemaMismatch {
                column: name,
                expected: self.len(),
                got: other.len(),
            });
        }
        if self.kind() != other.kind() {
            return Err(SwarmError::SchemaMismatch {
                column: name,
                expected: self.len(),
                got: other.len(),
            });
        }
        *self = other;
        Ok(())
    }

    /// overwrite position `dst` with the element at `src` read from `from`
    /// (a separate, pre-update snapshot), so chained compas indices never
    /// observe an already-overwritten destination
    pub fn copy_from(&mut self, dst: usize, from: &Column, src: usize) {
        match (self, from) {
            (Column::Bool(v), Column::Bool(s)) => v[dst] = s[src],
            (Column::I64(v), Column::I64(s)) => v[dst] = s[src],
            (Column::F64(v), Column::F64(s)) => v[dst] = s[src],
            (Column::VecF32(v), Column::VecF32(s)) => v[dst] = s[src].clone(),
            _ => unreachable!("Column variant mismatch in copy_from"),
        }
    }

    pub fn single(&self, i: usize) -> Column {
        match self {
            Column::Bool(v) => Column::Bool(vec![v[i]]),
            Column::I64(v) => Column::I64(vec![v[i]]),
            Column::F64(v) => Column::F64(vec![v[i]]),
            Column::VecF32(v) => Column::VecF32(vec![v[i].clone()]),
        }
    }

    /// broadcast a single-element column to `n` rows, used by
    /// [`super::StateTable::import_walker`]
    pub fn broadcast(&self, n: usize) -> Column {
        match self {
            Column::Bool(v) => Column::Bool(vec![v[0]; n]),
            Column::I64(v) => Column::I64(vec![v[0]; n]),
            Column::F64(v) => Column::F64(vec![v[0]; n]),
            Column::VecF32(v) => Column::VecF32(vec![v[0].clone(); n]),
        }
    }
}
