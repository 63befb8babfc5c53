use std::{mem, rc::Rc, slice};

use super::Trace;

/// Set of traces compared by identity.
///
/// Nearly all sets built while tracing hold zero or one trace, so a vector
/// is only allocated once a second distinct trace is added.
pub(crate) enum LazySet<R> {
    Empty,
    Single(Rc<Trace<R>>),
    Many(Vec<Rc<Trace<R>>>),
}

impl<R> LazySet<R> {
    pub fn insert(&mut self, trace: Rc<Trace<R>>) {
        match self {
            LazySet::Empty => *self = LazySet::Single(trace),
            LazySet::Single(existing) => {
                if Rc::ptr_eq(existing, &trace) {
                    return;
                }

                if let LazySet::Single(first) = mem::take(self) {
                    *self = LazySet::Many(vec![first, trace]);
                }
            }
            LazySet::Many(traces) => {
                if !traces.iter().any(|t| Rc::ptr_eq(t, &trace)) {
                    traces.push(trace);
                }
            }
        }
    }

    /// Add all of the traces in `other`
    pub fn union(&mut self, other: &LazySet<R>) {
        for trace in other.as_slice() {
            self.insert(trace.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LazySet::Empty)
    }

    pub fn as_slice(&self) -> &[Rc<Trace<R>>] {
        match self {
            LazySet::Empty => &[],
            LazySet::Single(trace) => slice::from_ref(trace),
            LazySet::Many(traces) => traces,
        }
    }

    pub fn into_vec(self) -> Vec<Rc<Trace<R>>> {
        match self {
            LazySet::Empty => Vec::new(),
            LazySet::Single(trace) => vec![trace],
            LazySet::Many(traces) => traces,
        }
    }
}

impl<R> Default for LazySet<R> {
    fn default() -> Self {
        LazySet::Empty
    }
}

impl<R> Clone for LazySet<R> {
    fn clone(&self) -> Self {
        match self {
            LazySet::Empty => LazySet::Empty,
            LazySet::Single(trace) => LazySet::Single(trace.clone()),
            LazySet::Many(traces) => LazySet::Many(traces.clone()),
        }
    }
}
