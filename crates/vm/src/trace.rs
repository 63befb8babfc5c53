mod from_buffer;
mod lazy_set;
mod tracer;
mod traces;

use std::{fmt, mem, rc::Rc};

pub(crate) use self::from_buffer::FromBuffer;
pub(crate) use self::traces::Traces;

/// The distinct execution histories leading up to a point.
///
/// Traces form a DAG: each trace holds at most one record, and refers to
/// the traces preceding it. A trace without prefixes is a root. Traces are
/// shared between all histories that pass through them and never change
/// once created.
pub struct Trace<R> {
    prefixes: Vec<Rc<Trace<R>>>,
    record: Option<R>,
}

impl<R> Trace<R> {
    /// The trace without history, ancestor of all threads at program start
    pub fn empty() -> Rc<Trace<R>> {
        Rc::new(Trace {
            prefixes: Vec::new(),
            record: None,
        })
    }

    pub(crate) fn new(prefixes: Vec<Rc<Trace<R>>>, record: Option<R>) -> Trace<R> {
        Trace { prefixes, record }
    }

    pub fn prefixes(&self) -> &[Rc<Trace<R>>] {
        &self.prefixes
    }

    pub fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    /// Whether this trace has no history at all
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.record.is_none()
    }

    /// Enumerate the record sequences of every path from a root to this
    /// trace, following prefixes in order.
    ///
    /// The number of paths can grow exponentially with the input, prefer
    /// [`Trace::iter_paths`] when only some of them are needed.
    pub fn paths(&self) -> Vec<Vec<&R>> {
        self.iter_paths().collect()
    }

    /// Lazily enumerate the same paths as [`Trace::paths`]
    pub fn iter_paths(&self) -> Paths<'_, R> {
        let mut paths = Paths { stack: Vec::new() };
        paths.descend(self);
        paths
    }
}

/// Iterator over the record sequences of the paths leading to a trace.
///
/// Walks the DAG from the trace towards the roots with an explicit stack,
/// so long histories do not overflow the call stack.
pub struct Paths<'a, R> {
    // Nodes on the current path from the trace to a root, each with the
    // index of the prefix the path continues through
    stack: Vec<(&'a Trace<R>, usize)>,
}

impl<'a, R> Paths<'a, R> {
    /// Follow the first prefixes from `trace` down to a root
    fn descend(&mut self, mut trace: &'a Trace<R>) {
        self.stack.push((trace, 0));
        while let Some(first) = trace.prefixes.first() {
            trace = &**first;
            self.stack.push((trace, 0));
        }
    }

    /// Move on to the next path, backtracking to the closest node with an
    /// unvisited prefix
    fn advance(&mut self) {
        // The root of the current path
        self.stack.pop();

        while let Some((trace, index)) = self.stack.pop() {
            let next = index + 1;
            if let Some(prefix) = trace.prefixes.get(next) {
                self.stack.push((trace, next));
                self.descend(prefix);
                return;
            }
        }
    }
}

impl<'a, R> Iterator for Paths<'a, R> {
    type Item = Vec<&'a R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stack.is_empty() {
            return None;
        }

        let path = self
            .stack
            .iter()
            .rev()
            .filter_map(|&(trace, _)| trace.record.as_ref())
            .collect();
        self.advance();
        Some(path)
    }
}

impl<R> Drop for Trace<R> {
    // Histories grow with the input, drop them iteratively so long chains
    // do not overflow the stack.
    fn drop(&mut self) {
        let mut stack = mem::take(&mut self.prefixes);
        while let Some(prefix) = stack.pop() {
            if let Ok(mut trace) = Rc::try_unwrap(prefix) {
                stack.append(&mut trace.prefixes);
            }
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Trace<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace")
            .field("record", &self.record)
            .field("prefixes", &self.prefixes.len())
            .finish()
    }
}

/// Result of running the VM on an input
#[derive(Debug)]
pub struct MatchResult<R> {
    accepting_traces: Vec<Rc<Trace<R>>>,
}

impl<R> MatchResult<R> {
    pub(crate) fn new(accepting_traces: Vec<Rc<Trace<R>>>) -> MatchResult<R> {
        MatchResult { accepting_traces }
    }

    /// Whether the input was accepted by the program
    pub fn success(&self) -> bool {
        !self.accepting_traces.is_empty()
    }

    /// Traces that lead to the input being accepted, empty if it was not
    pub fn accepting_traces(&self) -> &[Rc<Trace<R>>] {
        &self.accepting_traces
    }

    pub fn into_accepting_traces(self) -> Vec<Rc<Trace<R>>> {
        self.accepting_traces
    }

    /// Record sequences of all accepting paths, trace by trace
    pub fn paths(&self) -> Vec<Vec<&R>> {
        self.iter_paths().collect()
    }

    /// Lazily enumerate the same paths as [`MatchResult::paths`]
    pub fn iter_paths(&self) -> impl Iterator<Item = Vec<&R>> + '_ {
        self.accepting_traces
            .iter()
            .flat_map(|trace| trace.iter_paths())
    }
}
