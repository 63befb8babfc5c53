use std::rc::Rc;

use crate::{Pc, VmError};

use super::{lazy_set::LazySet, FromBuffer, Trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TracingState {
    NotVisited,
    InCurrentPath,
    Done,
}

/// Builds the traces of the survivors of a generation by following the
/// steps taken during it backwards.
pub(crate) struct Tracer<R> {
    state_by_pc: Vec<TracingState>,
    // Only written once a pc is done, so it is empty while the pc is in the
    // current path
    prefixes_by_pc: Vec<LazySet<R>>,
}

impl<R> Tracer<R> {
    pub fn new(program_len: usize) -> Tracer<R> {
        Tracer {
            state_by_pc: vec![TracingState::NotVisited; program_len],
            prefixes_by_pc: (0..program_len).map(|_| LazySet::default()).collect(),
        }
    }

    /// Compute the prefixes for `pc` into `prefixes_by_pc`
    fn trace(
        &mut self,
        pc: Pc,
        previous_trace_by_survivor_pc: &[Option<Rc<Trace<R>>>],
        from_by_pc: &FromBuffer,
        record_by_pc: &mut [Option<R>],
    ) -> Result<(), VmError> {
        match self.state_by_pc[pc] {
            TracingState::Done => return Ok(()),
            // Path loops back on itself and adds nothing new
            TracingState::InCurrentPath => return Ok(()),
            TracingState::NotVisited => {}
        }

        self.state_by_pc[pc] = TracingState::InCurrentPath;

        let mut prefixes = LazySet::default();
        match &previous_trace_by_survivor_pc[pc] {
            Some(start) => prefixes.insert(start.clone()),
            None if !from_by_pc.has(pc) => return Err(VmError::TraceWithoutSource(pc)),
            None => {}
        }

        for from in from_by_pc.iter(pc) {
            self.trace(from, previous_trace_by_survivor_pc, from_by_pc, record_by_pc)?;
            prefixes.union(&self.prefixes_by_pc[from]);
        }

        if !prefixes.is_empty() {
            if let Some(record) = record_by_pc[pc].take() {
                let prefixes = match prefixes {
                    // Recording after nothing is the same as starting fresh
                    LazySet::Single(only) if only.is_empty() => Vec::new(),
                    prefixes => prefixes.into_vec(),
                };
                let trace = Trace::new(prefixes, Some(record));
                self.prefixes_by_pc[pc] = LazySet::Single(Rc::new(trace));
                self.state_by_pc[pc] = TracingState::Done;
                return Ok(());
            }
        }

        self.prefixes_by_pc[pc] = prefixes;
        self.state_by_pc[pc] = TracingState::Done;
        Ok(())
    }

    /// Build traces for every pc that has incoming steps in
    /// `from_by_survivor_pc`, writing them to `next_trace_by_survivor_pc`.
    pub fn build_survivor_traces(
        &mut self,
        previous_trace_by_survivor_pc: &[Option<Rc<Trace<R>>>],
        next_trace_by_survivor_pc: &mut [Option<Rc<Trace<R>>>],
        from_by_survivor_pc: &FromBuffer,
        from_by_pc: &FromBuffer,
        record_by_pc: &mut [Option<R>],
    ) -> Result<(), VmError> {
        self.state_by_pc.fill(TracingState::NotVisited);

        let result = self.build(
            previous_trace_by_survivor_pc,
            next_trace_by_survivor_pc,
            from_by_survivor_pc,
            from_by_pc,
            record_by_pc,
        );

        // Do not keep traces alive longer than needed
        self.prefixes_by_pc.fill_with(LazySet::default);
        result
    }

    fn build(
        &mut self,
        previous_trace_by_survivor_pc: &[Option<Rc<Trace<R>>>],
        next_trace_by_survivor_pc: &mut [Option<Rc<Trace<R>>>],
        from_by_survivor_pc: &FromBuffer,
        from_by_pc: &FromBuffer,
        record_by_pc: &mut [Option<R>],
    ) -> Result<(), VmError> {
        for (pc, next) in next_trace_by_survivor_pc.iter_mut().enumerate() {
            if !from_by_survivor_pc.has(pc) {
                *next = None;
                continue;
            }

            let mut prefixes = LazySet::default();
            for from in from_by_survivor_pc.iter(pc) {
                self.trace(from, previous_trace_by_survivor_pc, from_by_pc, record_by_pc)?;
                prefixes.union(&self.prefixes_by_pc[from]);
            }

            let trace = match prefixes {
                LazySet::Single(trace) => trace,
                prefixes => Rc::new(Trace::new(prefixes.into_vec(), None)),
            };
            *next = Some(trace);
        }

        Ok(())
    }
}
