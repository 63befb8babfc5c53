use std::{mem, rc::Rc};

use rustc_hash::FxHashSet;

use crate::{Pc, ProgramInfo, VmError};

use super::{tracer::Tracer, FromBuffer, Trace};

/// Steps and records of the current generation, and the traces of the
/// threads that survived into it.
pub(crate) struct Traces<R> {
    // Incoming steps by pc
    from_by_pc: FromBuffer,
    from_by_survivor_pc: FromBuffer,

    // Records made in the current generation
    record_by_pc: Vec<Option<R>>,

    // Traces of the threads that survived into the current generation,
    // swapped with the next ones at the end of each generation
    trace_by_survivor_pc: Vec<Option<Rc<Trace<R>>>>,
    next_trace_by_survivor_pc: Vec<Option<Rc<Trace<R>>>>,

    tracer: Tracer<R>,
}

impl<R> Traces<R> {
    pub fn new(info: &ProgramInfo) -> Traces<R> {
        let len = info.program_len;
        let mut traces = Traces {
            from_by_pc: FromBuffer::new(&info.max_from_by_pc),
            from_by_survivor_pc: FromBuffer::new(&info.max_survivor_from_by_pc),
            record_by_pc: (0..len).map(|_| None).collect(),
            trace_by_survivor_pc: vec![None; len],
            next_trace_by_survivor_pc: vec![None; len],
            tracer: Tracer::new(len),
        };
        traces.start();
        traces
    }

    fn start(&mut self) {
        if let Some(first) = self.trace_by_survivor_pc.first_mut() {
            *first = Some(Trace::empty());
        }
    }

    /// Clear the steps and records of the current generation. If
    /// `clear_survivors` is set also forget the survivors, starting over at
    /// the first instruction.
    pub fn reset(&mut self, clear_survivors: bool) {
        self.from_by_pc.clear();
        self.from_by_survivor_pc.clear();
        self.record_by_pc.fill_with(|| None);

        if clear_survivors {
            self.trace_by_survivor_pc.fill(None);
            self.next_trace_by_survivor_pc.fill(None);
            self.start();
        }
    }

    pub fn record(&mut self, pc: Pc, record: R) {
        self.record_by_pc[pc] = Some(record);
    }

    /// Whether `pc` has been reached in the current generation
    pub fn has(&self, pc: Pc) -> bool {
        self.from_by_pc.has(pc) || self.trace_by_survivor_pc[pc].is_some()
    }

    pub fn add(&mut self, from: Pc, to: Pc) {
        self.from_by_pc.add(from, to);
    }

    /// Whether `pc` has been reached for the next generation
    pub fn has_survivor(&self, pc: Pc) -> bool {
        self.from_by_survivor_pc.has(pc)
    }

    pub fn add_survivor(&mut self, from: Pc, to: Pc) {
        self.from_by_survivor_pc.add(from, to);
    }

    /// Build the traces of the threads surviving into the next generation
    pub fn build_survivor_traces(&mut self) -> Result<(), VmError> {
        self.tracer.build_survivor_traces(
            &self.trace_by_survivor_pc,
            &mut self.next_trace_by_survivor_pc,
            &self.from_by_survivor_pc,
            &self.from_by_pc,
            &mut self.record_by_pc,
        )?;

        mem::swap(
            &mut self.trace_by_survivor_pc,
            &mut self.next_trace_by_survivor_pc,
        );
        Ok(())
    }

    /// Unique survivor traces for the given pcs, in order of first
    /// occurrence
    pub fn traces_for(&self, pcs: &[Pc]) -> Vec<Rc<Trace<R>>> {
        let mut seen = FxHashSet::default();
        pcs.iter()
            .filter_map(|pc| self.trace_by_survivor_pc[*pc].as_ref())
            .filter(|trace| seen.insert(Rc::as_ptr(trace)))
            .cloned()
            .collect()
    }
}
