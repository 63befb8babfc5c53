use std::{mem, rc::Rc};

use crate::{
    trace::{Trace, Traces},
    Badness, Pc, ProgramInfo, VmError,
};

use super::generation::Generation;

/// Execution state of a single run of the VM.
///
/// Threads are not represented directly: generations schedule pcs with
/// their badness, and traces remember the steps taken between pcs. At the
/// end of a generation the steps are turned into traces for the threads
/// that made it into the next one.
pub(crate) struct Scheduler<R> {
    current: Generation,
    next: Generation,
    traces: Traces<R>,
    // Accepted pcs in the current generation
    accepted: Vec<Pc>,
}

impl<R> Scheduler<R> {
    pub fn new(info: &ProgramInfo) -> Scheduler<R> {
        let mut scheduler = Scheduler {
            current: Generation::new(info.program_len),
            next: Generation::new(info.program_len),
            traces: Traces::new(info),
            accepted: Vec::new(),
        };
        scheduler.reset();
        scheduler
    }

    /// Start over with a single thread at the first instruction
    pub fn reset(&mut self) {
        self.current.reset();
        self.next.reset();
        self.current.add(0, 0);

        self.accepted.clear();
        self.traces.reset(true);
    }

    /// Pc of the next thread to execute in the current generation
    pub fn next_thread_pc(&mut self) -> Option<Pc> {
        self.current.next_pc()
    }

    /// Continue the thread at `from` in `to` within the current generation,
    /// with `delta` added to its badness
    pub fn step(&mut self, from: Pc, to: Pc, delta: Badness) {
        let scheduled = self.traces.has(to);
        self.traces.add(from, to);

        let badness = self.current.badness(from).saturating_add(delta);
        if scheduled {
            self.current.reschedule(to, badness);
        } else {
            self.current.add(to, badness);
        }
    }

    /// Continue the thread at `from` in `to` in the next generation,
    /// keeping its badness
    pub fn step_to_next_generation(&mut self, from: Pc, to: Pc) {
        let scheduled = self.traces.has_survivor(to);
        self.traces.add_survivor(from, to);

        let badness = self.current.badness(from);
        if scheduled {
            self.next.reschedule(to, badness);
        } else {
            self.next.add(to, badness);
        }
    }

    /// The thread at `pc` accepted the input. Its trace will be part of
    /// the result.
    pub fn accept(&mut self, pc: Pc) {
        self.accepted.push(pc);
        self.traces.add_survivor(pc, pc);
    }

    /// The thread at `pc` ended without accepting.
    pub fn fail(&mut self, pc: Pc) {
        // Could be used to explain why input was not accepted
        log::trace!("Thread failed at pc {pc}");
    }

    /// Attach `record` to the traces passing through `pc`
    pub fn record(&mut self, pc: Pc, record: R) {
        self.traces.record(pc, record);
    }

    /// Finish the current generation: build traces for the survivors and
    /// continue with the next generation.
    pub fn next_generation(&mut self) -> Result<(), VmError> {
        self.traces.build_survivor_traces()?;
        self.traces.reset(false);

        self.current.reset();
        mem::swap(&mut self.current, &mut self.next);
        Ok(())
    }

    /// Unique traces of the accepted threads, available after the last
    /// generation has finished
    pub fn accepting_traces(&self) -> Vec<Rc<Trace<R>>> {
        self.traces.traces_for(&self.accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> Scheduler<&'static str> {
        Scheduler::new(&ProgramInfo::stub(10))
    }

    fn paths(traces: &[Rc<Trace<&'static str>>]) -> Vec<Vec<&'static str>> {
        traces
            .iter()
            .flat_map(|trace| trace.paths())
            .map(|path| path.into_iter().copied().collect())
            .collect()
    }

    #[test]
    fn reset() {
        let mut scheduler = scheduler();
        scheduler.step(0, 1, 0);
        scheduler.reset();
        assert_eq!(Some(0), scheduler.next_thread_pc());
        assert_eq!(None, scheduler.next_thread_pc());
    }

    #[test]
    fn step() {
        let mut scheduler = scheduler();
        scheduler.step(0, 1, 0);
        assert_eq!(Some(0), scheduler.next_thread_pc());
        assert_eq!(Some(1), scheduler.next_thread_pc());
        assert_eq!(None, scheduler.next_thread_pc());

        scheduler.next_generation().unwrap();
        assert_eq!(None, scheduler.next_thread_pc());
    }

    #[test]
    fn step_reschedules() {
        let mut scheduler = scheduler();
        scheduler.step(0, 1, 0);
        scheduler.step(0, 2, 1);
        scheduler.step(0, 1, 2);
        assert_eq!(Some(0), scheduler.next_thread_pc());
        assert_eq!(Some(2), scheduler.next_thread_pc());
        assert_eq!(Some(1), scheduler.next_thread_pc());
        assert_eq!(None, scheduler.next_thread_pc());

        scheduler.next_generation().unwrap();
        assert_eq!(None, scheduler.next_thread_pc());
    }

    #[test]
    fn step_to_next_generation() {
        let mut scheduler = scheduler();
        scheduler.step_to_next_generation(0, 1);
        assert_eq!(Some(0), scheduler.next_thread_pc());
        assert_eq!(None, scheduler.next_thread_pc());

        scheduler.next_generation().unwrap();
        assert_eq!(Some(1), scheduler.next_thread_pc());
        assert_eq!(None, scheduler.next_thread_pc());
    }

    #[test]
    fn step_to_next_generation_reschedules() {
        let mut scheduler = scheduler();
        scheduler.step(0, 2, 5);
        scheduler.step_to_next_generation(0, 1);
        scheduler.step_to_next_generation(0, 2);
        scheduler.step_to_next_generation(2, 1);

        assert_eq!(Some(0), scheduler.next_thread_pc());
        assert_eq!(Some(2), scheduler.next_thread_pc());
        assert_eq!(None, scheduler.next_thread_pc());

        scheduler.next_generation().unwrap();
        assert_eq!(Some(2), scheduler.next_thread_pc());
        assert_eq!(Some(1), scheduler.next_thread_pc());
        assert_eq!(None, scheduler.next_thread_pc());
    }

    #[test]
    fn accept() {
        let mut scheduler = scheduler();
        scheduler.accept(0);
        scheduler.next_generation().unwrap();
        assert_eq!(1, scheduler.accepting_traces().len());
    }

    #[test]
    fn fail_does_nothing() {
        let mut scheduler = scheduler();
        assert_eq!(Some(0), scheduler.next_thread_pc());
        scheduler.fail(0);
        assert_eq!(None, scheduler.next_thread_pc());
    }

    #[test]
    fn record() {
        let mut scheduler = scheduler();
        scheduler.record(0, "123");
        scheduler.accept(0);
        scheduler.next_generation().unwrap();
        let traces = scheduler.accepting_traces();
        assert_eq!(1, traces.len());
        assert_eq!(Some(&"123"), traces[0].record());
    }

    #[test]
    fn next_generation() {
        let mut scheduler = scheduler();
        scheduler.step(0, 1, 0);
        scheduler.next_generation().unwrap();
        assert_eq!(None, scheduler.next_thread_pc());
        scheduler.next_generation().unwrap();
        assert_eq!(None, scheduler.next_thread_pc());
    }

    #[test]
    fn untraceable_path() {
        let mut scheduler = scheduler();
        assert_eq!(Some(0), scheduler.next_thread_pc());
        scheduler.step(1, 2, 0);
        assert_eq!(Some(2), scheduler.next_thread_pc());
        scheduler.accept(2);
        assert_eq!(None, scheduler.next_thread_pc());
        assert_eq!(
            Err(VmError::TraceWithoutSource(1)),
            scheduler.next_generation()
        );
    }

    #[test]
    fn traces_over_generations() {
        let mut scheduler = scheduler();
        assert_eq!(Some(0), scheduler.next_thread_pc());
        scheduler.record(0, "test");
        scheduler.step(0, 1, 0);
        scheduler.step(0, 3, 0);
        scheduler.step(0, 4, 0);
        assert_eq!(Some(1), scheduler.next_thread_pc());
        scheduler.record(1, "branch 1");
        scheduler.step_to_next_generation(1, 2);
        assert_eq!(Some(3), scheduler.next_thread_pc());
        scheduler.record(3, "branch 2");
        scheduler.step_to_next_generation(3, 2);
        assert_eq!(Some(4), scheduler.next_thread_pc());
        scheduler.record(4, "branch 3");
        scheduler.step_to_next_generation(4, 5);
        assert_eq!(None, scheduler.next_thread_pc());
        scheduler.next_generation().unwrap();

        assert_eq!(Some(2), scheduler.next_thread_pc());
        scheduler.record(2, "next generation");
        scheduler.step(2, 3, 0);
        assert_eq!(Some(5), scheduler.next_thread_pc());
        scheduler.record(5, "next generation (2)");
        scheduler.accept(5);
        assert_eq!(Some(3), scheduler.next_thread_pc());
        scheduler.accept(3);
        assert_eq!(None, scheduler.next_thread_pc());
        scheduler.next_generation().unwrap();

        assert_eq!(
            vec![
                vec!["test", "branch 3", "next generation (2)"],
                vec!["test", "branch 1", "next generation"],
                vec!["test", "branch 2", "next generation"],
            ],
            paths(&scheduler.accepting_traces())
        );
    }

    #[test]
    fn unique_traces() {
        // One input item, tests only succeed in the first generation and
        // accepts in the second:
        // jump -> test -> jump -> test -> accept
        //  \______________/  \_____________/
        let mut scheduler = scheduler();
        assert_eq!(Some(0), scheduler.next_thread_pc());
        scheduler.step(0, 1, 0);
        scheduler.step(0, 2, 0);
        assert_eq!(Some(1), scheduler.next_thread_pc());
        scheduler.step_to_next_generation(1, 2);
        assert_eq!(Some(2), scheduler.next_thread_pc());
        scheduler.step(2, 3, 0);
        scheduler.step(2, 4, 0);
        assert_eq!(Some(3), scheduler.next_thread_pc());
        scheduler.step_to_next_generation(3, 4);
        assert_eq!(Some(4), scheduler.next_thread_pc());
        scheduler.fail(4);
        assert_eq!(None, scheduler.next_thread_pc());
        scheduler.next_generation().unwrap();

        assert_eq!(Some(2), scheduler.next_thread_pc());
        scheduler.step(2, 3, 0);
        scheduler.step(2, 4, 0);
        assert_eq!(Some(4), scheduler.next_thread_pc());
        scheduler.accept(4);
        assert_eq!(Some(3), scheduler.next_thread_pc());
        scheduler.fail(3);
        assert_eq!(None, scheduler.next_thread_pc());
        scheduler.next_generation().unwrap();

        assert_eq!(None, scheduler.next_thread_pc());

        let traces = scheduler.accepting_traces();
        assert_eq!(1, traces.len());
        assert!(traces[0].is_empty());
        assert_eq!(vec![Vec::<&str>::new()], paths(&traces));
    }
}
