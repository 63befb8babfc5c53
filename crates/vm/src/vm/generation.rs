use crate::{Badness, Pc};

/// Threads scheduled to run in one generation, ordered by badness.
#[derive(Debug)]
pub(crate) struct Generation {
    // Scheduled pcs in order of execution
    scheduled: Box<[Pc]>,
    len: usize,
    // Index of the next pc to execute in scheduled
    next: usize,
    badness_by_pc: Box<[Badness]>,
}

impl Generation {
    pub fn new(program_len: usize) -> Generation {
        Generation {
            scheduled: vec![0; program_len].into(),
            len: 0,
            next: 0,
            badness_by_pc: vec![0; program_len].into(),
        }
    }

    pub fn badness(&self, pc: Pc) -> Badness {
        self.badness_by_pc[pc]
    }

    /// Index of the first not yet executed pc with higher badness, which is
    /// where a pc with `badness` should be inserted. Equal badness goes
    /// after existing entries.
    fn insertion_index(&self, badness: Badness) -> usize {
        let pending = &self.scheduled[self.next..self.len];
        self.next + pending.partition_point(|pc| self.badness_by_pc[*pc] <= badness)
    }

    /// Schedule `pc`. The caller must make sure it is not scheduled yet.
    pub fn add(&mut self, pc: Pc, badness: Badness) {
        debug_assert!(
            !self.scheduled[self.next..self.len].contains(&pc),
            "pc {pc} is already scheduled"
        );

        self.badness_by_pc[pc] = badness;
        let index = self.insertion_index(badness);
        self.scheduled.copy_within(index..self.len, index + 1);
        self.scheduled[index] = pc;
        self.len += 1;
    }

    /// Raise the badness of an already scheduled pc. If it has not been
    /// executed yet it is moved to the position matching its new badness.
    pub fn reschedule(&mut self, pc: Pc, badness: Badness) {
        let badness = badness.max(self.badness_by_pc[pc]);
        if badness == self.badness_by_pc[pc] {
            return;
        }

        let pending = self.scheduled[self.next..self.len]
            .iter()
            .position(|scheduled| *scheduled == pc);
        let Some(pos) = pending else {
            // Already executed, only bookkeeping changes
            self.badness_by_pc[pc] = badness;
            return;
        };

        let index = self.next + pos;
        self.scheduled.copy_within(index + 1..self.len, index);
        self.len -= 1;
        self.add(pc, badness);
    }

    /// The scheduled pc with the lowest badness, or `None` if everything
    /// has been executed.
    pub fn next_pc(&mut self) -> Option<Pc> {
        if self.next >= self.len {
            return None;
        }

        let pc = self.scheduled[self.next];
        self.next += 1;
        Some(pc)
    }

    pub fn reset(&mut self) {
        self.len = 0;
        self.next = 0;
        self.badness_by_pc.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(gen: &mut Generation) -> Vec<Pc> {
        std::iter::from_fn(|| gen.next_pc()).collect()
    }

    #[test]
    fn reset() {
        let mut gen = Generation::new(10);
        gen.add(0, 5);
        gen.reset();
        assert_eq!(None, gen.next_pc());
        assert_eq!(0, gen.badness(0));
    }

    #[test]
    fn add_with_badness() {
        let mut gen = Generation::new(10);
        gen.add(5, 123);
        assert_eq!(123, gen.badness(5));
        assert_eq!(Some(5), gen.next_pc());
    }

    #[test]
    fn add_after_others_ran() {
        let mut gen = Generation::new(10);
        gen.add(1, 5);
        gen.add(2, 4);
        assert_eq!(Some(2), gen.next_pc());
        gen.add(3, 0);
        assert_eq!(vec![3, 1], drain(&mut gen));
    }

    #[test]
    fn equal_badness_keeps_insertion_order() {
        let mut gen = Generation::new(10);
        gen.add(4, 1);
        gen.add(2, 0);
        gen.add(3, 1);
        gen.add(1, 0);
        assert_eq!(vec![2, 1, 4, 3], drain(&mut gen));
    }

    #[test]
    fn reschedule_pending() {
        let mut gen = Generation::new(10);
        gen.add(1, 1);
        gen.add(2, 2);
        gen.add(3, 3);
        gen.reschedule(2, 4);
        assert_eq!(4, gen.badness(2));
        assert_eq!(vec![1, 3, 2], drain(&mut gen));
    }

    #[test]
    fn reschedule_only_raises() {
        let mut gen = Generation::new(10);
        gen.add(1, 10);
        gen.add(2, 11);
        gen.reschedule(1, 4);
        assert_eq!(10, gen.badness(1));
        assert_eq!(vec![1, 2], drain(&mut gen));
    }

    #[test]
    fn reschedule_executed() {
        let mut gen = Generation::new(10);
        gen.add(1, 1);
        gen.add(2, 2);
        assert_eq!(Some(1), gen.next_pc());
        gen.reschedule(1, 3);
        assert_eq!(3, gen.badness(1));
        assert_eq!(vec![2], drain(&mut gen));
    }

    #[test]
    fn increasing_badness() {
        let mut gen = Generation::new(10);
        for (pc, badness) in [(1, 5), (2, 4), (3, 3), (4, 2), (5, 1)] {
            gen.add(pc, badness);
        }
        assert_eq!(vec![5, 4, 3, 2, 1], drain(&mut gen));
    }
}
