use super::{Badness, Instruction, Pc, Program};

/// Builds a program by appending instructions.
///
/// Every method returns the appended instruction, so jump targets that are
/// not known yet can be patched in afterwards.
pub struct Assembler<I, R, O = ()> {
    program: Program<I, R, O>,
}

impl<I, R, O> Assembler<I, R, O> {
    pub fn new() -> Assembler<I, R, O> {
        Assembler {
            program: Program::new(Vec::new()),
        }
    }

    /// Number of instructions so far, also the pc of the next instruction
    pub fn len(&self) -> Pc {
        self.program.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.insts.is_empty()
    }

    pub fn program(&self) -> &Program<I, R, O> {
        &self.program
    }

    pub fn into_program(self) -> Program<I, R, O> {
        self.program
    }

    /// Instruction at `pc`, used to patch jump targets once they are known
    pub fn get_mut(&mut self, pc: Pc) -> Option<&mut Instruction<I, R, O>> {
        self.program.insts.get_mut(pc)
    }

    fn push(&mut self, inst: Instruction<I, R, O>) -> &mut Instruction<I, R, O> {
        let insts = &mut self.program.insts;
        insts.push(inst);
        let last = insts.len() - 1;
        &mut insts[last]
    }

    /// Consume an input item if `matcher` accepts it
    pub fn test<F>(&mut self, matcher: F) -> &mut Instruction<I, R, O>
    where
        F: Fn(&I, &O) -> bool + 'static,
    {
        self.push(Instruction::Test(Box::new(matcher)))
    }

    /// Continue at every target
    pub fn jump(&mut self, targets: impl Into<Vec<Pc>>) -> &mut Instruction<I, R, O> {
        self.push(Instruction::Jump(targets.into()))
    }

    /// Record `data` as is
    pub fn record(&mut self, data: R) -> &mut Instruction<I, R, O> {
        self.push(Instruction::Record {
            data,
            generator: None,
        })
    }

    /// Record whatever `generator` produces from `data`, the current input
    /// index and the options
    pub fn record_with<F>(&mut self, data: R, generator: F) -> &mut Instruction<I, R, O>
    where
        F: Fn(&R, usize, &O) -> Option<R> + 'static,
    {
        self.push(Instruction::Record {
            data,
            generator: Some(Box::new(generator)),
        })
    }

    /// Lower the priority of the threads continuing from here
    pub fn bad(&mut self, cost: Badness) -> &mut Instruction<I, R, O> {
        self.push(Instruction::Bad(cost))
    }

    pub fn accept(&mut self) -> &mut Instruction<I, R, O> {
        self.push(Instruction::Accept)
    }

    /// Unconditionally end the thread
    pub fn fail(&mut self) -> &mut Instruction<I, R, O> {
        self.push(Instruction::Fail(None))
    }

    /// End the thread if `predicate` returns true
    pub fn fail_if<F>(&mut self, predicate: F) -> &mut Instruction<I, R, O>
    where
        F: Fn(&O) -> bool + 'static,
    {
        self.push(Instruction::Fail(Some(Box::new(predicate))))
    }
}

impl<I, R, O> Default for Assembler<I, R, O> {
    fn default() -> Self {
        Assembler::new()
    }
}
