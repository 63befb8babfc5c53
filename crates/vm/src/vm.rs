mod generation;
mod scheduler;

use std::cell::RefCell;

use crate::{Assembler, Instruction, MatchResult, Program, ProgramInfo, VmError};

use self::scheduler::Scheduler;

/// Runs a program on input sequences.
///
/// `I` is the type of the input items, `R` the type of the records and `O`
/// the type of the options passed to the instruction callbacks.
pub struct Vm<I, R, O = ()> {
    program: Program<I, R, O>,
    info: ProgramInfo,
    // Schedulers not in use, so callbacks can run the VM again while it is
    // running
    schedulers: RefCell<Vec<Scheduler<R>>>,
}

impl<I, R: Clone, O> Vm<I, R, O> {
    /// Create a VM for `program`. Fails if the program is invalid.
    pub fn new(program: impl Into<Program<I, R, O>>) -> Result<Vm<I, R, O>, VmError> {
        let program = program.into();
        let info = ProgramInfo::from_program(&program)?;
        log::debug!("Created VM for program of {} instructions", program.len());

        Ok(Vm {
            program,
            info,
            schedulers: RefCell::new(Vec::new()),
        })
    }

    /// Assemble a program with `compile` and create a VM for it
    pub fn compile<F>(compile: F) -> Result<Vm<I, R, O>, VmError>
    where
        F: FnOnce(&mut Assembler<I, R, O>),
    {
        let mut asm = Assembler::new();
        compile(&mut asm);
        Vm::new(asm.into_program())
    }

    pub fn program(&self) -> &Program<I, R, O> {
        &self.program
    }

    pub fn info(&self) -> &ProgramInfo {
        &self.info
    }

    /// Run the program on `input`. `options` is passed to all instruction
    /// callbacks.
    ///
    /// Returns the traces of all threads that accepted the input.
    pub fn execute(&self, input: &[I], options: &O) -> Result<MatchResult<R>, VmError> {
        let scheduler = self.schedulers.borrow_mut().pop();
        let mut scheduler = scheduler.unwrap_or_else(|| Scheduler::new(&self.info));
        scheduler.reset();

        let result = self.run(&mut scheduler, input, options);

        // Recycle the scheduler
        scheduler.reset();
        self.schedulers.borrow_mut().push(scheduler);

        result
    }

    fn run(
        &self,
        scheduler: &mut Scheduler<R>,
        input: &[I],
        options: &O,
    ) -> Result<MatchResult<R>, VmError> {
        use Instruction::*;

        let mut index = 0;
        loop {
            let Some(mut pc) = scheduler.next_thread_pc() else {
                // Nothing left to run, no need to look at the rest of the
                // input
                return Ok(MatchResult::new(Vec::new()));
            };

            // None at the end of input
            let item = input.get(index);

            loop {
                match &self.program[pc] {
                    Accept => {
                        if item.is_none() {
                            scheduler.accept(pc);
                        } else {
                            scheduler.fail(pc);
                        }
                    }
                    Fail(predicate) => {
                        let fails = predicate.as_ref().map_or(true, |pred| pred(options));
                        if fails {
                            scheduler.fail(pc);
                        } else {
                            scheduler.step(pc, pc + 1, 0);
                        }
                    }
                    Bad(cost) => {
                        scheduler.step(pc, pc + 1, *cost);
                    }
                    Test(matcher) => match item {
                        Some(item) if matcher(item, options) => {
                            scheduler.step_to_next_generation(pc, pc + 1);
                        }
                        _ => scheduler.fail(pc),
                    },
                    Jump(targets) => {
                        if targets.is_empty() {
                            scheduler.fail(pc);
                        }

                        for target in targets {
                            scheduler.step(pc, *target, 0);
                        }
                    }
                    Record { data, generator } => {
                        let record = match generator {
                            Some(generator) => generator(data, index, options),
                            None => Some(data.clone()),
                        };
                        if let Some(record) = record {
                            scheduler.record(pc, record);
                        }

                        scheduler.step(pc, pc + 1, 0);
                    }
                }

                match scheduler.next_thread_pc() {
                    Some(next) => pc = next,
                    None => break,
                }
            }

            scheduler.next_generation()?;
            log::trace!("Finished generation {index}");

            if item.is_none() {
                break;
            }

            index += 1;
        }

        Ok(MatchResult::new(scheduler.accepting_traces()))
    }
}
