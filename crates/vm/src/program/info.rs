use crate::VmError;

use super::{Instruction, Pc};

/// Static information about a program, used to size the buffers of a
/// running VM so they never need to grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub(crate) program_len: usize,
    /// Maximum number of incoming steps within a generation, by pc
    pub(crate) max_from_by_pc: Vec<usize>,
    /// Maximum number of incoming steps from the previous generation, by pc
    pub(crate) max_survivor_from_by_pc: Vec<usize>,
}

impl ProgramInfo {
    /// Validate the program and compute the maximum fan-in of each pc.
    ///
    /// Fails if any instruction could continue past the end of the program.
    pub fn from_program<I, R, O>(program: &[Instruction<I, R, O>]) -> Result<ProgramInfo, VmError> {
        use Instruction::*;

        let len = program.len();
        // Threads start at pc 0, which must exist
        if len == 0 {
            return Err(VmError::RunsPastEnd(0));
        }
        if u32::try_from(len).is_err() {
            return Err(VmError::ProgramTooLong(len));
        }

        let mut max_from_by_pc = vec![0; len];
        let mut max_survivor_from_by_pc = vec![0; len];
        let next = |pc: Pc| {
            if pc + 1 < len {
                Ok(pc + 1)
            } else {
                Err(VmError::RunsPastEnd(pc))
            }
        };

        for (pc, inst) in program.iter().enumerate() {
            match inst {
                // Threads never continue past an unconditional fail
                Fail(None) => {}
                Fail(Some(_)) | Bad(_) | Record { .. } => {
                    max_from_by_pc[next(pc)?] += 1;
                }
                Jump(targets) => {
                    for &target in targets {
                        if target >= len {
                            return Err(VmError::RunsPastEnd(pc));
                        }
                        max_from_by_pc[target] += 1;
                    }
                }
                Test(_) => {
                    max_survivor_from_by_pc[next(pc)?] += 1;
                }
                // An accepting thread survives into the next generation
                // as itself
                Accept => {
                    max_survivor_from_by_pc[pc] += 1;
                }
            }
        }

        Ok(ProgramInfo {
            program_len: len,
            max_from_by_pc,
            max_survivor_from_by_pc,
        })
    }

    /// Info with every bound maxed out, so any sequence of steps within a
    /// program of `program_len` can be simulated.
    #[cfg(test)]
    pub(crate) fn stub(program_len: usize) -> ProgramInfo {
        ProgramInfo {
            program_len,
            max_from_by_pc: vec![program_len; program_len],
            max_survivor_from_by_pc: vec![program_len; program_len],
        }
    }

    pub fn program_len(&self) -> usize {
        self.program_len
    }

    pub fn max_from(&self, pc: Pc) -> usize {
        self.max_from_by_pc[pc]
    }

    pub fn max_survivor_from(&self, pc: Pc) -> usize {
        self.max_survivor_from_by_pc[pc]
    }
}
