use thiserror::Error;

use crate::Pc;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Invalid program: program could run past end at pc {0}")]
    RunsPastEnd(Pc),

    #[error("Invalid program: {0} instructions is more than supported")]
    ProgramTooLong(usize),

    #[error("Trace without source at pc {0}")]
    TraceWithoutSource(Pc),
}
