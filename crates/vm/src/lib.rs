//! Bytecode virtual machine for matching and annotating sequences.
//!
//! Programs are built from six instructions (test, jump, record, fail, bad
//! and accept). The VM explores every viable path through the program in
//! lock step with the input, running each program location at most once
//! per input item, and returns the distinct accepting paths as a shared DAG
//! of [`Trace`] nodes.

mod error;
mod program;
mod trace;
mod vm;

pub use error::VmError;
pub use program::{
    Assembler, Badness, Generator, Instruction, Matcher, Pc, Predicate, Program, ProgramInfo,
    MAX_BADNESS,
};
pub use trace::{MatchResult, Paths, Trace};
pub use vm::Vm;
