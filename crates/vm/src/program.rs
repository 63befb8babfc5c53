mod assembler;
mod info;

use core::fmt;
use std::ops::Deref;

pub use assembler::Assembler;
pub use info::ProgramInfo;

/// Index of an instruction in a program
pub type Pc = usize;

/// Accumulated cost of a thread, lower is preferred
pub type Badness = u8;

/// Badness values saturate at this value
pub const MAX_BADNESS: Badness = Badness::MAX;

/// Accepts or rejects an input item, called as `matcher(item, options)`
pub type Matcher<I, O> = Box<dyn Fn(&I, &O) -> bool>;

/// Decides whether a conditional fail ends the thread, called as
/// `predicate(options)`
pub type Predicate<O> = Box<dyn Fn(&O) -> bool>;

/// Produces the record for a record instruction, called as
/// `generator(data, input_index, options)`. Returning `None` records
/// nothing.
pub type Generator<R, O> = Box<dyn Fn(&R, usize, &O) -> Option<R>>;

/// Instructions executed by the VM
pub enum Instruction<I, R, O = ()> {
    /// Accept the input if all of it has been consumed, otherwise end the
    /// thread.
    Accept,
    /// Continue at the next instruction with added badness.
    Bad(Badness),
    /// End the thread. With a predicate the thread only ends if it returns
    /// true, otherwise it continues at the next instruction.
    Fail(Option<Predicate<O>>),
    /// Continue at all of the targets. No targets ends the thread.
    Jump(Vec<Pc>),
    /// Attach a record to the trace and continue at the next instruction.
    Record {
        data: R,
        generator: Option<Generator<R, O>>,
    },
    /// Consume an input item and continue at the next instruction in the
    /// next generation if the matcher accepts it.
    Test(Matcher<I, O>),
}

impl<I, R, O> Instruction<I, R, O> {
    /// Instruction mnemonic
    pub fn name(&self) -> &'static str {
        use Instruction::*;
        match self {
            Accept => "accept",
            Bad(_) => "bad",
            Fail(_) => "fail",
            Jump(_) => "jump",
            Record { .. } => "record",
            Test(_) => "test",
        }
    }
}

impl<I, R: fmt::Debug, O> fmt::Debug for Instruction<I, R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            Accept => write!(f, "Accept"),
            Bad(cost) => write!(f, "Bad({cost})"),
            Fail(None) => write!(f, "Fail"),
            Fail(Some(_)) => write!(f, "Fail(<predicate>)"),
            Jump(targets) => write!(f, "Jump({targets:?})"),
            Record {
                data,
                generator: None,
            } => write!(f, "Record({data:?})"),
            Record {
                data,
                generator: Some(_),
            } => write!(f, "Record({data:?}, <generator>)"),
            Test(_) => write!(f, "Test(<matcher>)"),
        }
    }
}

pub struct Program<I, R, O = ()> {
    pub(crate) insts: Vec<Instruction<I, R, O>>,
}

impl<I, R, O> Program<I, R, O> {
    pub fn new(insts: Vec<Instruction<I, R, O>>) -> Program<I, R, O> {
        Program { insts }
    }
}

impl<I, R, O> From<Vec<Instruction<I, R, O>>> for Program<I, R, O> {
    fn from(insts: Vec<Instruction<I, R, O>>) -> Self {
        Program::new(insts)
    }
}

impl<I, R, O> Deref for Program<I, R, O> {
    type Target = [Instruction<I, R, O>];

    fn deref(&self) -> &Self::Target {
        &self.insts
    }
}

impl<I, R: fmt::Debug, O> fmt::Debug for Program<I, R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- Begin program --")?;

        for (i, inst) in self.iter().enumerate() {
            writeln!(f, "{i:02}: {inst:?}")?;
        }

        writeln!(f, "-- end program --")
    }
}
