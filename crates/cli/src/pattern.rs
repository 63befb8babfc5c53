//! A small pattern language over chars, compiled to VM programs whose
//! records explain how the input was matched.
//!
//! Supported syntax: literal chars, `\x` escapes, `.` for any char, groups
//! `( )`, alternation `|`, and the postfix operators `*` and `?`.
mod ast;
mod compiler;
mod parser;

use std::fmt;

use thiserror::Error;
use tracevm::{MatchResult, Program, Vm, VmError};

pub(crate) use self::ast::Ast;
use self::parser::Parser;

/// The input chars, available to record generators as the VM options
pub(crate) type Subject = Vec<char>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Unexpected end of pattern at {0}")]
    UnexpectedEnd(usize),
    #[error("Unexpected {1:?} at {0}")]
    Unexpected(usize, char),
    #[error(transparent)]
    Program(#[from] VmError),
}

/// A step on a matching path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `ch` at `index` of the input was consumed
    Char { ch: char, index: usize },
    /// Branch of an alternation was taken
    Branch(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Char { ch, index } => write!(f, "{ch:?}@{index}"),
            Step::Branch(n) => write!(f, "#{n}"),
        }
    }
}

pub struct Pattern {
    vm: Vm<char, Step, Subject>,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Pattern, PatternError> {
        let ast = Parser::parse(pattern)?;
        let vm = Vm::compile(|asm| {
            compiler::compile(&ast, asm);
            asm.accept();
        })?;

        Ok(Pattern { vm })
    }

    pub fn program(&self) -> &Program<char, Step, Subject> {
        self.vm.program()
    }

    /// Match the whole of `input`
    pub fn matches(&self, input: &str) -> Result<MatchResult<Step>, VmError> {
        let subject: Subject = input.chars().collect();
        self.vm.execute(&subject, &subject)
    }
}
