use tracevm::{Assembler, Instruction, Pc};

use super::{Ast, Step, Subject};

pub(crate) type PatternAssembler = Assembler<char, Step, Subject>;

/// Append the instructions matching `ast`. Control flow continues at the
/// instruction following them.
pub(crate) fn compile(ast: &Ast, asm: &mut PatternAssembler) {
    match ast {
        Ast::Any => {
            asm.test(|_, _| true);
            asm.record_with(Step::Char { ch: '.', index: 0 }, consumed);
        }
        Ast::Char(ch) => {
            let ch = *ch;
            asm.test(move |item, _| *item == ch);
            asm.record_with(Step::Char { ch, index: 0 }, consumed);
        }
        Ast::Seq(seq) => {
            for ast in seq {
                compile(ast, asm);
            }
        }
        Ast::Alt(branches) => {
            // split L1, L2, ..
            // L1: record 0
            //     codes for e1
            //     jmp L3
            // L2: record 1
            //     codes for e2
            //     jmp L3
            // L3:
            let split = asm.len();
            asm.jump(vec![]);

            let mut starts = Vec::with_capacity(branches.len());
            let mut ends = Vec::with_capacity(branches.len());
            for (i, branch) in branches.iter().enumerate() {
                starts.push(asm.len());
                asm.record(Step::Branch(i));
                compile(branch, asm);
                ends.push(asm.len());
                asm.jump(vec![]);
            }

            let end = asm.len();
            set_targets(asm, split, starts);
            for pc in ends {
                set_targets(asm, pc, vec![end]);
            }
        }
        Ast::Star(ast) => {
            // L1: split L2, L3
            // L2: codes for e
            //     jmp L1
            // L3: bad 1
            let split = asm.len();
            asm.jump(vec![]);
            compile(ast, asm);
            asm.jump(vec![split]);

            let skip = asm.len();
            asm.bad(1);
            set_targets(asm, split, vec![split + 1, skip]);
        }
        Ast::Question(ast) => {
            // split L1, L2
            // L1: codes for e
            //     jmp L3
            // L2: bad 1
            // L3:
            let split = asm.len();
            asm.jump(vec![]);
            compile(ast, asm);
            let done = asm.len();
            asm.jump(vec![]);

            let skip = asm.len();
            asm.bad(1);
            set_targets(asm, split, vec![split + 1, skip]);
            set_targets(asm, done, vec![asm.len()]);
        }
        Ast::Group(ast) => compile(ast, asm),
    }
}

fn set_targets(asm: &mut PatternAssembler, pc: Pc, new: Vec<Pc>) {
    if let Some(Instruction::Jump(targets)) = asm.get_mut(pc) {
        *targets = new;
    }
}

/// Records run one generation after the test that consumed the char
fn consumed(_: &Step, index: usize, subject: &Subject) -> Option<Step> {
    let at = index.checked_sub(1)?;
    let ch = *subject.get(at)?;
    Some(Step::Char { ch, index: at })
}
