use std::{iter::Peekable, str::CharIndices};

use super::{Ast, PatternError};

pub(crate) struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> Parser<'a> {
    /// Parse a pattern to an AST
    pub fn parse(pattern: &str) -> Result<Ast, PatternError> {
        let mut parser = Parser {
            chars: pattern.char_indices().peekable(),
            len: pattern.len(),
        };
        let ast = parser.expr()?;

        // Only an unbalanced ')' stops the top level expression early
        match parser.chars.next() {
            Some((offset, ch)) => Err(PatternError::Unexpected(offset, ch)),
            None => Ok(ast),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    /// Offset of the next char, or the pattern length at the end
    fn offset(&mut self) -> usize {
        let len = self.len;
        self.chars.peek().map_or(len, |(offset, _)| *offset)
    }

    fn skip(&mut self) {
        self.chars.next();
    }

    fn eat(&mut self, ch: char) -> Result<(), PatternError> {
        match self.chars.next() {
            Some((_, next)) if next == ch => Ok(()),
            Some((offset, next)) => Err(PatternError::Unexpected(offset, next)),
            None => Err(PatternError::UnexpectedEnd(self.len)),
        }
    }

    fn expr(&mut self) -> Result<Ast, PatternError> {
        self.alt()
    }

    fn alt(&mut self) -> Result<Ast, PatternError> {
        let mut alt = vec![self.seq()?];

        while self.peek() == Some('|') {
            self.skip();
            alt.push(self.seq()?);
        }

        if alt.len() == 1 {
            Ok(alt.remove(0))
        } else {
            Ok(Ast::Alt(alt))
        }
    }

    fn seq(&mut self) -> Result<Ast, PatternError> {
        let mut seq = vec![];

        while self.peek().map_or(false, |ch| !matches!(ch, '|' | ')')) {
            seq.push(self.rep()?);
        }

        if seq.len() == 1 {
            Ok(seq.remove(0))
        } else {
            Ok(Ast::Seq(seq))
        }
    }

    fn rep(&mut self) -> Result<Ast, PatternError> {
        let mut ast = self.base()?;

        loop {
            match self.peek() {
                Some('*') => {
                    self.skip();
                    ast = Ast::Star(Box::new(ast));
                }
                Some('?') => {
                    self.skip();
                    ast = Ast::Question(Box::new(ast));
                }
                _ => return Ok(ast),
            }
        }
    }

    fn base(&mut self) -> Result<Ast, PatternError> {
        let offset = self.offset();
        match self.chars.next() {
            Some((_, '.')) => Ok(Ast::Any),
            Some((_, '(')) => {
                let ast = self.expr()?;
                self.eat(')')?;
                Ok(Ast::Group(ast.into()))
            }
            Some((_, '\\')) => match self.chars.next() {
                Some((_, ch)) => Ok(Ast::Char(ch)),
                None => Err(PatternError::UnexpectedEnd(self.len)),
            },
            Some((_, ch @ ('*' | '?' | ')' | '|'))) => Err(PatternError::Unexpected(offset, ch)),
            Some((_, ch)) => Ok(Ast::Char(ch)),
            None => Err(PatternError::UnexpectedEnd(offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(ch: char) -> Ast {
        Ast::Char(ch)
    }

    #[test]
    fn literals() {
        assert_eq!(Ok(Ast::Seq(vec![])), Parser::parse(""));
        assert_eq!(Ok(ch('a')), Parser::parse("a"));
        assert_eq!(Ok(Ast::Seq(vec![ch('a'), ch('b')])), Parser::parse("ab"));
        assert_eq!(Ok(Ast::Seq(vec![ch('*'), Ast::Any])), Parser::parse("\\*."));
    }

    #[test]
    fn repetition() {
        assert_eq!(
            Ok(Ast::Seq(vec![
                ch('a'),
                Ast::Question(Box::new(Ast::Star(Box::new(ch('b'))))),
            ])),
            Parser::parse("ab*?")
        );
    }

    #[test]
    fn alternation_and_groups() {
        let expected = Ast::Alt(vec![
            Ast::Star(Box::new(Ast::Group(Box::new(Ast::Alt(vec![
                ch('a'),
                ch('b'),
            ]))))),
            Ast::Seq(vec![]),
            ch('c'),
        ]);
        assert_eq!(Ok(expected), Parser::parse("(a|b)*||c"));
    }

    #[test]
    fn errors() {
        assert_eq!(Err(PatternError::UnexpectedEnd(3)), Parser::parse("(ab"));
        assert_eq!(Err(PatternError::Unexpected(1, ')')), Parser::parse("a)b"));
        assert_eq!(Err(PatternError::Unexpected(0, '*')), Parser::parse("*"));
        assert_eq!(Err(PatternError::Unexpected(1, '?')), Parser::parse("(?)"));
        assert_eq!(Err(PatternError::UnexpectedEnd(2)), Parser::parse("a\\"));
    }
}
