#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Any,
    Char(char),
    Seq(Vec<Ast>),
    Alt(Vec<Ast>),
    Star(Box<Ast>),
    Question(Box<Ast>),
    Group(Box<Ast>),
}
