//! Operator and keyword tokens carried by AST nodes.
//!
//! Only the tokens that survive into the tree are modelled: operators of
//! unary/binary expressions, assignment forms, inc/dec, branch keywords and
//! the keyword that introduces a grouped declaration.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // arithmetic and bitwise
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,

    // assignment
    Assign,
    Define,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,

    // logical, comparison, misc
    LAnd,
    LOr,
    Arrow,
    Inc,
    Dec,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    Not,
    Tilde,

    // keywords
    Break,
    Continue,
    Goto,
    Fallthrough,
    Import,
    Const,
    Var,
    Type,
}

impl Token {
    pub fn as_str(&self) -> &'static str {
        match self {
            Token::Add => "+",
            Token::Sub => "-",
            Token::Mul => "*",
            Token::Quo => "/",
            Token::Rem => "%",
            Token::And => "&",
            Token::Or => "|",
            Token::Xor => "^",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::AndNot => "&^",
            Token::Assign => "=",
            Token::Define => ":=",
            Token::AddAssign => "+=",
            Token::SubAssign => "-=",
            Token::MulAssign => "*=",
            Token::QuoAssign => "/=",
            Token::RemAssign => "%=",
            Token::AndAssign => "&=",
            Token::OrAssign => "|=",
            Token::XorAssign => "^=",
            Token::ShlAssign => "<<=",
            Token::ShrAssign => ">>=",
            Token::AndNotAssign => "&^=",
            Token::LAnd => "&&",
            Token::LOr => "||",
            Token::Arrow => "<-",
            Token::Inc => "++",
            Token::Dec => "--",
            Token::Eql => "==",
            Token::Neq => "!=",
            Token::Lss => "<",
            Token::Leq => "<=",
            Token::Gtr => ">",
            Token::Geq => ">=",
            Token::Not => "!",
            Token::Tilde => "~",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Goto => "goto",
            Token::Fallthrough => "fallthrough",
            Token::Import => "import",
            Token::Const => "const",
            Token::Var => "var",
            Token::Type => "type",
        }
    }

    /// Look up an operator or keyword by its source spelling.
    pub fn lookup(text: &str) -> Option<Token> {
        let token = match text {
            "+" => Token::Add,
            "-" => Token::Sub,
            "*" => Token::Mul,
            "/" => Token::Quo,
            "%" => Token::Rem,
            "&" => Token::And,
            "|" => Token::Or,
            "^" => Token::Xor,
            "<<" => Token::Shl,
            ">>" => Token::Shr,
            "&^" => Token::AndNot,
            "=" => Token::Assign,
            ":=" => Token::Define,
            "+=" => Token::AddAssign,
            "-=" => Token::SubAssign,
            "*=" => Token::MulAssign,
            "/=" => Token::QuoAssign,
            "%=" => Token::RemAssign,
            "&=" => Token::AndAssign,
            "|=" => Token::OrAssign,
            "^=" => Token::XorAssign,
            "<<=" => Token::ShlAssign,
            ">>=" => Token::ShrAssign,
            "&^=" => Token::AndNotAssign,
            "&&" => Token::LAnd,
            "||" => Token::LOr,
            "<-" => Token::Arrow,
            "++" => Token::Inc,
            "--" => Token::Dec,
            "==" => Token::Eql,
            "!=" => Token::Neq,
            "<" => Token::Lss,
            "<=" => Token::Leq,
            ">" => Token::Gtr,
            ">=" => Token::Geq,
            "!" => Token::Not,
            "~" => Token::Tilde,
            "break" => Token::Break,
            "continue" => Token::Continue,
            "goto" => Token::Goto,
            "fallthrough" => Token::Fallthrough,
            "import" => Token::Import,
            "const" => Token::Const,
            "var" => Token::Var,
            "type" => Token::Type,
            _ => return None,
        };
        Some(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
