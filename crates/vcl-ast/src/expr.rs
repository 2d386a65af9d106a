//! Expression AST nodes

use serde::{Deserialize, Serialize};
use crate::Meta;

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub meta: Meta,
}

impl Expr {
    pub fn new(kind: ExprKind, meta: Meta) -> Self {
        Self { kind, meta }
    }

    /// String literal without a source position
    pub fn synthetic_string(value: impl Into<String>) -> Self {
        Self {
            kind: ExprKind::String(value.into()),
            meta: Meta::synthetic(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Identifier: `req.http.Host`, `var.count`, `pass`
    Ident(String),

    /// String literal: `"hello"`
    String(String),

    /// Integer literal: `404`
    Integer(i64),

    /// Float literal: `1.5`
    Float(f64),

    /// Boolean literal: `true`, `false`
    Bool(bool),

    /// Parenthesized expression: `(a || b)`
    Grouped(Box<Expr>),

    /// Prefix operation: `!x`, `-1`
    Prefix {
        op: PrefixOp,
        right: Box<Expr>,
    },

    /// Infix operation: `a == b`, `"a" + "b"`
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Postfix operation: `50%`
    Postfix {
        op: PostfixOp,
        left: Box<Expr>,
    },

    /// Inline conditional: `if(req.http.Bar, "a", "b")`
    If {
        condition: Box<Expr>,
        consequence: Box<Expr>,
        alternative: Box<Expr>,
    },

    /// Function call: `std.strlen(req.url)`
    Call(FunctionCall),
}

/// A call to a named function, used both as an expression and as a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOp {
    Not,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOp {
    // Logical
    Or,
    And,

    // Comparison
    Eq,
    Ne,
    Match,
    NotMatch,
    Lt,
    Le,
    Gt,
    Ge,

    // Arithmetic / concatenation
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOp {
    Percent,
}

impl PrefixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOp::Not => "!",
            PrefixOp::Minus => "-",
        }
    }
}

impl InfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            InfixOp::Or => "||",
            InfixOp::And => "&&",
            InfixOp::Eq => "==",
            InfixOp::Ne => "!=",
            InfixOp::Match => "~",
            InfixOp::NotMatch => "!~",
            InfixOp::Lt => "<",
            InfixOp::Le => "<=",
            InfixOp::Gt => ">",
            InfixOp::Ge => ">=",
            InfixOp::Plus => "+",
            InfixOp::Minus => "-",
        }
    }
}

impl PostfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            PostfixOp::Percent => "%",
        }
    }
}
