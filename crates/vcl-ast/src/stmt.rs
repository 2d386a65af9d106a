//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::{Expr, FunctionCall, Meta};

/// A block of statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub meta: Meta,
}

impl Block {
    pub fn new(statements: Vec<Statement>, meta: Meta) -> Self {
        Self { statements, meta }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub meta: Meta,
}

impl Statement {
    pub fn new(kind: StatementKind, meta: Meta) -> Self {
        Self { kind, meta }
    }

    /// Short human readable name of the statement kind
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Nested block: `{ ... }`
    Block(Block),

    /// Conditional chain: `if (a) { } else if (b) { } else { }`
    If(IfStatement),

    /// Multi-way match: `switch (req.http.X) { case "a": ... }`
    Switch(SwitchStatement),

    /// Bare function call: `testing.fixed_time(0);`
    FunctionCall(FunctionCall),

    /// `error 404 "Not Found";`
    Error {
        code: Option<Expr>,
        argument: Option<Expr>,
    },

    /// `return(pass);` or `return;`
    Return(Option<Expr>),

    /// `set req.http.X = "value";`
    Set {
        target: String,
        op: AssignOp,
        value: Expr,
    },

    /// `add req.http.Set-Cookie = "a=b";`
    Add {
        target: String,
        value: Expr,
    },

    /// `log "message";`
    Log(Expr),

    /// `synthetic "body";`
    Synthetic(Expr),

    /// `synthetic.base64 "Ym9keQ==";`
    SyntheticBase64(Expr),

    /// `declare local var.name STRING;`
    Declare {
        name: String,
        ty: ValueTypeName,
    },

    /// `unset req.http.X;`
    Unset(String),

    /// `remove req.http.X;`
    Remove(String),

    /// `call sub_name;`
    Call(String),

    /// `restart;`
    Restart,

    /// `esi;`
    Esi,

    /// `break;`
    Break,

    /// `fallthrough;`
    Fallthrough,

    /// `goto label;`
    Goto(String),

    /// `label:`
    GotoDestination(String),
}

impl StatementKind {
    pub fn label(&self) -> &'static str {
        match self {
            StatementKind::Block(_) => "block",
            StatementKind::If(_) => "if statement",
            StatementKind::Switch(_) => "switch statement",
            StatementKind::FunctionCall(_) => "function call statement",
            StatementKind::Error { .. } => "error statement",
            StatementKind::Return(_) => "return statement",
            StatementKind::Set { .. } => "set statement",
            StatementKind::Add { .. } => "add statement",
            StatementKind::Log(_) => "log statement",
            StatementKind::Synthetic(_) => "synthetic statement",
            StatementKind::SyntheticBase64(_) => "synthetic.base64 statement",
            StatementKind::Declare { .. } => "declare statement",
            StatementKind::Unset(_) => "unset statement",
            StatementKind::Remove(_) => "remove statement",
            StatementKind::Call(_) => "call statement",
            StatementKind::Restart => "restart statement",
            StatementKind::Esi => "esi statement",
            StatementKind::Break => "break statement",
            StatementKind::Fallthrough => "fallthrough statement",
            StatementKind::Goto(_) => "goto statement",
            StatementKind::GotoDestination(_) => "goto destination",
        }
    }
}

/// Assignment operators accepted by `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
        }
    }
}

/// Type names usable in `declare local` and typed tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueTypeName {
    String,
    Integer,
    Float,
    Bool,
    Time,
}

impl ValueTypeName {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "STRING" => Some(ValueTypeName::String),
            "INTEGER" => Some(ValueTypeName::Integer),
            "FLOAT" => Some(ValueTypeName::Float),
            "BOOL" => Some(ValueTypeName::Bool),
            "TIME" => Some(ValueTypeName::Time),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ValueTypeName::String => "STRING",
            ValueTypeName::Integer => "INTEGER",
            ValueTypeName::Float => "FLOAT",
            ValueTypeName::Bool => "BOOL",
            ValueTypeName::Time => "TIME",
        }
    }
}

/// Keyword that introduced a conditional clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IfKeyword {
    If,
    ElseIf,
    Elseif,
    Elsif,
}

impl IfKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            IfKeyword::If => "if",
            IfKeyword::ElseIf => "else if",
            IfKeyword::Elseif => "elseif",
            IfKeyword::Elsif => "elsif",
        }
    }
}

/// `if (condition) { consequence } [else if ...]* [else { ... }]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub keyword: IfKeyword,
    pub condition: Expr,
    pub consequence: Block,
    /// Flat list of `else if` clauses in source order
    pub another: Vec<ElseIfClause>,
    pub alternative: Option<ElseClause>,
}

/// One `else if (...) { ... }` clause of a conditional chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseIfClause {
    pub keyword: IfKeyword,
    pub condition: Expr,
    pub consequence: Block,
    pub meta: Meta,
}

impl ElseIfClause {
    /// Turn the clause into a standalone `if` statement, keeping its position.
    pub fn into_if_statement(self) -> (IfStatement, Meta) {
        let statement = IfStatement {
            keyword: IfKeyword::If,
            condition: self.condition,
            consequence: self.consequence,
            another: Vec::new(),
            alternative: None,
        };
        (statement, self.meta)
    }
}

/// Trailing `else { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseClause {
    pub consequence: Block,
    pub meta: Meta,
}

/// `switch (control) { case ...: ... default: ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStatement {
    pub control: Expr,
    /// Cases in textual order; the default clause sits at its textual index
    pub cases: Vec<CaseClause>,
}

impl SwitchStatement {
    pub fn default_index(&self) -> Option<usize> {
        self.cases.iter().position(|c| c.test.is_none())
    }
}

/// A single `case` or `default` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    /// `None` for the `default:` clause
    pub test: Option<CaseTest>,
    pub statements: Vec<Statement>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseTest {
    /// `case "value":`
    Exact(String),
    /// `case ~"pattern":`
    Regex(String),
}
