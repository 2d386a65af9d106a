//! Canonical text printer for VCL AST
//!
//! Serializes AST back to VCL source with two-space indentation. The output of
//! an instrumented program is valid input for the parser again.

use crate::{
    BackendDecl, Block, CaseClause, CaseTest, Declaration, DeclarationKind, ElseClause, Expr,
    ExprKind, FunctionCall, IfStatement, Program, Statement, StatementKind, SubroutineDecl,
    SwitchStatement, TableDecl,
};

/// Trait for converting AST nodes to VCL source text.
pub trait ToVcl {
    /// Convert to VCL text with the given indentation level.
    fn to_vcl(&self, indent: usize) -> String;
}

/// Helper to generate indentation string (two spaces per level).
fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Escape a string for output (double quotes, newlines, etc.)
fn escape_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }
    result
}

// ===== Program =====

impl ToVcl for Program {
    fn to_vcl(&self, indent: usize) -> String {
        let mut out = self
            .declarations
            .iter()
            .map(|d| d.to_vcl(indent))
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push('\n');
        out
    }
}

impl ToVcl for Declaration {
    fn to_vcl(&self, indent: usize) -> String {
        match &self.kind {
            DeclarationKind::Subroutine(sub) => sub.to_vcl(indent),
            DeclarationKind::Backend(backend) => backend.to_vcl(indent),
            DeclarationKind::Table(table) => table.to_vcl(indent),
            DeclarationKind::Import(name) => format!("{}import {};", indent_str(indent), name),
        }
    }
}

impl ToVcl for SubroutineDecl {
    fn to_vcl(&self, indent: usize) -> String {
        format!(
            "{}sub {} {}",
            indent_str(indent),
            self.name,
            self.body.to_vcl(indent)
        )
    }
}

impl ToVcl for BackendDecl {
    fn to_vcl(&self, indent: usize) -> String {
        let mut lines = vec![format!("{}backend {} {{", indent_str(indent), self.name)];
        for prop in &self.properties {
            lines.push(format!(
                "{}.{} = {};",
                indent_str(indent + 1),
                prop.name,
                prop.value.to_vcl(0)
            ));
        }
        lines.push(format!("{}}}", indent_str(indent)));
        lines.join("\n")
    }
}

impl ToVcl for TableDecl {
    fn to_vcl(&self, indent: usize) -> String {
        let header = match self.value_type {
            Some(ty) => format!("{}table {} {} {{", indent_str(indent), self.name, ty.keyword()),
            None => format!("{}table {} {{", indent_str(indent), self.name),
        };
        let mut lines = vec![header];
        for entry in &self.entries {
            lines.push(format!(
                "{}\"{}\": {},",
                indent_str(indent + 1),
                escape_string(&entry.key),
                entry.value.to_vcl(0)
            ));
        }
        lines.push(format!("{}}}", indent_str(indent)));
        lines.join("\n")
    }
}

// ===== Statements =====

/// Renders `{ ... }`. The opening brace is not indented so it can follow a
/// keyword on the same line; the closing brace is indented to `indent`.
impl ToVcl for Block {
    fn to_vcl(&self, indent: usize) -> String {
        let mut lines = vec!["{".to_string()];
        for stmt in &self.statements {
            lines.push(stmt.to_vcl(indent + 1));
        }
        lines.push(format!("{}}}", indent_str(indent)));
        lines.join("\n")
    }
}

impl ToVcl for Statement {
    fn to_vcl(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        match &self.kind {
            StatementKind::Block(block) => format!("{}{}", ind, block.to_vcl(indent)),
            StatementKind::If(stmt) => format!("{}{}", ind, stmt.to_vcl(indent)),
            StatementKind::Switch(stmt) => format!("{}{}", ind, stmt.to_vcl(indent)),
            StatementKind::FunctionCall(call) => format!("{}{};", ind, call.to_vcl(0)),
            StatementKind::Error { code, argument } => {
                let mut s = format!("{}error", ind);
                if let Some(code) = code {
                    s.push(' ');
                    s.push_str(&code.to_vcl(0));
                }
                if let Some(argument) = argument {
                    s.push(' ');
                    s.push_str(&argument.to_vcl(0));
                }
                s.push(';');
                s
            }
            StatementKind::Return(None) => format!("{}return;", ind),
            StatementKind::Return(Some(value)) => match &value.kind {
                ExprKind::Grouped(_) => format!("{}return{};", ind, value.to_vcl(0)),
                _ => format!("{}return {};", ind, value.to_vcl(0)),
            },
            StatementKind::Set { target, op, value } => {
                format!("{}set {} {} {};", ind, target, op.symbol(), value.to_vcl(0))
            }
            StatementKind::Add { target, value } => {
                format!("{}add {} = {};", ind, target, value.to_vcl(0))
            }
            StatementKind::Log(value) => format!("{}log {};", ind, value.to_vcl(0)),
            StatementKind::Synthetic(value) => format!("{}synthetic {};", ind, value.to_vcl(0)),
            StatementKind::SyntheticBase64(value) => {
                format!("{}synthetic.base64 {};", ind, value.to_vcl(0))
            }
            StatementKind::Declare { name, ty } => {
                format!("{}declare local {} {};", ind, name, ty.keyword())
            }
            StatementKind::Unset(name) => format!("{}unset {};", ind, name),
            StatementKind::Remove(name) => format!("{}remove {};", ind, name),
            StatementKind::Call(name) => format!("{}call {};", ind, name),
            StatementKind::Restart => format!("{}restart;", ind),
            StatementKind::Esi => format!("{}esi;", ind),
            StatementKind::Break => format!("{}break;", ind),
            StatementKind::Fallthrough => format!("{}fallthrough;", ind),
            StatementKind::Goto(label) => format!("{}goto {};", ind, label),
            StatementKind::GotoDestination(label) => format!("{}{}:", ind, label),
        }
    }
}

/// Renders the chain starting at the `if` keyword (no leading indentation).
impl ToVcl for IfStatement {
    fn to_vcl(&self, indent: usize) -> String {
        let mut s = format!(
            "{} ({}) {}",
            self.keyword.as_str(),
            self.condition.to_vcl(0),
            self.consequence.to_vcl(indent)
        );
        for clause in &self.another {
            s.push_str(&format!(
                " {} ({}) {}",
                clause.keyword.as_str(),
                clause.condition.to_vcl(0),
                clause.consequence.to_vcl(indent)
            ));
        }
        if let Some(alternative) = &self.alternative {
            s.push_str(&format!(" {}", alternative.to_vcl(indent)));
        }
        s
    }
}

impl ToVcl for ElseClause {
    fn to_vcl(&self, indent: usize) -> String {
        format!("else {}", self.consequence.to_vcl(indent))
    }
}

impl ToVcl for SwitchStatement {
    fn to_vcl(&self, indent: usize) -> String {
        let mut lines = vec![format!("switch ({}) {{", self.control.to_vcl(0))];
        for case in &self.cases {
            lines.push(case.to_vcl(indent + 1));
        }
        lines.push(format!("{}}}", indent_str(indent)));
        lines.join("\n")
    }
}

impl ToVcl for CaseClause {
    fn to_vcl(&self, indent: usize) -> String {
        let head = match &self.test {
            Some(CaseTest::Exact(value)) => format!("case \"{}\":", escape_string(value)),
            Some(CaseTest::Regex(pattern)) => format!("case ~\"{}\":", escape_string(pattern)),
            None => "default:".to_string(),
        };
        let mut lines = vec![format!("{}{}", indent_str(indent), head)];
        for stmt in &self.statements {
            lines.push(stmt.to_vcl(indent + 1));
        }
        lines.join("\n")
    }
}

// ===== Expressions =====

impl ToVcl for Expr {
    fn to_vcl(&self, _indent: usize) -> String {
        match &self.kind {
            ExprKind::Ident(name) => name.clone(),
            ExprKind::String(value) => format!("\"{}\"", escape_string(value)),
            ExprKind::Integer(value) => value.to_string(),
            ExprKind::Float(value) => format!("{:?}", value),
            ExprKind::Bool(value) => value.to_string(),
            ExprKind::Grouped(inner) => format!("({})", inner.to_vcl(0)),
            ExprKind::Prefix { op, right } => format!("{}{}", op.symbol(), right.to_vcl(0)),
            ExprKind::Infix { op, left, right } => {
                format!("{} {} {}", left.to_vcl(0), op.symbol(), right.to_vcl(0))
            }
            ExprKind::Postfix { op, left } => format!("{}{}", left.to_vcl(0), op.symbol()),
            ExprKind::If {
                condition,
                consequence,
                alternative,
            } => format!(
                "if({}, {}, {})",
                condition.to_vcl(0),
                consequence.to_vcl(0),
                alternative.to_vcl(0)
            ),
            ExprKind::Call(call) => call.to_vcl(0),
        }
    }
}

impl ToVcl for FunctionCall {
    fn to_vcl(&self, _indent: usize) -> String {
        let args = self
            .arguments
            .iter()
            .map(|a| a.to_vcl(0))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, args)
    }
}
