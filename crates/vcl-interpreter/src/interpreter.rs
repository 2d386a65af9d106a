//! Tree-walking statement interpreter
//!
//! An [`Interpreter`] borrows a program (instrumented or not) and runs one of
//! its subroutines against a [`Context`]. The interpreter holds no mutable
//! state, so one instance can serve evaluations on several threads, each with
//! its own context.

use std::collections::BTreeMap;

use base64::Engine;
use regex::Regex;
use vcl_ast::{
    AssignOp, CaseClause, CaseTest, Expr, ExprKind, IfStatement, Position, PrefixOp, Program,
    Statement, StatementKind, SubroutineDecl, SwitchStatement, TableDecl,
};

use crate::context::{Context, ErrorResponse};
use crate::exception::Exception;
use crate::expression::{arithmetic, ArithmeticOp};
use crate::function::Tables;
use crate::value::Value;

/// Deepest `call` nesting before evaluation is aborted
pub const MAX_CALL_DEPTH: usize = 100;

/// How a statement hands control back to its enclosing list
#[derive(Debug, Clone, PartialEq)]
enum Flow {
    Next,
    Break,
    Fallthrough,
    /// `return;` leaves the current subroutine
    Return,
    /// `return(state)`, `error` and `restart` end the whole evaluation
    Terminate,
    Goto(String),
}

pub struct Interpreter<'p> {
    subroutines: BTreeMap<&'p str, &'p SubroutineDecl>,
    pub(crate) tables: Tables,
    max_call_depth: usize,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program) -> Result<Self, Exception> {
        let mut subroutines = BTreeMap::new();
        for sub in program.subroutines() {
            subroutines.entry(sub.name.as_str()).or_insert(sub);
        }

        let mut tables = Tables::new();
        for table in program.tables() {
            tables.insert(table.name.clone(), table_values(table)?);
        }

        Ok(Self {
            subroutines,
            tables,
            max_call_depth: MAX_CALL_DEPTH,
        })
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn has_subroutine(&self, name: &str) -> bool {
        self.subroutines.contains_key(name)
    }

    /// Run subroutine `name` to completion
    pub fn execute(&self, name: &str, ctx: &mut Context) -> Result<(), Exception> {
        let sub = self.subroutine(name, None)?;
        tracing::debug!(subroutine = name, "executing subroutine");
        let mut stack = Vec::new();
        self.run_subroutine(sub, ctx, &mut stack)?;
        Ok(())
    }

    fn subroutine(&self, name: &str, position: Option<&Position>) -> Result<&'p SubroutineDecl, Exception> {
        self.subroutines
            .get(name)
            .copied()
            .ok_or_else(|| Exception::runtime(position, format!("subroutine {} is not defined", name)))
    }

    fn run_subroutine(
        &self,
        sub: &'p SubroutineDecl,
        ctx: &mut Context,
        stack: &mut Vec<&'p SubroutineDecl>,
    ) -> Result<Flow, Exception> {
        if stack.len() >= self.max_call_depth {
            return Err(Exception::max_call_stack_exceeded(sub.body.meta.position(), stack.as_slice()));
        }
        stack.push(sub);

        let statements = &sub.body.statements;
        let mut index = 0;
        let result = loop {
            let flow = match self.run_statements(&statements[index..], ctx, stack) {
                Ok(flow) => flow,
                Err(err) => break Err(err),
            };
            match flow {
                Flow::Goto(label) => match find_destination(statements, &label) {
                    Some(found) => index = found,
                    None => {
                        break Err(Exception::runtime(
                            sub.body.meta.position(),
                            format!("goto destination {} is not found in {}", label, sub.name),
                        ))
                    }
                },
                Flow::Terminate => break Ok(Flow::Terminate),
                _ => break Ok(Flow::Next),
            }
        };

        stack.pop();
        result
    }

    fn run_statements(
        &self,
        statements: &'p [Statement],
        ctx: &mut Context,
        stack: &mut Vec<&'p SubroutineDecl>,
    ) -> Result<Flow, Exception> {
        for statement in statements {
            let flow = self.run_statement(statement, ctx, stack)?;
            if flow != Flow::Next {
                return Ok(flow);
            }
        }
        Ok(Flow::Next)
    }

    fn run_statement(
        &self,
        statement: &'p Statement,
        ctx: &mut Context,
        stack: &mut Vec<&'p SubroutineDecl>,
    ) -> Result<Flow, Exception> {
        let position = statement.meta.position();
        tracing::trace!(statement = statement.label(), ?position, "execute");

        match &statement.kind {
            StatementKind::Block(block) => return self.run_statements(&block.statements, ctx, stack),
            StatementKind::If(if_statement) => return self.run_if(if_statement, ctx, stack),
            StatementKind::Switch(switch) => return self.run_switch(switch, position, ctx, stack),

            StatementKind::FunctionCall(call) => {
                self.call_function(call, position, ctx)?;
            }

            StatementKind::Error { code, argument } => {
                let code = match code {
                    Some(code) => match self.evaluate(code, ctx)? {
                        Value::Integer(code) => code,
                        other => other.to_string().parse().map_err(|_| {
                            Exception::runtime(position, format!("invalid error code {}", other))
                        })?,
                    },
                    None => 0,
                };
                let message = match argument {
                    Some(argument) => self.evaluate(argument, ctx)?.to_string(),
                    None => String::new(),
                };
                tracing::debug!(code, %message, "error statement");
                ctx.error = Some(ErrorResponse { code, message });
                ctx.return_state = Some("error".into());
                return Ok(Flow::Terminate);
            }

            StatementKind::Return(value) => return self.run_return(value.as_ref(), ctx),

            StatementKind::Set { target, op, value } => {
                let value = self.evaluate(value, ctx)?;
                let value = match op {
                    AssignOp::Assign => value,
                    AssignOp::AddAssign => {
                        arithmetic(ArithmeticOp::Add, ctx.get(target), value, position)?
                    }
                    AssignOp::SubAssign => {
                        arithmetic(ArithmeticOp::Sub, ctx.get(target), value, position)?
                    }
                };
                ctx.set(target.clone(), value);
            }

            StatementKind::Add { target, value } => {
                let value = self.evaluate(value, ctx)?;
                ctx.add(target, value);
            }

            StatementKind::Log(value) => {
                let line = self.evaluate(value, ctx)?.to_string();
                tracing::info!(target: "vcl::log", "{}", line);
                ctx.logs.push(line);
            }

            StatementKind::Synthetic(value) => {
                ctx.response_body = Some(self.evaluate(value, ctx)?.to_string());
            }

            StatementKind::SyntheticBase64(value) => {
                let encoded = self.evaluate(value, ctx)?.to_string();
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|err| {
                        Exception::runtime(position, format!("invalid base64 synthetic body: {}", err))
                    })?;
                ctx.response_body = Some(String::from_utf8_lossy(&decoded).into_owned());
            }

            StatementKind::Declare { name, ty } => ctx.set(name.clone(), Value::default_for(*ty)),
            StatementKind::Unset(name) | StatementKind::Remove(name) => ctx.unset(name),

            StatementKind::Call(name) => {
                let sub = self.subroutine(name, position)?;
                tracing::debug!(subroutine = %name, depth = stack.len(), "call");
                if self.run_subroutine(sub, ctx, stack)? == Flow::Terminate {
                    return Ok(Flow::Terminate);
                }
            }

            StatementKind::Restart => {
                ctx.restarted = true;
                ctx.return_state = Some("restart".into());
                return Ok(Flow::Terminate);
            }

            StatementKind::Esi => ctx.esi = true,
            StatementKind::Break => return Ok(Flow::Break),
            StatementKind::Fallthrough => return Ok(Flow::Fallthrough),
            StatementKind::Goto(label) => return Ok(Flow::Goto(label.clone())),
            StatementKind::GotoDestination(_) => {}
        }

        Ok(Flow::Next)
    }

    fn run_if(
        &self,
        statement: &'p IfStatement,
        ctx: &mut Context,
        stack: &mut Vec<&'p SubroutineDecl>,
    ) -> Result<Flow, Exception> {
        if self.evaluate(&statement.condition, ctx)?.is_truthy() {
            return self.run_statements(&statement.consequence.statements, ctx, stack);
        }
        for clause in &statement.another {
            if self.evaluate(&clause.condition, ctx)?.is_truthy() {
                return self.run_statements(&clause.consequence.statements, ctx, stack);
            }
        }
        match &statement.alternative {
            Some(alternative) => self.run_statements(&alternative.consequence.statements, ctx, stack),
            None => Ok(Flow::Next),
        }
    }

    /// Cases run until `break`; `fallthrough` continues with the next case
    /// in source order and reaching the end of a case leaves the switch.
    fn run_switch(
        &self,
        statement: &'p SwitchStatement,
        position: Option<&Position>,
        ctx: &mut Context,
        stack: &mut Vec<&'p SubroutineDecl>,
    ) -> Result<Flow, Exception> {
        let control = self.evaluate(&statement.control, ctx)?.to_string();

        let mut matched = None;
        for (index, case) in statement.cases.iter().enumerate() {
            if case_matches(case, &control, position)? {
                matched = Some(index);
                break;
            }
        }
        let Some(start) = matched.or_else(|| statement.default_index()) else {
            return Ok(Flow::Next);
        };

        for case in &statement.cases[start..] {
            match self.run_statements(&case.statements, ctx, stack)? {
                Flow::Fallthrough => continue,
                Flow::Break | Flow::Next => return Ok(Flow::Next),
                other => return Ok(other),
            }
        }
        Ok(Flow::Next)
    }

    fn run_return(&self, value: Option<&'p Expr>, ctx: &mut Context) -> Result<Flow, Exception> {
        let Some(value) = value else {
            return Ok(Flow::Return);
        };

        if let Some(state) = return_state(value) {
            ctx.return_state = Some(state.to_string());
            return Ok(Flow::Terminate);
        }
        ctx.return_value = Some(self.evaluate(value, ctx)?);
        Ok(Flow::Return)
    }
}

/// State names are bare identifiers without a dot, optionally parenthesized
fn return_state(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Ident(name) if !name.contains('.') => Some(name),
        ExprKind::Grouped(inner) => return_state(inner),
        _ => None,
    }
}

fn case_matches(case: &CaseClause, control: &str, position: Option<&Position>) -> Result<bool, Exception> {
    match &case.test {
        None => Ok(false),
        Some(CaseTest::Exact(value)) => Ok(value == control),
        Some(CaseTest::Regex(pattern)) => {
            let regex = Regex::new(pattern).map_err(|err| {
                Exception::runtime(case.meta.position().or(position), format!("invalid regex: {}", err))
            })?;
            Ok(regex.is_match(control))
        }
    }
}

/// Index of the `label:` statement itself. Anything placed before the label,
/// such as its coverage marker, is not run by a jump.
fn find_destination(statements: &[Statement], label: &str) -> Option<usize> {
    statements
        .iter()
        .position(|s| matches!(&s.kind, StatementKind::GotoDestination(l) if l == label))
}

fn table_values(table: &TableDecl) -> Result<BTreeMap<String, Value>, Exception> {
    table
        .entries
        .iter()
        .map(|entry| {
            let value = literal(&entry.value).ok_or_else(|| {
                Exception::runtime(
                    entry.meta.position(),
                    format!("table {} entry {} must be a literal", table.name, entry.key),
                )
            })?;
            Ok((entry.key.clone(), value))
        })
        .collect()
}

fn literal(expr: &Expr) -> Option<Value> {
    match &expr.kind {
        ExprKind::String(s) => Some(Value::String(s.clone())),
        ExprKind::Integer(i) => Some(Value::Integer(*i)),
        ExprKind::Float(f) => Some(Value::Float(*f)),
        ExprKind::Bool(b) => Some(Value::Bool(*b)),
        ExprKind::Prefix {
            op: PrefixOp::Minus,
            right,
        } => match literal(right)? {
            Value::Integer(i) => Some(Value::Integer(-i)),
            Value::Float(f) => Some(Value::Float(-f)),
            _ => None,
        },
        _ => None,
    }
}
