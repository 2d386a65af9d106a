//! Expression evaluation

use std::cmp::Ordering;

use regex::Regex;
use vcl_ast::{Expr, ExprKind, FunctionCall, InfixOp, Position, PostfixOp, PrefixOp};

use crate::context::Context;
use crate::exception::Exception;
use crate::function::{self, FunctionError, Param};
use crate::interpreter::Interpreter;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithmeticOp {
    Add,
    Sub,
}

impl<'p> Interpreter<'p> {
    pub fn evaluate(&self, expr: &Expr, ctx: &mut Context) -> Result<Value, Exception> {
        let position = expr.meta.position();

        match &expr.kind {
            ExprKind::Ident(name) => Ok(ctx.get(name)),
            ExprKind::String(s) => Ok(Value::String(s.clone())),
            ExprKind::Integer(i) => Ok(Value::Integer(*i)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Grouped(inner) => self.evaluate(inner, ctx),

            ExprKind::Prefix { op, right } => {
                let right = self.evaluate(right, ctx)?;
                match (op, right) {
                    (PrefixOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
                    (PrefixOp::Minus, Value::Integer(i)) => i
                        .checked_neg()
                        .map(Value::Integer)
                        .ok_or_else(|| Exception::runtime(position, "integer overflow")),
                    (PrefixOp::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
                    (PrefixOp::Minus, other) => Err(Exception::runtime(
                        position,
                        format!("cannot negate {} value", other.value_type()),
                    )),
                }
            }

            ExprKind::Postfix {
                op: PostfixOp::Percent,
                left,
            } => match self.evaluate(left, ctx)? {
                Value::Integer(i) => Ok(Value::Float(i as f64 / 100.0)),
                Value::Float(f) => Ok(Value::Float(f / 100.0)),
                other => Err(Exception::runtime(
                    position,
                    format!("% applies to numbers, {} provided", other.value_type()),
                )),
            },

            ExprKind::Infix { op, left, right } => self.evaluate_infix(*op, left, right, position, ctx),

            ExprKind::If {
                condition,
                consequence,
                alternative,
            } => {
                if self.evaluate(condition, ctx)?.is_truthy() {
                    self.evaluate(consequence, ctx)
                } else {
                    self.evaluate(alternative, ctx)
                }
            }

            ExprKind::Call(call) => self.call_function(call, position, ctx),
        }
    }

    fn evaluate_infix(
        &self,
        op: InfixOp,
        left: &Expr,
        right: &Expr,
        position: Option<&Position>,
        ctx: &mut Context,
    ) -> Result<Value, Exception> {
        match op {
            InfixOp::Or => {
                let result = self.evaluate(left, ctx)?.is_truthy() || self.evaluate(right, ctx)?.is_truthy();
                Ok(Value::Bool(result))
            }
            InfixOp::And => {
                let result = self.evaluate(left, ctx)?.is_truthy() && self.evaluate(right, ctx)?.is_truthy();
                Ok(Value::Bool(result))
            }
            _ => {
                let left = self.evaluate(left, ctx)?;
                let right = self.evaluate(right, ctx)?;
                binary(op, left, right, position, ctx)
            }
        }
    }

    /// Run a built-in. Parameters declared as identifiers receive the bare
    /// name instead of the variable's value.
    pub(crate) fn call_function(
        &self,
        call: &FunctionCall,
        position: Option<&Position>,
        ctx: &mut Context,
    ) -> Result<Value, Exception> {
        let function = function::lookup(&call.name).ok_or_else(|| {
            Exception::runtime(position, FunctionError::Undefined(call.name.clone()).to_string())
        })?;

        let mut args = Vec::with_capacity(call.arguments.len());
        for (index, argument) in call.arguments.iter().enumerate() {
            let value = match (function.param(index), &argument.kind) {
                (Param::Ident, ExprKind::Ident(name)) => Value::String(name.clone()),
                _ => self.evaluate(argument, ctx)?,
            };
            args.push(value);
        }

        function
            .invoke(ctx, &self.tables, &args)
            .map_err(|err| Exception::runtime(position, err.to_string()))
    }
}

/// Apply an operator to two evaluated operands
fn binary(
    op: InfixOp,
    left: Value,
    right: Value,
    position: Option<&Position>,
    ctx: &mut Context,
) -> Result<Value, Exception> {
    match op {
        InfixOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        InfixOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        InfixOp::Eq => Ok(Value::Bool(equals(&left, &right))),
        InfixOp::Ne => Ok(Value::Bool(!equals(&left, &right))),
        InfixOp::Match => regex_match(&left, &right, position, ctx).map(Value::Bool),
        InfixOp::NotMatch => regex_match(&left, &right, position, ctx).map(|m| Value::Bool(!m)),
        InfixOp::Lt => compare(&left, &right, position).map(|o| Value::Bool(o == Ordering::Less)),
        InfixOp::Le => compare(&left, &right, position).map(|o| Value::Bool(o != Ordering::Greater)),
        InfixOp::Gt => compare(&left, &right, position).map(|o| Value::Bool(o == Ordering::Greater)),
        InfixOp::Ge => compare(&left, &right, position).map(|o| Value::Bool(o != Ordering::Less)),
        InfixOp::Plus => arithmetic(ArithmeticOp::Add, left, right, position),
        InfixOp::Minus => arithmetic(ArithmeticOp::Sub, left, right, position),
    }
}

/// Numbers compare by value, everything else by string form
fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Time(a), Value::Time(b)) => a == b,
        _ => match (as_float(left), as_float(right)) {
            (Some(a), Some(b)) => a == b,
            _ => left.to_string() == right.to_string(),
        },
    }
}

fn compare(left: &Value, right: &Value, position: Option<&Position>) -> Result<Ordering, Exception> {
    let ordering = match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        _ => match (as_float(left), as_float(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    ordering.ok_or_else(|| {
        Exception::runtime(
            position,
            format!("cannot compare {} with {}", left.value_type(), right.value_type()),
        )
    })
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// `+` adds numbers and concatenates anything else; `-` only takes numbers
pub(crate) fn arithmetic(
    op: ArithmeticOp,
    left: Value,
    right: Value,
    position: Option<&Position>,
) -> Result<Value, Exception> {
    let overflow = || Exception::runtime(position, "integer overflow");

    match (op, &left, &right) {
        (ArithmeticOp::Add, Value::Integer(a), Value::Integer(b)) => {
            a.checked_add(*b).map(Value::Integer).ok_or_else(overflow)
        }
        (ArithmeticOp::Sub, Value::Integer(a), Value::Integer(b)) => {
            a.checked_sub(*b).map(Value::Integer).ok_or_else(overflow)
        }
        _ => match (op, as_float(&left), as_float(&right)) {
            (ArithmeticOp::Add, Some(a), Some(b)) => Ok(Value::Float(a + b)),
            (ArithmeticOp::Sub, Some(a), Some(b)) => Ok(Value::Float(a - b)),
            (ArithmeticOp::Add, _, _) => Ok(Value::String(format!("{}{}", left, right))),
            (ArithmeticOp::Sub, _, _) => Err(Exception::runtime(
                position,
                format!(
                    "cannot subtract {} from {}",
                    right.value_type(),
                    left.value_type()
                ),
            )),
        },
    }
}

/// Matches set `re.group.N` for every capture group of the pattern
fn regex_match(
    subject: &Value,
    pattern: &Value,
    position: Option<&Position>,
    ctx: &mut Context,
) -> Result<bool, Exception> {
    let regex = Regex::new(&pattern.to_string())
        .map_err(|err| Exception::runtime(position, format!("invalid regex: {}", err)))?;
    let subject = subject.to_string();

    let Some(captures) = regex.captures(&subject) else {
        return Ok(false);
    };
    for (index, group) in captures.iter().enumerate() {
        let value = group.map_or(Value::Null, |m| Value::from(m.as_str()));
        ctx.set(format!("re.group.{}", index), value);
    }
    Ok(true)
}
