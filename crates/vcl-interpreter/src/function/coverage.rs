//! `coverage.subroutine`, `coverage.statement`, `coverage.branch`

use crate::context::Context;
use crate::coverage::CoverageKind;
use crate::value::Value;

use super::{string_arg, FunctionError, Tables};

pub fn coverage_subroutine(
    ctx: &mut Context,
    _tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    record(ctx, CoverageKind::Subroutine, args)
}

pub fn coverage_statement(
    ctx: &mut Context,
    _tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    record(ctx, CoverageKind::Statement, args)
}

pub fn coverage_branch(
    ctx: &mut Context,
    _tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    record(ctx, CoverageKind::Branch, args)
}

fn record(ctx: &mut Context, kind: CoverageKind, args: &[Value]) -> Result<Value, FunctionError> {
    let name = kind.function_name();
    let id = string_arg(name, args, 0)?;
    let registry = ctx
        .coverage
        .as_ref()
        .ok_or(FunctionError::CoverageDisabled { name })?;

    match registry.hit(kind, &id) {
        Some(hits) => {
            tracing::trace!(%kind, %id, hits, "coverage marker hit");
            Ok(Value::Null)
        }
        None => Err(FunctionError::UnknownMarker { kind, id }),
    }
}
