//! `std.*` string helpers

use crate::context::Context;
use crate::value::Value;

use super::{string_arg, FunctionError, Tables};

pub fn std_strlen(
    _ctx: &mut Context,
    _tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    let s = string_arg("std.strlen", args, 0)?;
    Ok(Value::Integer(s.chars().count() as i64))
}

pub fn std_tolower(
    _ctx: &mut Context,
    _tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    Ok(Value::String(string_arg("std.tolower", args, 0)?.to_lowercase()))
}

pub fn std_toupper(
    _ctx: &mut Context,
    _tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    Ok(Value::String(string_arg("std.toupper", args, 0)?.to_uppercase()))
}
