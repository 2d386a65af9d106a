//! `table.lookup(table, key[, default])`

use crate::context::Context;
use crate::value::Value;

use super::{string_arg, FunctionError, Tables};

pub fn table_lookup(
    _ctx: &mut Context,
    tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    let name = string_arg("table.lookup", args, 0)?;
    let key = string_arg("table.lookup", args, 1)?;
    let table = tables
        .get(&name)
        .ok_or_else(|| FunctionError::UnknownTable(name.clone()))?;

    Ok(match table.get(&key) {
        Some(value) => value.clone(),
        None => args.get(2).cloned().unwrap_or(Value::Null),
    })
}
