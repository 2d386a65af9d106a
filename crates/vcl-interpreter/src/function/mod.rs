//! Built-in functions
//!
//! Every built-in declares its parameters up front. The interpreter checks
//! the argument count against that declaration before the handler runs;
//! handlers check argument types themselves and return a typed error.
//!
//! Coverage markers injected by the instrumentation pass are ordinary calls
//! to the `coverage.*` functions in this table.

mod coverage;
mod string;
mod table;
mod testing;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::context::Context;
use crate::coverage::CoverageKind;
use crate::value::{Value, ValueType};

/// Table contents keyed by table name, then by entry key
pub type Tables = BTreeMap<String, BTreeMap<String, Value>>;

pub type Handler = fn(&mut Context, &Tables, &[Value]) -> Result<Value, FunctionError>;

/// How an argument is passed to a built-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Evaluated expression
    Value,
    /// Bare identifier passed by name, e.g. a table name
    Ident,
}

pub struct Function {
    pub name: &'static str,
    pub params: &'static [Param],
    /// Number of trailing parameters that may be omitted
    pub optional: usize,
    pub call: Handler,
}

impl Function {
    pub fn validate(&self, args: &[Value]) -> Result<(), FunctionError> {
        let max = self.params.len();
        let min = max - self.optional;
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{}..{}", min, max)
            };
            return Err(FunctionError::ArgumentCount {
                name: self.name,
                expected,
                actual: args.len(),
            });
        }
        Ok(())
    }

    /// Validate the argument count, then run the handler
    pub fn invoke(&self, ctx: &mut Context, tables: &Tables, args: &[Value]) -> Result<Value, FunctionError> {
        self.validate(args)?;
        (self.call)(ctx, tables, args)
    }

    /// Kind of the parameter at `index`; extra arguments are plain values
    pub fn param(&self, index: usize) -> Param {
        self.params.get(index).copied().unwrap_or(Param::Value)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunctionError {
    #[error("function {0} is not defined")]
    Undefined(String),

    #[error("{name} expects {expected} argument(s), {actual} provided")]
    ArgumentCount {
        name: &'static str,
        expected: String,
        actual: usize,
    },

    #[error("argument {index} of {name} must be {expected}, {actual} provided")]
    ArgumentType {
        name: &'static str,
        index: usize,
        expected: &'static str,
        actual: ValueType,
    },

    #[error("coverage marker {id} is not registered as a {kind}")]
    UnknownMarker { kind: CoverageKind, id: String },

    #[error("{name} requires coverage to be enabled")]
    CoverageDisabled { name: &'static str },

    #[error("table {0} is not defined")]
    UnknownTable(String),

    #[error("{0}")]
    Testing(String),
}

const FUNCTIONS: &[Function] = &[
    Function {
        name: "coverage.subroutine",
        params: &[Param::Value],
        optional: 0,
        call: coverage::coverage_subroutine,
    },
    Function {
        name: "coverage.statement",
        params: &[Param::Value],
        optional: 0,
        call: coverage::coverage_statement,
    },
    Function {
        name: "coverage.branch",
        params: &[Param::Value],
        optional: 0,
        call: coverage::coverage_branch,
    },
    Function {
        name: testing::TESTING_FIXED_TIME,
        params: &[Param::Value],
        optional: 0,
        call: testing::testing_fixed_time,
    },
    Function {
        name: "std.strlen",
        params: &[Param::Value],
        optional: 0,
        call: string::std_strlen,
    },
    Function {
        name: "std.tolower",
        params: &[Param::Value],
        optional: 0,
        call: string::std_tolower,
    },
    Function {
        name: "std.toupper",
        params: &[Param::Value],
        optional: 0,
        call: string::std_toupper,
    },
    Function {
        name: "table.lookup",
        params: &[Param::Ident, Param::Value, Param::Value],
        optional: 1,
        call: table::table_lookup,
    },
];

/// Find a built-in by name
pub fn lookup(name: &str) -> Option<&'static Function> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

/// String argument; an unset value reads as the empty string
fn string_arg(name: &'static str, args: &[Value], index: usize) -> Result<String, FunctionError> {
    match &args[index] {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(FunctionError::ArgumentType {
            name,
            index: index + 1,
            expected: "STRING",
            actual: other.value_type(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        assert!(lookup("coverage.branch").is_some());
        assert!(lookup("testing.fixed_time").is_some());
        assert!(lookup("std.nope").is_none());
    }

    #[test]
    fn test_validate_argument_count() {
        let function = lookup("table.lookup").unwrap();
        assert!(function.validate(&[Value::from("t"), Value::from("k")]).is_ok());
        let err = function.validate(&[Value::from("t")]).unwrap_err();
        assert_eq!(err.to_string(), "table.lookup expects 2..3 argument(s), 1 provided");
    }

    #[test]
    fn test_invoke_checks_arity_before_running() {
        let mut ctx = Context::new();
        let function = lookup("std.strlen").unwrap();
        let err = function.invoke(&mut ctx, &Tables::new(), &[]).unwrap_err();
        assert!(matches!(err, FunctionError::ArgumentCount { actual: 0, .. }));
        let len = function.invoke(&mut ctx, &Tables::new(), &[Value::from("abc")]).unwrap();
        assert_eq!(len, Value::Integer(3));
    }

    #[test]
    fn test_marker_functions_match_coverage_kinds() {
        for kind in CoverageKind::ALL {
            assert!(lookup(kind.function_name()).is_some(), "{} missing", kind);
        }
    }
}
