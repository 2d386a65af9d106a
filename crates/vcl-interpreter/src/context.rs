//! Per-evaluation interpreter state

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coverage::CoverageRegistry;
use crate::value::Value;

/// Response installed by an `error` statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub code: i64,
    pub message: String,
}

/// Mutable state of one program evaluation.
///
/// The instrumented program itself is shared and read-only during
/// interpretation; everything an evaluation changes lives here.
#[derive(Debug, Default)]
pub struct Context {
    variables: BTreeMap<String, Value>,
    /// Clock installed by `testing.fixed_time`
    pub fixed_time: Option<DateTime<Utc>>,
    pub response_body: Option<String>,
    pub logs: Vec<String>,
    /// State name given to `return(...)`, e.g. `pass`
    pub return_state: Option<String>,
    /// Value given to `return` when it is not a state name
    pub return_value: Option<Value>,
    pub error: Option<ErrorResponse>,
    pub esi: bool,
    pub restarted: bool,
    pub coverage: Option<Arc<CoverageRegistry>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coverage(registry: Arc<CoverageRegistry>) -> Self {
        Self {
            coverage: Some(registry),
            ..Self::default()
        }
    }

    /// Current time, honoring a fixed clock
    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_time.unwrap_or_else(Utc::now)
    }

    /// Read a variable; unknown names are unset
    pub fn get(&self, name: &str) -> Value {
        match name {
            "now" => Value::Time(self.now()),
            "now.sec" => Value::String(self.now().timestamp().to_string()),
            _ => self.variables.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    pub fn is_set(&self, name: &str) -> bool {
        !self.get(name).is_null()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Append to a header-like variable; repeated values are comma-joined
    pub fn add(&mut self, name: &str, value: Value) {
        let joined = match self.variables.get(name) {
            Some(existing) if !existing.is_null() => {
                Value::String(format!("{}, {}", existing, value))
            }
            _ => value,
        };
        self.variables.insert(name.to_string(), joined);
    }

    pub fn unset(&mut self, name: &str) {
        self.variables.remove(name);
    }

    /// Seed `req.http.<name>`
    pub fn set_request_header(&mut self, name: &str, value: impl Into<String>) {
        self.set(format!("req.http.{}", name), Value::String(value.into()));
    }

    pub fn variables(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variables.iter()
    }
}
