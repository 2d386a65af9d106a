//! Runtime values

use std::fmt;

use chrono::{DateTime, Utc};
use vcl_ast::ValueTypeName;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unset variable or void function result
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    String,
    Integer,
    Float,
    Bool,
    Time,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "NULL",
            ValueType::String => "STRING",
            ValueType::Integer => "INTEGER",
            ValueType::Float => "FLOAT",
            ValueType::Bool => "BOOL",
            ValueType::Time => "TIME",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::String(_) => ValueType::String,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::Time(_) => ValueType::Time,
        }
    }

    /// Zero value of a declared local variable
    pub fn default_for(ty: ValueTypeName) -> Self {
        match ty {
            ValueTypeName::String => Value::Null,
            ValueTypeName::Integer => Value::Integer(0),
            ValueTypeName::Float => Value::Float(0.0),
            ValueTypeName::Bool => Value::Bool(false),
            ValueTypeName::Time => Value::Time(DateTime::<Utc>::default()),
        }
    }

    /// Truthiness used by conditions: an unset value is false, any set
    /// string or time is true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(_) | Value::Time(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// String form used for concatenation, logging and response bodies
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{:.3}", v),
            Value::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            Value::Time(t) => write!(f, "{}", t.format("%a, %d %b %Y %H:%M:%S GMT")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
