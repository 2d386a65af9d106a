//! Declaration AST nodes (top-level items)

use serde::{Deserialize, Serialize};
use crate::{Block, Expr, Meta, ValueTypeName};

/// A top-level declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// `sub vcl_recv { ... }`
    Subroutine(SubroutineDecl),

    /// `backend origin { .host = "example.com"; }`
    Backend(BackendDecl),

    /// `table redirects STRING { "/a": "/b" }`
    Table(TableDecl),

    /// `import boltsort;`
    Import(String),
}

/// Subroutine declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubroutineDecl {
    pub name: String,
    pub body: Block,
}

/// Backend declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDecl {
    pub name: String,
    pub properties: Vec<BackendProperty>,
}

/// `.name = value;` inside a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProperty {
    pub name: String,
    pub value: Expr,
    pub meta: Meta,
}

/// Table declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDecl {
    pub name: String,
    /// Declared value type; untyped tables hold strings
    pub value_type: Option<ValueTypeName>,
    pub entries: Vec<TableEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub key: String,
    pub value: Expr,
    pub meta: Meta,
}
