//! VCL AST - Core types for the abstract syntax tree
//!
//! This crate defines all AST node types, source positions used for
//! diagnostics and coverage identifiers, and the canonical text printer.

mod span;
mod expr;
mod stmt;
mod decl;
mod printer;

pub use span::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use printer::*;

use serde::{Deserialize, Serialize};

/// A complete VCL program
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

impl Program {
    /// Iterate over subroutine declarations in source order
    pub fn subroutines(&self) -> impl Iterator<Item = &SubroutineDecl> {
        self.declarations.iter().filter_map(|d| match &d.kind {
            DeclarationKind::Subroutine(sub) => Some(sub),
            _ => None,
        })
    }

    /// Find a subroutine declaration by name
    pub fn subroutine(&self, name: &str) -> Option<&SubroutineDecl> {
        self.subroutines().find(|sub| sub.name == name)
    }

    /// Iterate over table declarations in source order
    pub fn tables(&self) -> impl Iterator<Item = &TableDecl> {
        self.declarations.iter().filter_map(|d| match &d.kind {
            DeclarationKind::Table(table) => Some(table),
            _ => None,
        })
    }
}
