//! VCL - parser, interpreter and coverage instrumentation for VCL programs
//!
//! This is the root workspace crate that hosts the end-to-end tests.
//! The actual implementation is in the workspace member crates.

pub use vcl_ast as ast;
pub use vcl_interpreter as interpreter;
pub use vcl_lexer as lexer;
pub use vcl_parser as parser;
