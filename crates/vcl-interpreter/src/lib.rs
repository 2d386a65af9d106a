//! VCL Interpreter - Coverage instrumentation and evaluation
//!
//! The usual pipeline parses a program, instruments it against a shared
//! [`CoverageRegistry`], then interprets the rewritten tree:
//!
//! ```ignore
//! let mut program = vcl_parser::parse(source)?;
//! let registry = Arc::new(CoverageRegistry::new());
//! instrument(&mut program, &registry)?;
//!
//! let interpreter = Interpreter::new(&program)?;
//! let mut ctx = Context::with_coverage(Arc::clone(&registry));
//! interpreter.execute("vcl_recv", &mut ctx)?;
//! println!("{}", registry.report());
//! ```

mod context;
mod coverage;
mod exception;
mod expression;
pub mod function;
mod instrument;
mod interpreter;
mod value;

pub use context::{Context, ErrorResponse};
pub use coverage::{
    CoverageKind, CoverageNode, CoverageRecord, CoverageRegistry, CoverageReport, CoverageSummary,
};
pub use exception::{Exception, ExceptionKind};
pub use instrument::{instrument, Instrumenter};
pub use interpreter::{Interpreter, MAX_CALL_DEPTH};
pub use value::{Value, ValueType};
