use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vcl::ast::Program;
use vcl::interpreter::{instrument, Context, CoverageRegistry, Interpreter};

/// Get path to a test fixture in tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a test fixture from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Parse a fixture, keeping the file name in node positions
pub fn parse_fixture(name: &str) -> Program {
    let source = load_fixture(name);
    vcl::parser::parse_file(&source, name).expect("parse failed")
}

/// Parse and instrument a fixture against a fresh registry
pub fn instrumented_fixture(name: &str) -> (Program, Arc<CoverageRegistry>) {
    let mut program = parse_fixture(name);
    let registry = Arc::new(CoverageRegistry::new());
    instrument(&mut program, &registry).expect("instrumentation failed");
    (program, registry)
}

/// Request input of one evaluation
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub url: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
}

impl Request {
    pub fn new(url: &'static str) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn context(&self, coverage: Option<Arc<CoverageRegistry>>) -> Context {
        let mut ctx = match coverage {
            Some(registry) => Context::with_coverage(registry),
            None => Context::new(),
        };
        if !self.url.is_empty() {
            ctx.set("req.url", self.url.into());
        }
        for (name, value) in &self.headers {
            ctx.set_request_header(name, *value);
        }
        ctx
    }
}

/// Execute `sub` of `program` for one request
pub fn run(
    program: &Program,
    sub: &str,
    request: &Request,
    coverage: Option<Arc<CoverageRegistry>>,
) -> Context {
    let mut ctx = request.context(coverage);
    Interpreter::new(program)
        .expect("interpreter setup failed")
        .execute(sub, &mut ctx)
        .expect("execution failed");
    ctx
}

/// Requests that together take every branch of `edge.vcl`
pub fn edge_requests() -> Vec<Request> {
    vec![
        Request::new("/old").header("Redirect", "1"),
        Request::new("/api/v1").header("Tier", "gold"),
        Request::new("/x")
            .header("Debug", "1")
            .header("UA", "Mobile Safari")
            .header("Tier", "silver-plus"),
        Request::new(""),
    ]
}
