//! VCL CLI - Parse, instrument, run and measure coverage of VCL programs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use vcl_ast::{Program, ToVcl};
use vcl_interpreter::function::{self, Tables};
use vcl_interpreter::{
    instrument, Context, CoverageRecord, CoverageRegistry, ErrorResponse, Exception, Interpreter,
    Value,
};
use vcl_parser::parse_file;

#[derive(Parser)]
#[command(name = "vcl")]
#[command(about = "VCL parser, interpreter and coverage tool", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Input file
    file: PathBuf,
    /// Subroutine to execute; may be repeated
    #[arg(long = "sub", default_value = "vcl_recv")]
    subs: Vec<String>,
    /// Request header as NAME=VALUE; may be repeated
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
    /// Pin `now`: unix seconds or "YYYY-MM-DD HH:MM:SS"
    #[arg(long)]
    fixed_time: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and output the AST as JSON
    Parse {
        /// Input file
        file: PathBuf,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the program with coverage markers inserted
    Instrument {
        /// Input file
        file: PathBuf,
        /// Output format: VCL text or AST JSON
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Execute subroutines and print the resulting state
    Run {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Execute subroutines of the instrumented program and report coverage
    Coverage {
        #[command(flatten)]
        run: RunArgs,
        /// Add hit counts of a previously saved snapshot
        #[arg(long)]
        merge: Option<PathBuf>,
        /// Save the merged snapshot for later runs
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse { file, pretty } => cmd_parse(&file, pretty),
        Commands::Instrument { file, format } => cmd_instrument(&file, format),
        Commands::Run { run } => cmd_run(&run),
        Commands::Coverage { run, merge, save } => {
            cmd_coverage(&run, merge.as_deref(), save.as_deref())
        }
    }
}

fn init_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, directives.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` directives when set and valid, else WARN (DEBUG with `-v`)
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()))
}

fn cmd_parse(file: &Path, pretty: bool) {
    let program = load(file);
    print_json(&program, pretty);
}

fn cmd_instrument(file: &Path, format: Format) {
    let mut program = load(file);
    let registry = CoverageRegistry::new();
    if let Err(e) = instrument(&mut program, &registry) {
        fail(&e.to_string());
    }

    match format {
        Format::Text => print!("{}", program.to_vcl(0)),
        Format::Json => print_json(&program, true),
    }
}

#[derive(Serialize)]
struct RunOutput {
    subroutine: String,
    return_state: Option<String>,
    error: Option<ErrorResponse>,
    response_body: Option<String>,
    logs: Vec<String>,
    restarted: bool,
    esi: bool,
    variables: BTreeMap<String, String>,
    exception: Option<String>,
}

fn cmd_run(args: &RunArgs) {
    let program = load(&args.file);
    let interpreter = interpreter_for(&program);

    let mut failed = false;
    let mut outputs = Vec::new();
    for sub in &args.subs {
        let mut ctx = context_for(args, None);
        let result = interpreter.execute(sub, &mut ctx);
        failed |= result.is_err();
        outputs.push(run_output(sub, ctx, result));
    }

    match args.format {
        Format::Json => print_json(&outputs, true),
        Format::Text => {
            for output in &outputs {
                print_run_output(output);
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

fn cmd_coverage(args: &RunArgs, merge: Option<&Path>, save: Option<&Path>) {
    let mut program = load(&args.file);
    let registry = Arc::new(CoverageRegistry::new());
    if let Err(e) = instrument(&mut program, &registry) {
        fail(&e.to_string());
    }
    let interpreter = interpreter_for(&program);

    let mut failed = false;
    for sub in &args.subs {
        let mut ctx = context_for(args, Some(Arc::clone(&registry)));
        if let Err(e) = interpreter.execute(sub, &mut ctx) {
            eprintln!("{}", e);
            failed = true;
        }
    }

    if let Some(path) = merge {
        let records: Vec<CoverageRecord> = read_json(path);
        tracing::debug!(path = %path.display(), records = records.len(), "merging snapshot");
        registry.merge(&records);
    }
    if let Some(path) = save {
        let json = match serde_json::to_string_pretty(&registry.snapshot()) {
            Ok(json) => json,
            Err(e) => fail(&format!("Error serializing snapshot: {}", e)),
        };
        if let Err(e) = fs::write(path, json) {
            fail(&format!("Error writing {}: {}", path.display(), e));
        }
    }

    let report = registry.report();
    match args.format {
        Format::Text => print!("{}", report),
        Format::Json => print_json(&report, true),
    }
    if failed {
        process::exit(1);
    }
}

fn load(file: &Path) -> Program {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error reading {}: {}", file.display(), e)),
    };

    match parse_file(&source, &file.to_string_lossy()) {
        Ok(program) => program,
        Err(e) => {
            report_parse_error(&source, file, &e);
            process::exit(1);
        }
    }
}

fn interpreter_for(program: &Program) -> Interpreter<'_> {
    match Interpreter::new(program) {
        Ok(interpreter) => interpreter,
        Err(e) => fail(&e.to_string()),
    }
}

fn context_for(args: &RunArgs, coverage: Option<Arc<CoverageRegistry>>) -> Context {
    let mut ctx = match coverage {
        Some(registry) => Context::with_coverage(registry),
        None => Context::new(),
    };
    for (name, value) in &args.headers {
        ctx.set_request_header(name, value.clone());
    }
    if let Some(time) = &args.fixed_time {
        if let Err(e) = fix_time(&mut ctx, time) {
            fail(&e.to_string());
        }
    }
    ctx
}

/// Same conversion as `testing.fixed_time(...)` in VCL
fn fix_time(ctx: &mut Context, time: &str) -> Result<(), function::FunctionError> {
    let argument = match time.parse::<i64>() {
        Ok(seconds) => Value::Integer(seconds),
        Err(_) => Value::from(time),
    };
    let fixed_time = function::lookup("testing.fixed_time")
        .ok_or_else(|| function::FunctionError::Undefined("testing.fixed_time".into()))?;
    fixed_time.invoke(ctx, &Tables::new(), &[argument])?;
    Ok(())
}

fn run_output(sub: &str, ctx: Context, result: Result<(), Exception>) -> RunOutput {
    let variables = ctx
        .variables()
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();
    RunOutput {
        subroutine: sub.to_string(),
        return_state: ctx.return_state,
        error: ctx.error,
        response_body: ctx.response_body,
        logs: ctx.logs,
        restarted: ctx.restarted,
        esi: ctx.esi,
        variables,
        exception: result.err().map(|e| e.to_string()),
    }
}

fn print_run_output(output: &RunOutput) {
    println!("sub {}", output.subroutine);
    if let Some(state) = &output.return_state {
        println!("  return: {}", state);
    }
    if let Some(error) = &output.error {
        println!("  error: {} {}", error.code, error.message);
    }
    if let Some(body) = &output.response_body {
        println!("  synthetic: {}", body);
    }
    for line in &output.logs {
        println!("  log: {}", line);
    }
    for (name, value) in &output.variables {
        println!("  {} = {}", name, value);
    }
    if let Some(exception) = &output.exception {
        eprintln!("{}", exception);
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {:?}", raw)),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => fail(&format!("Error serializing output: {}", e)),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => fail(&format!("Error reading {}: {}", path.display(), e)),
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => fail(&format!("Error parsing {}: {}", path.display(), e)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn report_parse_error(source: &str, file: &Path, error: &vcl_parser::ParseError) {
    let span = error.span();
    let name = file.to_string_lossy().to_string();
    let printed = Report::build(ReportKind::Error, name.clone(), span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((name.clone(), span.start..span.end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(source)));
    if printed.is_err() {
        eprintln!("{}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Host=example.com"),
            Ok(("Host".to_string(), "example.com".to_string()))
        );
        assert_eq!(
            parse_header("X-Eq=a=b"),
            Ok(("X-Eq".to_string(), "a=b".to_string()))
        );
        assert!(parse_header("novalue").is_err());
        assert!(parse_header("=x").is_err());
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        let filter = log_filter(true, Some("vcl=trace"));
        assert_eq!(filter.to_string(), "vcl=trace");

        let filter = log_filter(false, Some("error"));
        assert!(filter.to_string().eq_ignore_ascii_case("error"));
    }

    #[test]
    fn test_verbosity_without_rust_log() {
        assert!(log_filter(false, None).to_string().eq_ignore_ascii_case("warn"));
        assert!(log_filter(true, None).to_string().eq_ignore_ascii_case("debug"));
        assert!(log_filter(true, Some("  ")).to_string().eq_ignore_ascii_case("debug"));
    }

    #[test]
    fn test_fix_time_accepts_seconds_and_dates() {
        let mut ctx = Context::new();
        fix_time(&mut ctx, "60").unwrap();
        assert_eq!(ctx.get("now.sec"), Value::from("60"));

        fix_time(&mut ctx, "1970-01-01 00:02:00").unwrap();
        assert_eq!(ctx.get("now.sec"), Value::from("120"));

        assert!(fix_time(&mut ctx, "soon").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "vcl",
            "coverage",
            "main.vcl",
            "--sub",
            "vcl_recv",
            "--sub",
            "vcl_deliver",
            "--header",
            "Host=example.com",
            "--format",
            "json",
        ])
        .unwrap();
        let Commands::Coverage { run, merge, save } = cli.command else {
            panic!("expected coverage command");
        };
        assert_eq!(run.subs, vec!["vcl_recv", "vcl_deliver"]);
        assert_eq!(run.headers, vec![("Host".to_string(), "example.com".to_string())]);
        assert!(run.format == Format::Json);
        assert!(merge.is_none() && save.is_none());
    }
}
