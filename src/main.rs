use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use minic::{ErrorReporter, codegen, frontend, semantic, semantic::stdenv};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "minic")]
#[command(about = "MiniC compiler emitting Jasmin assembly")]
struct Args {
    /// MiniC source file.
    source: PathBuf,
    /// Print every token the scanner produces.
    #[arg(long = "tokens", action = clap::ArgAction::SetTrue)]
    tokens: bool,
    /// Write the parsed syntax tree to this file.
    #[arg(long = "dump-ast", value_name = "PATH")]
    dump_ast: Option<PathBuf>,
    /// Print the signatures of the standard environment.
    #[arg(long = "dump-std-env", action = clap::ArgAction::SetTrue)]
    dump_std_env: bool,
    /// Assembly output path, `<stem>.j` by default.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("minic: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    println!("********** MiniC Compiler **********");
    if args.dump_std_env {
        print!("{}", stdenv::describe());
    }
    let code = minic::file_to_chars(&args.source)
        .with_context(|| format!("failed to open file {}", args.source.display()))?;
    let mut reporter = ErrorReporter::with_console();

    println!("Syntax Analysis ...");
    let Some(mut program) = frontend::parse(code, &mut reporter, args.tokens) else {
        println!("Compilation was unsuccessful.");
        return Ok(());
    };
    if let Some(path) = &args.dump_ast {
        std::fs::write(path, format!("{program:#?}\n"))
            .with_context(|| format!("failed to write syntax tree to {}", path.display()))?;
    }

    println!("Semantic Analysis ...");
    let symbols = semantic::check(&mut program, &mut reporter);
    if reporter.has_errors() {
        tracing::debug!(errors = reporter.num_errors(), "semantic errors");
        println!("Compilation was unsuccessful.");
        return Ok(());
    }

    println!("Code Generation ...");
    let class_name = minic::class_name(&args.source);
    let text = codegen::generate(&program, &symbols, &class_name)
        .context("internal fault during code generation")?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| minic::assembly_path(&args.source));
    std::fs::write(&output, text)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::debug!(output = %output.display(), "assembly written");
    println!("Compilation was successful.");
    Ok(())
}
