//! The compile pipeline driver.
//!
//! Runs the phases in order (scan, parse, check, optimize, generate),
//! writes the `.c` file, and unless `-c` was given, finds the host C
//! compiler and drives it to an executable. A failure in any phase stops
//! the pipeline; later phases never see an invalid tree.

use std::path::Path;
use std::process::{Command, ExitStatus};

use log::debug;

use pell::codegen::{self, CodegenError, CodegenOptions};
use pell::optimize;
use pell::parser::{ParseError, Parser};
use pell::scanner::Scanner;
use pell::typecheck::{self, TypeError};

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

use crate::Cli;

/// A compilation error from any phase of the pipeline.
///
/// The parse and check phases accumulate; their variants carry every
/// error found, in source order.
pub(crate) enum CompileError {
    /// Syntax errors (including scan errors the parser promoted).
    Parse(Vec<ParseError>),
    /// Type checking errors.
    Type(Vec<TypeError>),
    /// A code generation error.
    Codegen(CodegenError),
    /// Failed to read the source file.
    FileRead {
        path: String,
        source: std::io::Error,
    },
    /// Failed to write the generated C file.
    FileWrite {
        path: String,
        source: std::io::Error,
    },
    /// No host C compiler on the PATH.
    CompilerNotFound,
    /// Failed to spawn the host C compiler.
    CompilerSpawn(std::io::Error),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Parse(errors) => {
                write!(f, "{} syntax error(s)", errors.len())
            }
            CompileError::Type(errors) => {
                write!(f, "{} type error(s)", errors.len())
            }
            CompileError::Codegen(error) => write!(f, "{}", error),
            CompileError::FileRead { path, source } => {
                write!(f, "Failed to read file '{}': {}", path, source)
            }
            CompileError::FileWrite { path, source } => {
                write!(f, "Failed to write file '{}': {}", path, source)
            }
            CompileError::CompilerNotFound => {
                write!(f, "No host C compiler found: install gcc (or cc) and put it on PATH")
            }
            CompileError::CompilerSpawn(source) => {
                write!(f, "Failed to run the host C compiler: {}", source)
            }
        }
    }
}

/// A compilation error bundled with the context error reporting needs.
pub(crate) struct CompileErrorWithContext {
    filename: String,
    source: String,
    error: CompileError,
}

impl CompileErrorWithContext {
    pub(crate) fn filename(&self) -> &str {
        &self.filename
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn error(&self) -> &CompileError {
        &self.error
    }
}

/// Returns the exit code from an exit status, handling signals on Unix.
fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        if let Some(signal) = status.signal() {
            eprintln!("Host compiler terminated by signal {}", signal);
            return 128 + signal;
        }
    }

    1
}

/// The path of the emitted `.c` file: the input's stem, in the current
/// directory.
fn c_file_path(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("out");
    format!("{}.c", stem.trim())
}

/// Compiles per the command line and returns the process exit code.
///
/// `Ok(code)` means the pipeline ran to its end; `code` is the host
/// compiler's exit status (0 when `-c` skipped it). Compile errors come
/// back as `Err` for the caller to render.
pub(crate) fn build(cli: &Cli) -> Result<i32, Box<CompileErrorWithContext>> {
    let source = match std::fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            return Err(with_context(
                cli,
                String::new(),
                CompileError::FileRead {
                    path: cli.file.clone(),
                    source: error,
                },
            ));
        }
    };

    let code = compile(cli, &source).map_err(|error| with_context(cli, source.clone(), error))?;
    Ok(code)
}

fn with_context(
    cli: &Cli,
    source: String,
    error: CompileError,
) -> Box<CompileErrorWithContext> {
    Box::new(CompileErrorWithContext {
        filename: cli.file.clone(),
        source,
        error,
    })
}

fn compile(cli: &Cli, source: &str) -> Result<i32, CompileError> {
    let include_runtime = !cli.no_runtime;

    debug!("scanning {}", cli.file);
    let tokens = Scanner::new(source).scan();

    debug!("parsing {} tokens", tokens.len());
    let mut program = Parser::new(tokens).parse().map_err(CompileError::Parse)?;

    debug!("type checking program '{}'", program.name);
    typecheck::check_program(&mut program, include_runtime).map_err(CompileError::Type)?;

    debug!("optimizing at level {}", cli.optimization);
    optimize::optimize_tree(&mut program, cli.optimization);

    debug!("generating C");
    let options = CodegenOptions {
        verbose: cli.verbose_assembly,
        include_runtime,
    };
    let c_text = codegen::generate(&program, source, options).map_err(CompileError::Codegen)?;

    let c_path = c_file_path(&cli.file);
    std::fs::write(&c_path, c_text).map_err(|error| CompileError::FileWrite {
        path: c_path.clone(),
        source: error,
    })?;

    if cli.emit_c_only {
        return Ok(0);
    }

    run_host_compiler(cli, &c_path, include_runtime)
}

/// Invokes the host C compiler on the emitted file.
///
/// The machine model stores pointers in `int` slots, so the output is
/// built 32-bit. The runtime library is a separately provided `runtime.c`
/// compiled alongside.
fn run_host_compiler(
    cli: &Cli,
    c_path: &str,
    include_runtime: bool,
) -> Result<i32, CompileError> {
    let compiler = which::which("gcc")
        .or_else(|_| which::which("cc"))
        .map_err(|_| CompileError::CompilerNotFound)?;

    let mut command = Command::new(&compiler);
    command.arg("-m32").arg("-o").arg(&cli.output);
    if include_runtime {
        command.arg("runtime.c");
    }
    command.arg(c_path);

    debug!("running host compiler: {:?}", command);
    let status = command.status().map_err(CompileError::CompilerSpawn)?;
    Ok(exit_code(&status))
}
