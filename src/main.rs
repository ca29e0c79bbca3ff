//! The Pell compiler CLI.
//!
//! This binary reads one Pell source file and either emits a `.c`
//! translation unit or drives the host C compiler to produce an
//! executable. Compilation itself lives in the `pell` library; this crate
//! adds argument parsing, error rendering, and the host-compiler
//! invocation.

use clap::Parser;

mod diagnostics;
mod driver;

/// Command-line interface for the Pell compiler.
#[derive(Parser)]
#[command(name = "pell")]
#[command(about = "Compile a Pell source file into a C file and an executable", long_about = None)]
pub(crate) struct Cli {
    /// The source file to compile.
    pub(crate) file: String,

    /// Name of the executable that will be produced.
    #[arg(short = 'o', long = "output", default_value = "a.out")]
    pub(crate) output: String,

    /// Optimization level (0 = none, 1 = folding,
    /// 2 = folding + propagation + dead-code elimination).
    #[arg(short = 'O', value_parser = clap::value_parser!(u8).range(0..=2), default_value_t = 0)]
    pub(crate) optimization: u8,

    /// Only assemble the code to C; do not run the host C compiler.
    #[arg(short = 'c')]
    pub(crate) emit_c_only: bool,

    /// Do not link the runtime I/O functions.
    #[arg(short = 'R', long = "no-runtime")]
    pub(crate) no_runtime: bool,

    /// Add source comments to the generated code.
    #[arg(short = 'v', long = "verbose-assembly")]
    pub(crate) verbose_assembly: bool,
}

/// Entry point for the Pell compiler.
fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .ok();

    let cli = Cli::parse();

    match driver::build(&cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(error) => {
            diagnostics::report_error(error.filename(), error.source(), error.error());
            std::process::exit(1);
        }
    }
}
