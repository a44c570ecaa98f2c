//! LRT program runner - runs demonstration programs on the lazy runtime.

mod programs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lrt_runtime::{run_program, RuntimeConfig, RuntimeContext};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Runs demonstration programs on the lazy runtime
#[derive(Parser, Debug)]
#[command(name = "lrt-run")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The program to run
    #[command(subcommand)]
    program: Program,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Buffer output in blocks instead of lines
    #[arg(long)]
    block_buffered: bool,
}

/// Built-in programs
#[derive(Subcommand, Debug)]
enum Program {
    /// Return an integer exit status
    Exit {
        /// The status to return
        #[arg(allow_negative_numbers = true)]
        code: i32,
    },

    /// Return a boolean (true exits 0, false exits 1)
    Bool {
        /// The value to return
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },

    /// Request exit codes through the exit-code registry
    Request {
        /// Codes to request; the highest below 256 wins
        #[arg(allow_negative_numbers = true)]
        codes: Vec<i32>,
    },

    /// Print primes from a lazy sieve
    Primes {
        /// How many primes to print
        #[arg(default_value = "10")]
        count: usize,
    },

    /// Print a Fibonacci number from a self-referential list
    Fib {
        /// Index of the number
        n: usize,
    },

    /// Print elements of the circular list `ones = 1 : ones`
    Ones {
        /// How many elements to print
        #[arg(default_value = "5")]
        count: usize,
    },

    /// Echo standard input as quoted strings
    Echo,

    /// Run a program that depends on itself
    Diverge,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env().context("invalid runtime configuration")?;
    if cli.verbose {
        config.log_level = Level::DEBUG;
    }
    if cli.block_buffered {
        config.line_buffered = false;
    }

    // Set up logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut ctx = RuntimeContext::new(config);
    let outcome = match cli.program {
        Program::Exit { code } => run_program(&mut ctx, &programs::exit_with(code)),
        Program::Bool { value } => run_program(&mut ctx, &programs::boolean(value)),
        Program::Request { codes } => run_program(&mut ctx, &programs::request(codes)),
        Program::Primes { count } => run_program(&mut ctx, &programs::primes(count)),
        Program::Fib { n } => run_program(&mut ctx, &programs::fib(n)),
        Program::Ones { count } => run_program(&mut ctx, &programs::ones_list(count)),
        Program::Echo => run_program(&mut ctx, &programs::echo()),
        Program::Diverge => run_program(&mut ctx, &programs::diverge()),
    };

    match outcome {
        Ok(status) => {
            let code = ctx.shutdown(status)?;
            std::process::exit(code);
        }
        Err(err) => {
            eprintln!("lrt-run: {err}");
            std::process::exit(1);
        }
    }
}
