#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use typecheck_bench::{list_cmd, plan_cmd, run_cmd};

#[derive(Parser, Debug)]
#[command(name = "typecheck-bench")]
#[command(about = "Benchmark Swift type-checking latency across source variants and Xcode versions", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set TYPECHECK_BENCH_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to the benchmark config (default: typecheck-bench.toml, else built-in matrix)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Benchmark the matrix on one, all, or the current toolchain (default)
    Run {
        /// Answer the toolchain prompt up front: a 1-based index, 'a' for all, or "" for current
        #[arg(long)]
        select: Option<String>,
        /// Override the configured number of warmup runs
        #[arg(long)]
        warmup: Option<u32>,
    },

    /// List installed toolchains in ascending version order
    List,

    /// Print the benchmark plan as JSON without running anything
    Plan {
        /// Override the configured number of warmup runs
        #[arg(long)]
        warmup: Option<u32>,
        /// Write the plan to this file instead of stdout
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("TYPECHECK_BENCH_LOG").unwrap_or_else(|_| {
        if verbose { "typecheck_bench=debug".to_string() } else { "typecheck_bench=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Run { select: None, warmup: None });
    let result = match command {
        Commands::Run { select, warmup } => run_cmd::run(cli.config, select, warmup),
        Commands::List => list_cmd::run(cli.config),
        Commands::Plan { warmup, json } => plan_cmd::run(cli.config, warmup, json),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
