//! # crash CLI Entry Point
//!
//! Binary entry point for the CrateDB shell.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive session against the default server (127.0.0.1:4200)
//! crash
//!
//! # Connect to several nodes; statements fail over between them
//! crash --hosts node1:4200 node2:4200
//!
//! # Run statements and exit with 1 if any failed
//! crash -c "create table t (x int); insert into t values (1)"
//!
//! # Pipe a script
//! crash --hosts localhost:4200 < setup.sql
//!
//! # Debug logging on stderr
//! crash -vv
//! ```

use clap::{ArgAction, Parser};
use crash::backend::HttpConnector;
use crash::cli::{run_session, Dispatcher};
use crash::config::ShellConfig;
use eyre::Result;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Interactive SQL shell for CrateDB
#[derive(Parser, Debug)]
#[command(name = "crash")]
#[command(version, about = "Interactive SQL shell for CrateDB")]
struct Args {
    /// Print debug information, repeat for more (-vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Use this file to store the command history
    #[arg(long)]
    history: Option<PathBuf>,

    /// Execute the statements and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Servers to connect to, as host[:port] or URL
    #[arg(long, num_args = 1..)]
    hosts: Vec<String>,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let args = Args::parse();
    let config = ShellConfig::new(args.verbose, args.history, args.command, args.hosts);
    init_logging(&config);

    let connector = HttpConnector::new(config.error_trace());
    let mut dispatcher = Dispatcher::new(io::stdout(), Box::new(connector), config.error_trace());

    run_session(&config, &mut dispatcher)
}

fn init_logging(config: &ShellConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level()).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
