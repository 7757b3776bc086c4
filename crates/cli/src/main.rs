//! tooldist CLI
//!
//! Uploads directories of executables as versioned bundles, lists what a store
//! carries, and fetches the bundle that fits this machine.

// Command output goes to stdout and fatal reports to stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod tracing;

use crate::commands::Context;
use crate::tracing::TracingConfig;
use tooldist_core::Config;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    if let Err(error) = run() {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

fn run() -> miette::Result<()> {
    let cli = cli::parse();

    crate::tracing::init_tracing(&TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
    })?;

    let span = ::tracing::info_span!(
        "tooldist",
        correlation_id = %crate::tracing::correlation_id()
    );
    let _guard = span.enter();

    let config = Config::load(cli.config.as_deref())?;
    let ctx = Context::new(config, cli.storage, cli.public_storage)?;
    let output = commands::execute(&ctx, cli.command)?;
    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}
