//! Envcatalog CLI entry point.

use clap::Parser;
use envcatalog::cli::{self, Cli, Commands, EXIT_ERROR};
use envcatalog::config::Config;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries reports and JSON, diagnostics go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = Config::load(cli.config.as_deref(), Path::new("."))?;

    match &cli.command {
        Commands::Create(args) => cli::run_create(args, &config),
        Commands::Update(args) => cli::run_update(args, &config),
        Commands::Check(args) => cli::run_check(args, &config),
        Commands::Verify(args) => cli::run_verify(args, &config),
        Commands::TagsFromEnv(args) => cli::run_tags_from_env(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
