mod app;
mod commands;
mod meta;
mod report;

use anyhow::Result;
use clap::Parser;

use crate::commands::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    Cli::parse().exec()
}
