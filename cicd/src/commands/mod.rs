use anyhow::Result;
use clap::{Parser, Subcommand};

mod clean;

/// CLI utilities for ixiatg operator CI workflows.
#[derive(Parser, Debug)]
#[command(name = "opdev", bin_name = "opdev", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Test(test::Cli),
    Clean(clean::Cli),
}

impl Cli {
    pub fn exec(self) -> Result<()> {
        match self.command {
            Commands::Test(cli) => cli.exec(),
            Commands::Clean(cli) => cli.exec(),
        }
    }
}
