use anyhow::Result;
use clap::Parser;

use parking_pathfinder::commands::{self, CommonOpts, PlanCommand};

#[derive(Parser, Debug)]
#[command(name = "parking_pathfinder", version, about = "Route planning for multi-level parking facilities")]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: PlanCommand,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::cmd_plan(cli.common, cli.command)
}
