//! `doorkey`: run a door node, or address one from a bus master.

use anyhow::Result;
use clap::Parser;

mod args;
mod config;
mod logging;
mod master;
mod run;
mod token;

use args::{Cli, Commands};
use master::Request;

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let (target, request) = match &cli.command {
        Commands::Run(args) => return run::run(args),
        Commands::Ping { target, data } => (target, Request::Ping(*data)),
        Commands::Status(target) => (target, Request::Status),
        Commands::Unlock(target) => (target, Request::Unlock),
        Commands::Reject(target) => (target, Request::Reject),
    };

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(master::execute(target, request))
}
