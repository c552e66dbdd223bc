pub mod cli;
pub mod config;
pub mod data;
pub mod dump;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod layout;
pub mod migrate;
pub mod records;
pub mod review;
pub mod sample;
pub mod sheet;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("networth_migrate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command: {:?}", cli.command);
    match cli.command {
        Commands::Migrate(args) => migrate::execute(&args),
        Commands::Review(args) => review::execute(&args),
        Commands::Dump(args) => dump::execute(&args),
        Commands::Export(args) => export::execute(&args),
        Commands::Sample(args) => sample::execute(&args),
    }
}
