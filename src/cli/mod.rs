pub mod report;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    tracker::{DEFAULT_POLL_INTERVAL, start_tracker},
    utils::{dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Appwatch", version, long_about = None)]
#[command(about = "Tracks which application owns the active window and reports daily usage", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        help = "Application directory. By default tries to save into the platform state directory"
    )]
    dir: Option<PathBuf>,
    #[arg(long, help = "Mirror logs to stdout")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record active application usage until interrupted")]
    Track {
        #[arg(
            long,
            help = "Seconds between samples of the active application",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval: Option<u64>,
    },
    #[command(about = "Print total usage per application per day")]
    Report {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let data_dir = args.dir.map_or_else(create_application_default_path, Ok)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&data_dir, logging_level, args.log)?;

    match args.commands {
        Commands::Track { interval } => {
            let poll_interval = interval.map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs);
            start_tracker(data_dir, poll_interval).await
        }
        Commands::Report {} => report::process_report_command(data_dir).await,
    }
}
