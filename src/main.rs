use clap::Parser;
use log::{debug, error, info};
use snafu::ErrorCompat;

mod args;
mod poll;

use crate::poll::config_reader::{build_settings, read_config, PollConfig};
use crate::poll::{run_poll, PollResult};

fn run(args: &args::Args) -> PollResult<()> {
    let config = match &args.config {
        Some(path) => {
            info!("Reading configuration from {:?}", path);
            read_config(path)?
        }
        None => PollConfig::default(),
    };
    let settings = build_settings(args, &config)?;
    run_poll(&settings)
}

fn main() {
    let args = args::Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        error!("{}", e);
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            debug!("trace: {}", bt);
        }
        std::process::exit(e.exit_code());
    }
}
