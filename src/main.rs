use clap::Parser;

use bluechi_monitor::CliArgs;
use bluechi_monitor::errors::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .error("Failed to create tokio runtime")
        .and_then(|rt| rt.block_on(bluechi_monitor::run(args)));

    if let Err(error) = result {
        log::debug!("{error:?}");
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
