use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use vc_backend::NativeBackend;
use visual_compare::config::ConfigStore;
use visual_compare::session::CompareSession;

mod cli;

/// visual-compare command line entry point
fn main() -> ExitCode {
    let args = cli::Cli::parse();

    let store = if args.no_config {
        None
    } else {
        ConfigStore::default_location()
    };

    // Saved level first, RUST_LOG on top
    env_logger::Builder::new()
        .filter_level(cli::log_level(&args, store.as_ref()).to_level_filter())
        .parse_default_env()
        .init();

    let mut session = CompareSession::new(Arc::new(NativeBackend), store);
    let result = cli::run(args.command, &mut session);
    session.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
