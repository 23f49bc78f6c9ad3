//! Main entry point for the Lyceum CLI

use clap::Parser;
use clap_verbosity_flag::LevelFilter;
use color_eyre::eyre::{eyre, Result};
use lyceum_cli::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Location and env sections are noise for end users
    color_eyre::config::HookBuilder::default()
        .display_location_section(false)
        .display_env_section(false)
        .install()?;

    match args.verbosity.log_level_filter() {
        LevelFilter::Off | LevelFilter::Error => {}
        _ => {
            std::env::set_var("RUST_LIB_BACKTRACE", "1");
        }
    }

    // Handlers live in the library crate, so its target is the package name
    let binary_name = env!("CARGO_PKG_NAME").replace('-', "_");
    let default_filter = format!("{binary_name}=error,lyceum_sdk=error");
    lyceum_common::logging::init_cli_logging(&args.verbosity, &binary_name, &default_filter)
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    Ok(args.run().await?)
}
