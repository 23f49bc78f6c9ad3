//! Configuration command handlers

use crate::cli::commands::ConfigAction;
use crate::config::{expand_tilde, CliConfig};
use crate::error::Result;
use crate::output::{json_output, table_output};
use std::path::Path;

/// Handle `config` subcommands
pub fn handle_config(
    action: ConfigAction,
    path_override: Option<&Path>,
    config: &CliConfig,
    json: bool,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if json {
                json_output(config)?;
            } else {
                table_output::display_config(&config.to_map());
            }
        }
        ConfigAction::Path => {
            let path = match path_override {
                Some(path) => expand_tilde(path),
                None => CliConfig::default_config_path()?,
            };
            println!("{}", path.display());
        }
    }
    Ok(())
}
