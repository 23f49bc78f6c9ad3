//! Unified logging initialization for Lyceum binaries
//!
//! The filter is picked in the following priority order:
//! 1. CLI flags (`-v/-q`) - highest priority
//! 2. RUST_LOG environment variable
//! 3. Binary-specific defaults - lowest priority

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose events follow the binary's verbosity flags
const LIBRARY_TARGETS: &[&str] = &["lyceum_sdk", "lyceum_common"];

/// Initialize logging with the specified verbosity level and default filter.
///
/// # Arguments
///
/// * `verbosity` - The verbosity flags from clap (-v/-q)
/// * `binary_name` - Target of the binary's own events (e.g. `lyceum_cli`)
/// * `default_filter` - The default filter string if no CLI flags or RUST_LOG are set
///
/// # Example
///
/// ```no_run
/// use clap_verbosity_flag::{Verbosity, InfoLevel};
/// use lyceum_common::logging;
///
/// let verbosity = Verbosity::<InfoLevel>::default();
/// logging::init_logging(&verbosity, "lyceum_cli", "lyceum_cli=info").unwrap();
/// ```
pub fn init_logging<L: LogLevel>(
    verbosity: &Verbosity<L>,
    binary_name: &str,
    default_filter: &str,
) -> Result<()> {
    let filter = build_filter(verbosity, binary_name, default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Initialize logging for CLI tools that should have minimal output by default
///
/// Returns `true` if logging was initialized, `false` when neither flags nor
/// RUST_LOG asked for it.
pub fn init_cli_logging<L: LogLevel>(
    verbosity: &Verbosity<L>,
    binary_name: &str,
    default_filter: &str,
) -> Result<bool> {
    if verbosity.log_level().is_some() || std::env::var("RUST_LOG").is_ok() {
        init_logging(verbosity, binary_name, default_filter)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn build_filter<L: LogLevel>(
    verbosity: &Verbosity<L>,
    binary_name: &str,
    default_filter: &str,
) -> Result<EnvFilter> {
    if let Some(log_level) = verbosity.log_level() {
        let level = log_level.to_string().to_lowercase();
        let directives = std::iter::once(binary_name)
            .chain(LIBRARY_TARGETS.iter().copied())
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",");
        Ok(EnvFilter::try_new(directives)?)
    } else {
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_verbosity_flag::{InfoLevel, OffLevel};

    #[test]
    fn test_flags_cover_library_targets() {
        let verbosity = Verbosity::<InfoLevel>::default();
        let filter = build_filter(&verbosity, "lyceum_cli", "lyceum_cli=error").unwrap();
        let rendered = filter.to_string();

        assert!(rendered.contains("lyceum_cli=info"));
        assert!(rendered.contains("lyceum_sdk=info"));
    }

    #[test]
    fn test_no_flags_falls_back_to_default() {
        std::env::remove_var("RUST_LOG");
        let verbosity = Verbosity::<OffLevel>::default();
        let filter = build_filter(&verbosity, "lyceum_cli", "lyceum_cli=warn").unwrap();

        assert_eq!(filter.to_string(), "lyceum_cli=warn");
    }
}
