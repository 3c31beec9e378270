//! Logging initialization.
//!
//! Diagnostics go through `tracing` to stderr so that stdout stays free for
//! reports, dry-run listings and model lists.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Must be called at most once per process.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub fn init(verbose: u8, quiet: bool, format: LogFormat) {
    let default_directive = format!("dngmeta={}", default_level(verbose, quiet));
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_ansi(console::colors_enabled_stderr()),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0, false), "info");
        assert_eq!(default_level(1, false), "debug");
        assert_eq!(default_level(2, false), "trace");
        assert_eq!(default_level(5, false), "trace");
        assert_eq!(default_level(2, true), "warn");
    }
}
