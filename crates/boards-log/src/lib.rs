//! Logging utilities for the boards client.
//!
//! Re-exports the `tracing` macros used across the workspace and offers a
//! few subscriber presets: structured JSON for long-running use, compact
//! text for the command line, and a test writer for unit tests.

pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};
pub use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Initialize the global subscriber with structured JSON output.
///
/// The filter is read from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() -> InitResult {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json(),
        )
        .try_init()?;

    Ok(())
}

/// Initialize the global subscriber with a fixed level filter and compact
/// text written to stderr, so command output on stdout stays clean.
pub fn init_tracing_with_level(level: &str) -> InitResult {
    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}

/// Initialize tracing for tests
pub fn init_tracing_test() -> InitResult {
    tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_macros() {
        info!("info message");
        debug!(address = "g1abc", "debug message with a field");
        warn!("warning message");
        error!("error message");
    }

    #[test]
    fn test_init_twice_reports_error() {
        // The first call may race with other tests installing a subscriber,
        // but a second call in the same process must always fail.
        let _ = init_tracing_test();
        assert!(init_tracing_test().is_err());
    }
}
