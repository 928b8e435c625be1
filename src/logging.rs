//! Logging setup.
//!
//! The library only emits `tracing` events; binaries decide where they go.
//! A full-screen terminal UI cannot log to stdout, so [`init`] takes the
//! writer explicitly (a file, usually).

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "FADESTREAM_LOG";

/// Filter used when neither the caller nor the environment gives one.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter: `FADESTREAM_LOG` wins over `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global subscriber writing plain-text events to `writer`.
///
/// Fails if a global subscriber is already set.
pub fn init<W>(default_filter: &str, writer: W) -> Result<(), TryInitError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init(DEFAULT_FILTER, std::io::sink);
        assert!(init(DEFAULT_FILTER, std::io::sink).is_err());
    }
}
