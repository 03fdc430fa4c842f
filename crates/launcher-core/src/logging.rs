use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "LAUNCHER_LOG";

/// Initialize a tracing subscriber for the launcher.
///
/// Logs go to stderr so they never mix with an extension's stdout. The filter
/// comes from `LAUNCHER_LOG` (same syntax as `RUST_LOG`), defaulting to
/// "warn" if not set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_new("warn"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
