use tracing_subscriber::EnvFilter;

/// Checked before `RUST_LOG`.
pub const LOG_ENV: &str = "AUDIOSWITCH_LOG";

/// Send logs to stderr, filtered by `AUDIOSWITCH_LOG` or `RUST_LOG`.
///
/// Without either, only warnings are shown, or everything down to debug
/// with `verbose`. stdout is left alone for the sink table.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not set up logging: {}", e))
}
