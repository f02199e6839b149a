use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `TMCWS_LOG=tmcwsapp=debug`.
pub const LOG_ENV: &str = "TMCWS_LOG";

/// Installs the stderr log subscriber. `TMCWS_LOG` wins over `--verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
