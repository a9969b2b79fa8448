use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
