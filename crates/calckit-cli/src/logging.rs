use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `CALCKIT_LOG=calckit_core=debug`.
const LOG_ENV: &str = "CALCKIT_LOG";

/// Install the stderr subscriber. `verbose` overrides any configured filter.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Stdout is reserved for command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
