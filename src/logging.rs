use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "BIRDVAULT_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "birdvault=debug" } else { "warn" }
}

/// Install the stderr subscriber. `BIRDVAULT_LOG` wins over `--verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
