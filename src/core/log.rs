use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// HTTP plumbing that is noisy at debug level.
const QUIET_TARGETS: [&str; 3] = ["hyper_util", "reqwest", "wiremock"];

fn targets(verbose: bool) -> Targets {
    let app_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    QUIET_TARGETS
        .iter()
        .fold(Targets::new(), |t, target| {
            t.with_target(*target, LevelFilter::INFO)
        })
        .with_target(env!("CARGO_CRATE_NAME"), app_level)
        .with_default(LevelFilter::WARN)
}

/// Installs the global subscriber. `RUST_LOG` narrows what `--verbose` allows.
/// Later calls are ignored.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(targets(verbose))
        .with(env_filter)
        .try_init();
}
