use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "beerlist=info,tower_http=info";

/// Install the global subscriber. `RUST_LOG` wins over the default filter; calling twice
/// is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
