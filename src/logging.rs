use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "sales_report=warn";

/// Install the global subscriber once. `RUST_LOG` overrides the default level.
/// Output goes to stderr so reports on stdout stay clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        // A subscriber installed by an embedding program wins.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
