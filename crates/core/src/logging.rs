use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "chat_ledger_core=info";

/// Install the global fmt subscriber. Safe to call more than once.
///
/// `RUST_LOG` overrides [`DEFAULT_DIRECTIVE`] when set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // Another subscriber may already be installed by the host binary
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
