//! Shared setup for the integration tests

use std::sync::Once;

/// Initialize logging for tests if not already initialized
pub fn initialize_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(
                        "orasession_connection=debug,orasession_core=debug",
                    )
                }),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
