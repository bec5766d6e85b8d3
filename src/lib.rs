pub mod config;
pub mod error;
pub mod models;
pub mod db;
pub mod catalog; // Allergy & component reference data
pub mod users;
pub mod vaccines;
pub mod schedule; // Booking, recurrence, status lifecycle
pub mod reactions;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for an embedding application.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate default.
/// Call once at startup; repeated calls are ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
