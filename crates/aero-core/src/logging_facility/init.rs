//! Logging initialization

use std::sync::Once;
use tracing_subscriber::EnvFilter;

use super::test_capture::init_test_capture;

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output, debug level
    Development,
    /// JSON output, info level
    Production,
    /// In-memory capture, see `init_test_capture()`
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call has an effect. `RUST_LOG` overrides the default
/// filter of the chosen profile.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        // A subscriber installed by the host application wins
        Profile::Development => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("aero=debug")),
                )
                .try_init();
        }
        Profile::Production => {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("aero=info")),
                )
                .try_init();
        }
        Profile::Test => {
            init_test_capture();
        }
    });
}
