//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "SCHEMAGUARD_LOG";

/// Initialize the schemaguard tracing/logging system.
///
/// Reads `SCHEMAGUARD_LOG` for per-module log levels, e.g.
/// `SCHEMAGUARD_LOG=schemaguard_analysis::engine=debug,schemaguard_core=warn`.
///
/// Falls back to `schemaguard=info` if the variable is unset or invalid.
/// Calling it more than once is a no-op; a subscriber installed earlier by the
/// host is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("schemaguard=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
