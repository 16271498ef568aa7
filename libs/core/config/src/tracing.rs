use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre for the binary. Safe to call more than once.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize the global subscriber.
///
/// Production (`APP_ENV=production`) emits flattened JSON events without module
/// targets. Development uses the pretty formatter. Both install
/// [`tracing_error::ErrorLayer`] so eyre reports carry span traces.
///
/// `RUST_LOG` overrides the default filter. Repeated calls are ignored, which
/// keeps tests that share a process from panicking.
pub fn init_tracing(environment: &Environment) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info,tower_http=info,sea_orm=warn,sqlx=warn")
        } else {
            EnvFilter::new("debug,tower_http=debug,sea_orm=info,sqlx=warn")
        }
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!("Tracing initialized. Environment: {:?}", environment),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
