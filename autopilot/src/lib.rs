pub mod benchmark;
pub mod config;
pub mod input;
pub mod lineage;
pub mod pilots;
pub mod runner;
pub mod util;

/// Installs the fmt subscriber used by both binaries. `RUST_LOG` adds to the
/// default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}
