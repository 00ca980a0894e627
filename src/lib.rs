//! Arbor - hierarchical namespace over pluggable adapters
//!
//! Re-exports the core engine and both bundled adapters, and mounts drives
//! from an [`ArborConfig`].

pub mod mount;

pub use arbor_core::*;
pub use arbor_fs::DirectoryStore;
pub use arbor_memstore::DictionaryStore;
pub use mount::{mount, mount_file};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber, filtered by `RUST_LOG` or `default_filter`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
