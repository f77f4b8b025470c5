//! Hearth application layer
//!
//! Composes the `hearth-core` backend into feature services behind one
//! [`AppContext`]. A presentation layer owns a context, drives the
//! explicit sign-in/restore/sign-out lifecycle, and reads each service's
//! cached snapshot between round trips.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub mod context;
pub mod services;

pub use config::AppConfig;
pub use context::AppContext;

/// Initialize logging, filtered by `RUST_LOG`
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
