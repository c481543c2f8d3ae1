//! Tracing bootstrap for embedders.
//!
//! The kernel itself only emits `tracing` events; installing a subscriber
//! is the embedder's call. This helper wires up the common case: an
//! `RUST_LOG`-driven filter with compact stderr output, or JSON when
//! `LOG_FORMAT=json` is set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global tracing subscriber.
///
/// Reads `RUST_LOG` for the filter (default `info`) and `LOG_FORMAT` for
/// the output shape. Calling this twice panics, as registering two global
/// subscribers would; call it once at startup.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}
