//! Subscriber setup for processes embedding dtsync
//!
//! The library only emits `tracing` events. A binary or service that hosts
//! the reconciler calls [`init`] once at startup to see them; tests and
//! embedders with their own subscriber skip it.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber for an embedding process.
///
/// Filters with `RUST_LOG`, falling back to `info`. Fails if a global
/// subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_instead_of_panicking() {
        let _ = init();
        assert!(init().is_err());
        tracing::info!(alias = "home", "Subscriber installed");
    }
}
