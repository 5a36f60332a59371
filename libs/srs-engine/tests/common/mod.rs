//! Shared test utilities.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};

static TRACING: Once = Once::new();

/// Install a fmt subscriber once per test binary. Honors RUST_LOG.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Fixed reference time used across tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, 8, 0, 0).unwrap()
}
