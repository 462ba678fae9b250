// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tracing subscriber initialization for hosts running activities.
//!
//! Activities never log directly; their records go through the invocation
//! [`TraceSink`](crate::trace::TraceSink). Hosts that back the sink with
//! [`LogTracingService`](crate::trace::LogTracingService) call
//! [`init_subscriber`] once at startup so those records reach stderr.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default: `info`)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

/// Default filter when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr fmt subscriber filtered by `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_subscriber() -> bool {
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    let subscriber = tracing_subscriber::Registry::default()
        .with(fmt)
        .with(env_filter());

    tracing::subscriber::set_global_default(subscriber).is_ok()
}
