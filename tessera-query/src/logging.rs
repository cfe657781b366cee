//! Logging setup for Tessera.
//!
//! Library code only emits `tracing` events. Applications that do not
//! install their own subscriber can call [`init`] once at startup.
//!
//! # Environment Variables
//!
//! - `TESSERA_DEBUG=true` (or `1`, `yes`) - Enable debug logging
//! - `TESSERA_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `TESSERA_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use tessera_query::logging;
//!
//! logging::init();
//! ```
//!
//! Events emitted by the compiler:
//!
//! ```rust,ignore
//! debug!(record_type = %record_type, predicates, params, "compiled filter");
//! trace!(%path, "skipping incomplete condition");
//! warn!(column = %column, "metadata column is not a safe identifier");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `TESSERA_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("TESSERA_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the log level from `TESSERA_LOG_LEVEL`.
///
/// Defaults to "debug" if `TESSERA_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("TESSERA_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the log format from `TESSERA_LOG_FORMAT`. Defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var("TESSERA_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install the Tessera subscriber. Subsequent calls are no-ops.
///
/// Does nothing unless `TESSERA_DEBUG` or `TESSERA_LOG_LEVEL` is set, or
/// when built without the `tracing-subscriber` feature.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("TESSERA_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "tessera={},tessera_query={},tessera_schema={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            // try_init: the host application may already own the global subscriber.
            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "Tessera logging initialized"
                );
            }
        }
    });
}

/// Debug event emitted only when `TESSERA_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! tessera_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}
