//! BloodConnect Observability Module
//!
//! Provides configurable observability features including:
//! - Structured logging via `tracing-subscriber` (compact or JSON)
//! - Metrics collection via Prometheus
//! - HTTP request/response logging
//!
//! This module can be enabled or disabled at compile time via the `observability` feature flag.
//! At runtime, observability can be further controlled via the `OBSERVABILITY_ENABLED` environment variable.
//!
//! # Features
//!
//! - `observability` (default): Enables JSON logging, request logging and metrics. Without it,
//!   [`init_tracing`] falls back to plain console logging and every tracker is a no-op.
//!
//! # Examples
//!
//! ```no_run
//! use bloodconnect_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     let _metrics = init_metrics();
//!     // ... application code ...
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

// Re-export PrometheusHandle type when observability is enabled
#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

// Public exports when observability is enabled
#[cfg(feature = "observability")]
pub use logging::{init_tracing, is_observability_enabled, logging_middleware};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, metrics_app, metrics_middleware, track_backend_upsert_failure,
    track_role_lookup_failure, track_session_resolution, track_stale_resolution_discarded,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    /// No-op observability check when feature disabled
    pub fn is_observability_enabled() -> bool {
        false
    }

    /// Pass-through logging middleware when feature disabled
    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Pass-through metrics middleware when feature disabled
    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Console-only logging when feature disabled
    pub fn init_tracing() {
        crate::basic_logging::init_basic_console_logging();
    }

    /// No-op metrics initialization when feature disabled
    pub fn init_metrics() -> Option<()> {
        None
    }

    // No-op tracking functions
    pub fn track_session_resolution(_outcome: &str) {}
    pub fn track_stale_resolution_discarded() {}
    pub fn track_backend_upsert_failure() {}
    pub fn track_role_lookup_failure(_reason: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
