//! # assetpack-http: Bundle Delivery over HTTP
//!
//! Mounts an [`assetpack_bundle::Bundle`] on an Axum router. Every path is
//! handled by [`handler::serve`], registered as the router's fallback, so
//! the router can be nested under any prefix of a larger application.
//!
//! ## Middleware Stack
//!
//! ```text
//! Request → [MetricsMiddleware] → TraceLayer → serve
//! ```
//!
//! The metrics middleware is only present on routers built with
//! [`router_with_metrics`].
//!
//! ## Crate Policy
//!
//! - Unresolvable paths answer 404 and are not logged above `debug`.
//! - A resource that fails to produce its bytes answers 500 and is logged
//!   at `error`; details stay in the log.

pub mod error;
pub mod handler;
pub mod middleware;
pub mod mime;
pub mod state;

use assetpack_bundle::Bundle;
use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::ServeError;
pub use handler::{resolve_path, serve, Encoding};
pub use middleware::metrics::{MetricsSnapshot, ServeMetrics};
pub use state::ServeState;

/// A router serving `bundle` below `prefix`.
pub fn router(bundle: Bundle, prefix: &str) -> Router {
    Router::new()
        .fallback(handler::serve)
        .with_state(ServeState::new(bundle, prefix))
        .layer(TraceLayer::new_for_http())
}

/// As [`router`], counting requests into `metrics`.
pub fn router_with_metrics(bundle: Bundle, prefix: &str, metrics: ServeMetrics) -> Router {
    router(bundle, prefix)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(axum::Extension(metrics))
}
