//! HTTP surface for Agora.
//!
//! Everything web-facing sits behind the `web-axum` feature; the metrics
//! registry is always compiled so other frontends can reuse it.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod dto;
#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod router;

#[cfg(feature = "web-axum")]
pub use router::{build_router, AppState};
