//! HTTP API for appointment verification.
//!
//! Routes are nested under `/api/` behind a middleware stack:
//! Trace → CORS → Rate Limit → Access Log → Handler.
//!
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server; `server` owns the listener lifecycle.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
