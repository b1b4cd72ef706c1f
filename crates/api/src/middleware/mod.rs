//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Trailing-slash normalization (wraps the whole router)
//! 2. Sentry layers (capture errors)
//! 3. `TraceLayer` (`http_request` span with status and latency)
//! 4. Request ID (add unique ID to each request)
//! 5. Security headers (nosniff, no framing)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireAuth`] and [`OptionalAuth`] extractors.

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::{OptionalAuth, RequireAuth};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
