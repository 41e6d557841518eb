//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span, status, latency)
//! 3. Request ID (recorded in the span, Sentry scope, response header)
//! 4. Body size limit (`MAX_CONTENT_LENGTH`)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user};
pub use request_id::{make_request_span, request_id_middleware};
pub use session::create_session_layer;
