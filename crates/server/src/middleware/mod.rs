//! HTTP middleware: sessions, authentication, and rate limiting.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{RequireTenant, clear_current_tenant, set_current_tenant};
pub use rate_limit::{RateLimiterLayer, assistant_rate_limiter, auth_rate_limiter};
pub use session::create_session_layer;
