//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in tenant in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentTenant, session_keys};

/// Extractor that requires a logged-in tenant.
///
/// If no tenant is logged in, browser requests are redirected to the login
/// page and API requests get a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireTenant(tenant): RequireTenant,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", tenant.username)
/// }
/// ```
pub struct RequireTenant(pub CurrentTenant);

/// Error returned when authentication is required but no tenant is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireTenant
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        // Get the current tenant from the session
        let tenant: CurrentTenant = session
            .get(session_keys::CURRENT_TENANT)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                // JSON endpoints answer 401; page requests bounce to login
                let is_api = matches!(parts.uri.path(), "/chatbot")
                    || parts.uri.path().ends_with("/report");
                if is_api {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(tenant))
    }
}

/// Helper to set the current tenant in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_tenant(
    session: &Session,
    tenant: &CurrentTenant,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_TENANT, tenant).await
}

/// Helper to clear the current tenant from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_tenant(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentTenant>(session_keys::CURRENT_TENANT)
        .await?;
    Ok(())
}
