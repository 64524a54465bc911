//! Authentication route handlers.
//!
//! Handles registration, login, and logout. Failures come back as short
//! plain-text messages; success redirects to the dashboard.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::middleware::{clear_current_tenant, set_current_tenant};
use crate::models::{CurrentTenant, Tenant};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Login and registration form data.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let service = AuthService::new(state.pool());

    match service.register(&form.username, &form.password).await {
        Ok(tenant) => establish_session(&session, tenant).await,
        Err(AuthError::MissingFields) => {
            (StatusCode::BAD_REQUEST, "Please fill in all fields.").into_response()
        }
        Err(AuthError::InvalidUsername(e)) => {
            (StatusCode::BAD_REQUEST, format!("Invalid username: {e}.")).into_response()
        }
        Err(AuthError::UsernameTaken) => {
            (StatusCode::CONFLICT, "This username is already taken.").into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let service = AuthService::new(state.pool());

    match service.login(&form.username, &form.password).await {
        Ok(tenant) => establish_session(&session, tenant).await,
        Err(AuthError::InvalidCredentials) => {
            (StatusCode::UNAUTHORIZED, "Incorrect credentials.").into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_tenant(&session).await {
        tracing::warn!(error = %e, "failed to clear session on logout");
    }
    Redirect::to("/login").into_response()
}

/// Store the tenant in the session and redirect to the dashboard.
async fn establish_session(session: &Session, tenant: Tenant) -> Response {
    let current = CurrentTenant {
        id: tenant.id,
        username: tenant.username.into_inner(),
    };
    match set_current_tenant(session, &current).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to write session");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn internal_error(err: &AuthError) -> Response {
    tracing::error!(error = %err, "auth request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
