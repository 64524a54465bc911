//! Assistant route handler.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse, response::Response};
use serde::{Deserialize, Serialize};

use crate::middleware::RequireTenant;
use crate::services::AssistantService;
use crate::state::AppState;

/// A question for the assistant.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

/// The assistant's answer (or error message).
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Ask the assistant a question about the tenant's own ledger.
///
/// Every failure past this point (backend, timeout, database) is caught and
/// returned as a structured 500 payload; the process never falls over because
/// the backend did.
pub async fn ask(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Json(request): Json<ChatRequest>,
) -> Response {
    let service = AssistantService::new(
        state.pool(),
        state.gemini(),
        state.config().assistant_timeout,
    );

    match service.ask(tenant.id, &request.question).await {
        Ok(answer) => Json(ChatResponse { response: answer }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "assistant request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse {
                    response: format!("Error al generar respuesta: {e}"),
                }),
            )
                .into_response()
        }
    }
}
