//! Assistant service: context assembly and the gateway to the
//! text-generation backend.
//!
//! The context builder is a pure function over a ledger snapshot so it can be
//! unit-tested without a live backend. The gateway drains the backend's chunk
//! stream under a single timeout ceiling and concatenates the fragments; no
//! retries, one attempt per question.

use std::fmt::Write as _;
use std::time::Duration;

use futures::{Stream, StreamExt};
use sqlx::SqlitePool;
use tracing::instrument;

use tally_core::TenantId;

use crate::db::{ProductRepository, PurchaseRepository, RepositoryError, SaleRepository};
use crate::gemini::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig, StreamChunk,
    ThinkingConfig,
};
use crate::models::{Product, Purchase, SaleWithProduct};

/// Low temperature favoring answers grounded in the context block.
const TEMPERATURE: f32 = 0.25;
/// Response length cap.
const MAX_OUTPUT_TOKENS: u32 = 1000;
/// Thinking is disabled for this assistant.
const THINKING_BUDGET: u32 = 0;

/// Errors that can occur while answering a question.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Database error while loading the ledger snapshot.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// The text-generation backend failed.
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),

    /// The backend did not complete within the timeout ceiling.
    #[error("assistant response timed out after {0} seconds")]
    Timeout(u64),
}

/// Service answering free-text questions grounded in a tenant's ledger.
pub struct AssistantService<'a> {
    pool: &'a SqlitePool,
    gemini: &'a GeminiClient,
    timeout: Duration,
}

impl<'a> AssistantService<'a> {
    /// Create a new assistant service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, gemini: &'a GeminiClient, timeout: Duration) -> Self {
        Self {
            pool,
            gemini,
            timeout,
        }
    }

    /// Answer a question using only the tenant's own ledger.
    ///
    /// Loads the full snapshot for this tenant (and only this tenant),
    /// renders it into the context block, and forwards it together with the
    /// question to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded, the backend call
    /// fails, or the stream does not finish within the timeout ceiling.
    #[instrument(skip(self, question), fields(owner = %owner))]
    pub async fn ask(&self, owner: TenantId, question: &str) -> Result<String, AssistantError> {
        let products = ProductRepository::new(self.pool).list_for_owner(owner).await?;
        let purchases = PurchaseRepository::new(self.pool)
            .list_for_owner(owner)
            .await?;
        let sales = SaleRepository::new(self.pool)
            .list_with_product_names(owner)
            .await?;

        let context = render_context(&products, &purchases, &sales);

        let request = GenerateContentRequest {
            contents: vec![Content::user(question)],
            system_instruction: Some(Content::system(system_instruction(&context))),
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                thinking_config: ThinkingConfig {
                    thinking_budget: THINKING_BUDGET,
                },
            },
        };

        let stream = self.gemini.generate_stream(request).await?;

        let timeout_secs = self.timeout.as_secs();
        tokio::time::timeout(self.timeout, drain(stream))
            .await
            .map_err(|_| AssistantError::Timeout(timeout_secs))?
    }
}

/// Accumulate a finite chunk stream into the final answer.
///
/// A mid-stream error aborts the drain; any partially-accumulated text is
/// discarded.
async fn drain(
    stream: impl Stream<Item = Result<StreamChunk, GeminiError>>,
) -> Result<String, AssistantError> {
    let mut answer = String::new();
    let mut stream = std::pin::pin!(stream);
    while let Some(chunk) = stream.next().await {
        answer.push_str(&chunk?.text());
    }
    Ok(answer)
}

/// Build the system instruction embedding the context block.
fn system_instruction(context: &str) -> String {
    format!(
        "Answer questions using only the following database records:\n\
         {context}\n\
         If a section has no entries it means there are no results. \
         Reply without Markdown formatting or asterisks. \
         Try to answer the question with the data you have, even if it limits precision."
    )
}

/// Render a tenant's ledger snapshot into the grounding context block.
///
/// Three labeled sections, one line per record with explicit field labels.
/// Section headers are always emitted, even when empty, so the assistant is
/// told "no results" explicitly rather than inferring it from absence.
#[must_use]
pub fn render_context(
    products: &[Product],
    purchases: &[Purchase],
    sales: &[SaleWithProduct],
) -> String {
    let mut out = String::from("Purchases:\n");
    for purchase in purchases {
        let _ = writeln!(
            out,
            "name: {}, unit cost: {}, quantity: {}, purchased at: {}",
            purchase.name,
            purchase.unit_cost,
            purchase.quantity,
            purchase.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }

    out.push_str("Products:\n");
    for product in products {
        let _ = writeln!(
            out,
            "name: {}, unit price: {}, stock: {}, added at: {}",
            product.name,
            product.unit_price,
            product.stock,
            product.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }

    out.push_str("Sales:\n");
    for sale in sales {
        let _ = writeln!(
            out,
            "product: {}, unit price at sale: {}, quantity: {}, sold at: {}",
            sale.product_name,
            sale.sale.unit_price_at_sale,
            sale.sale.quantity,
            sale.sale.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }

    out
}
