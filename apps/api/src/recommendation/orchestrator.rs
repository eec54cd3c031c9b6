//! Recommendation Orchestrator — one model call per request, then normalization.
//!
//! Flow: credential check → prompt → single upstream call → `normalize`.
//! There is no retry; an upstream failure is reported to the caller as is.

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::CompletionProvider;
use crate::models::recommendation::RecommendationRecord;
use crate::recommendation::normalizer::{normalize, ReplySource, Section};
use crate::recommendation::prompts::{build_prompt, system_prompt};

/// Asks the model for material recommendations and coerces the reply into a record.
///
/// Fails with `AppError::Configuration` before any network call when the provider has
/// no credential, and with `AppError::Upstream` when the call itself fails. A reply that
/// cannot be parsed is not an error: it degrades to the placeholder record.
pub async fn get_recommendations(
    provider: &dyn CompletionProvider,
    description: &str,
    additional_requirements: Option<&str>,
) -> Result<RecommendationRecord, AppError> {
    if !provider.is_configured() {
        return Err(AppError::Configuration(
            "GROQ_API_KEY environment variable is required".to_string(),
        ));
    }

    let prompt = build_prompt(description, additional_requirements);
    info!("Requesting material recommendations ({} chars)", description.len());

    let reply = provider.complete(&system_prompt(), &prompt).await?;
    debug!("Model reply received ({} chars)", reply.len());

    let normalized = normalize(&reply, &Section::ALL);
    match normalized.source() {
        ReplySource::Parsed => debug!("Reply parsed directly"),
        ReplySource::ExtractedFromBlock => info!("Reply recovered from fenced JSON block"),
        ReplySource::Degenerate => warn!("Reply was not JSON; returning placeholder record"),
    }

    let record = normalized.into_record();
    info!("Recommendations ready: {} materials", record.materials.len());
    Ok(record)
}
