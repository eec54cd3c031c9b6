//! Axum route handler for the Recommendation API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::recommendation::{MaterialEntry, RecommendationRecord};
use crate::recommendation::orchestrator::get_recommendations;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub description: String,
    #[serde(default)]
    pub additional_requirements: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub product_description: String,
    pub materials: Vec<MaterialEntry>,
    pub recommendations: String,
    pub pdf_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_materials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_considerations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_considerations: Option<String>,
}

impl RecommendResponse {
    fn new(product_description: String, record: &RecommendationRecord, pdf_path: String) -> Self {
        Self {
            product_description,
            materials: record.materials.clone(),
            recommendations: record.general_recommendations.clone(),
            pdf_path: Some(pdf_path),
            alt_materials: record.alt_materials.clone(),
            manufacturing_considerations: record.manufacturing_considerations.clone(),
            cost_considerations: record.cost_considerations.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/recommend-materials
///
/// Runs the model call and normalization, answers with the record, and hands the same
/// record to the background PDF renderer. `pdf_path` names a file that appears in the
/// output directory once rendering finishes; the response does not wait for it.
pub async fn handle_recommend_materials(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    let record = Arc::new(
        get_recommendations(
            state.provider.as_ref(),
            &request.description,
            request.additional_requirements.as_deref(),
        )
        .await?,
    );

    let pdf_path = state.renderer.submit(Arc::clone(&record));
    info!("Report queued as {pdf_path}");

    Ok(Json(RecommendResponse::new(
        request.description,
        &record,
        pdf_path,
    )))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::layout::TableLayoutConfig;
    use crate::recommendation::orchestrator::tests::{MockProvider, GEARBOX_REPLY};
    use crate::render::ReportRenderer;
    use crate::routes::build_router;

    fn state(provider: Arc<MockProvider>, output_dir: &Path) -> AppState {
        AppState {
            provider,
            renderer: ReportRenderer::new(output_dir, TableLayoutConfig::default()),
            config: Config {
                groq_api_key: Some("gsk_test".to_string()),
                output_dir: output_dir.to_path_buf(),
                port: 8000,
                rust_log: "info".to_string(),
            },
        }
    }

    async fn post(state: AppState, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/recommend-materials")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn wait_for(path: PathBuf) -> bool {
        for _ in 0..100 {
            if path.exists() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_recommend_returns_record_and_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::replying(GEARBOX_REPLY));

        let (status, json) = post(
            state(provider.clone(), dir.path()),
            r#"{"description": "gearbox housing for an electric motorcycle"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["product_description"],
            "gearbox housing for an electric motorcycle"
        );
        assert_eq!(json["materials"].as_array().unwrap().len(), 2);
        assert_eq!(json["materials"][0]["name"], "A380 aluminium alloy");
        assert_eq!(
            json["materials"][0]["properties"]["density"],
            "2.71 g/cm3"
        );
        assert!(json["recommendations"].as_str().unwrap().contains("aluminium"));
        assert!(json.get("alt_materials").is_none());
        assert!(json["cost_considerations"].is_string());

        let pdf_path = json["pdf_path"].as_str().unwrap();
        assert!(pdf_path.starts_with("MaterialMind_Recommendation_"));
        assert!(wait_for(dir.path().join(pdf_path)).await);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::replying(GEARBOX_REPLY));

        let (status, json) = post(state(provider.clone(), dir.path()), r#"{"description": "  "}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_returns_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::unconfigured());

        let (status, json) = post(state(provider, dir.path()), r#"{"description": "valve body"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "CONFIGURATION_ERROR");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Error generating recommendations: "));
        assert!(message.contains("GROQ_API_KEY"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::failing(401));

        let (status, json) = post(state(provider, dir.path()), r#"{"description": "valve body"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_root_welcome_message() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::replying(GEARBOX_REPLY));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = build_router(state(provider, dir.path()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Welcome to MaterialMind API");
    }

    #[tokio::test]
    async fn test_health_reports_credential_state() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::unconfigured());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = build_router(state(provider, dir.path()))
            .oneshot(request)
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["llm_configured"], false);
    }
}
